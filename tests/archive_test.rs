use tempfile::tempdir;
use pocowebc::archive::{extract, open_as_zip, zip_dir};

#[test]
fn test_zip_and_extract_book_dir() {
    let temp_dir = tempdir().unwrap();
    let book = temp_dir.path().join("book");

    // Create a small book with one page directory
    std::fs::create_dir_all(book.join("0001")).unwrap();
    std::fs::write(book.join("0001.png"), "image").unwrap();
    std::fs::write(book.join("0001").join("0001.xml"), "<page/>").unwrap();

    let archive = zip_dir(&book).unwrap();
    assert!(!archive.is_empty(), "Archive should not be empty");

    // Extracting reproduces the directory below the target
    let out = tempdir().unwrap();
    let entries = extract(&archive, out.path()).unwrap();
    assert_eq!(entries, 4, "Should contain 2 directories and 2 files");
    assert_eq!(
        std::fs::read_to_string(out.path().join("book").join("0001").join("0001.xml")).unwrap(),
        "<page/>"
    );
    assert_eq!(
        std::fs::read_to_string(out.path().join("book").join("0001.png")).unwrap(),
        "image"
    );
}

#[test]
fn test_open_as_zip_reads_files_unchanged() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("book.zip");
    std::fs::write(&path, b"PK\x03\x04not really").unwrap();

    let bytes = open_as_zip(&path).unwrap();
    assert_eq!(bytes, b"PK\x03\x04not really");

    // Zip files are recognized by their extension
    let mime = mime_guess::from_path(&path).first().unwrap();
    assert_eq!(mime.essence_str(), "application/zip");
}

#[test]
fn test_open_as_zip_zips_directories() {
    let temp_dir = tempdir().unwrap();
    let book = temp_dir.path().join("book");
    std::fs::create_dir(&book).unwrap();
    std::fs::write(book.join("a.txt"), "a").unwrap();

    let bytes = open_as_zip(&book).unwrap();
    let out = tempdir().unwrap();
    extract(&bytes, out.path()).unwrap();
    assert!(out.path().join("book").join("a.txt").exists());
}

#[test]
fn test_extract_rejects_garbage() {
    let out = tempdir().unwrap();
    assert!(extract(b"this is no zip", out.path()).is_err());
}
