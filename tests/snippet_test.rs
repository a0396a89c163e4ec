use base64::prelude::*;
use tempfile::tempdir;
use pocowebc::snippet::{post_ocr, SnippetFiles};

#[test]
fn test_snippet_upload_data() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path().join("13").join("2");
    std::fs::create_dir_all(&dir).unwrap();

    // ocropus style pair below book/page directories
    let image = dir.join("0007.bin.png");
    std::fs::write(&image, b"\x89PNG").unwrap();
    std::fs::write(dir.join("0007.llocs"), "V\t3\t0.8\nn\t7\t0.9\nd\t11\t0.7\n").unwrap();

    let files = SnippetFiles::resolve(&image).unwrap();
    assert_eq!(files.line_id().unwrap(), (13, 2, 7));

    let data = post_ocr(&files, true, true).unwrap();
    assert_eq!(data.ocr, "Vnd");
    assert_eq!(data.cuts, vec![3, 7, 11]);
    assert_eq!(data.confidences, vec![0.8, 0.9, 0.7]);
    assert_eq!(data.image_data.as_deref(), Some(BASE64_STANDARD.encode(b"\x89PNG").as_str()));

    // without image and ocr nothing but the line address is sent
    let data = post_ocr(&files, false, false).unwrap();
    assert!(data.ocr.is_empty());
    assert!(data.image_data.is_none());
}

#[test]
fn test_missing_llocs_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let image = temp_dir.path().join("1:2:3.png");
    std::fs::write(&image, b"png").unwrap();

    let files = SnippetFiles::resolve(&image).unwrap();
    assert!(post_ocr(&files, false, true).is_err());
}
