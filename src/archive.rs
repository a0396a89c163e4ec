use std::io::{Cursor, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;

/// Reads a book archive for upload. Directories are zipped in memory;
/// files are sent as they are.
pub fn open_as_zip(path: &Path) -> Result<Vec<u8>> {
    if path.is_dir() {
        return zip_dir(path);
    }
    let is_zip = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str() == "application/zip")
        .unwrap_or(false);
    if !is_zip {
        tracing::warn!(path = %path.display(), "uploading a file that does not look like a zip archive");
    }
    Ok(std::fs::read(path)?)
}

/// Zips `dir` recursively. Entry names start with the directory's own name
/// and use `/` as separator.
pub fn zip_dir(dir: &Path) -> Result<Vec<u8>> {
    let base = dir.parent().unwrap_or_else(|| Path::new(""));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if name.is_empty() {
            continue;
        }
        tracing::debug!(path = %entry.path().display(), %name, "zip");
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else {
            zip.start_file(name, options)?;
            let content = std::fs::read(entry.path())?;
            zip.write_all(&content)?;
        }
    }
    Ok(zip.finish()?.into_inner())
}

/// Extracts a zip archive into `dir` and returns the number of entries.
pub fn extract(archive: &[u8], dir: &Path) -> Result<usize> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    zip.extract(dir)?;
    tracing::debug!(entries = zip.len(), dir = %dir.display(), "extracted archive");
    Ok(zip.len())
}
