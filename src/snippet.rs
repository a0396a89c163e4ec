//! Line snippets in the ocropus layout: `<id>.bin.png` (or `<id>.png`) next
//! to `<id>.llocs`, where every llocs line is `char\tcut\tconfidence`.

use std::path::{Path, PathBuf};

use base64::prelude::*;

use crate::error::{Error, Result};
use crate::ids::parse_ids;
use crate::models::PostOcr;

pub const LLOCS_EXT: &str = "llocs";
const IMAGE_EXTS: [&str; 2] = [".bin.png", ".png"];

/// Image and llocs file belonging to the same line.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetFiles {
    pub image: PathBuf,
    pub llocs: PathBuf,
}

impl SnippetFiles {
    /// Finds the sibling of a `.png` or `.llocs` file.
    pub fn resolve(path: &Path) -> Result<Self> {
        let stripped = strip(path);
        match path.extension().and_then(|e| e.to_str()) {
            Some("png") => Ok(SnippetFiles {
                image: path.to_path_buf(),
                llocs: with_suffix(&stripped, ".llocs"),
            }),
            Some(LLOCS_EXT) => {
                let image = IMAGE_EXTS
                    .iter()
                    .map(|ext| with_suffix(&stripped, ext))
                    .find(|p| p.exists())
                    .unwrap_or_else(|| with_suffix(&stripped, IMAGE_EXTS[0]));
                Ok(SnippetFiles {
                    image,
                    llocs: path.to_path_buf(),
                })
            }
            _ => Err(Error::Llocs {
                path: path.display().to_string(),
                reason: "expected a .png or .llocs file".to_string(),
            }),
        }
    }

    /// Line id `(book, page, line)` of the snippet.
    pub fn line_id(&self) -> Result<(i64, i64, i64)> {
        line_id(&self.llocs)
    }
}

/// Removes every extension (`0001.bin.png` becomes `0001`).
pub fn strip(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    path.with_file_name(stem)
}

fn with_suffix(stripped: &Path, suffix: &str) -> PathBuf {
    let mut name = stripped.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Derives the line id from a file name `b:p:l.*` or, failing that, from a
/// path ending in `.../b/p/l.*`.
pub fn line_id(path: &Path) -> Result<(i64, i64, i64)> {
    let stripped = strip(path);
    let invalid = || Error::InvalidId(path.display().to_string());
    let name = stripped
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut ids = [0i64; 3];
    if parse_ids(&name, &mut ids) == 3 {
        return Ok((ids[0], ids[1], ids[2]));
    }
    let parts: Vec<_> = stripped
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.len() < 3 {
        return Err(invalid());
    }
    let last = &parts[parts.len() - 3..];
    let parse = |s: &str| s.parse::<i64>().map_err(|_| invalid());
    Ok((parse(&last[0])?, parse(&last[1])?, parse(&last[2])?))
}

/// Parses the content of a llocs file into OCR text, cuts and confidences.
pub fn parse_llocs(content: &str, path: &Path) -> Result<PostOcr> {
    let mut ocr = PostOcr::default();
    for (n, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let bad = |reason: &str| Error::Llocs {
            path: path.display().to_string(),
            reason: format!("line {}: {}", n + 1, reason),
        };
        let mut fields = line.split('\t');
        let ch = fields.next().unwrap_or_default();
        let cut = fields.next().ok_or_else(|| bad("missing cut"))?;
        let cut: f64 = cut.trim().parse().map_err(|_| bad("invalid cut"))?;
        let conf = match fields.next() {
            Some(conf) => conf.trim().parse().map_err(|_| bad("invalid confidence"))?,
            None => 0.0,
        };
        ocr.ocr.push_str(if ch.is_empty() { " " } else { ch });
        ocr.cuts.push(cut.round() as i64);
        ocr.confidences.push(conf);
    }
    Ok(ocr)
}

pub fn read_llocs(path: &Path) -> Result<PostOcr> {
    let content = std::fs::read_to_string(path)?;
    parse_llocs(&content, path)
}

/// Base64 encoded content of an image file.
pub fn encode_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Builds the upload for one snippet.
pub fn post_ocr(files: &SnippetFiles, with_image: bool, with_ocr: bool) -> Result<PostOcr> {
    let mut data = if with_ocr {
        read_llocs(&files.llocs)?
    } else {
        PostOcr::default()
    };
    if with_image {
        data.image_data = Some(encode_image(&files.image)?);
    }
    Ok(data)
}
