use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::Globals;
use crate::cli::SnippetCommand;
use crate::client::Client;
use crate::ids::parse_ids;
use crate::snippet::{self, SnippetFiles};

pub async fn run(globals: &Globals, command: SnippetCommand) -> Result<()> {
    let client = globals.client()?;
    match command {
        SnippetCommand::Get { dir, ids, nogt } => {
            let ids = ids
                .iter()
                .map(|id| {
                    let mut parsed = [0i64; 3];
                    if parse_ids(id, &mut parsed) != 3 {
                        bail!("invalid line id: {}", id);
                    }
                    Ok(parsed)
                })
                .collect::<Result<Vec<_>>>()?;
            for id in ids {
                download_snippet(&client, id, &dir, !nogt).await?;
            }
        }
        SnippetCommand::Put { files, image, noocr } => {
            for file in &files {
                upload_snippet(&client, file, image, !noocr).await?;
            }
        }
    }
    Ok(())
}

/// Writes `<id>.png`, `<id>.txt` (ocr) and optionally `<id>.gt.txt`
/// (corrected text) into `dir`.
async fn download_snippet(client: &Client, [book, page, line]: [i64; 3], dir: &Path, gt: bool) -> Result<()> {
    let line = client
        .get_line(book, page, line)
        .await
        .with_context(|| format!("cannot download line {}:{}:{}", book, page, line))?;
    let id = line.id();
    let image = client
        .get_image(&line.img_file)
        .await
        .with_context(|| format!("cannot download line image {}", id))?;
    let write = |name: PathBuf, content: &[u8]| {
        std::fs::write(&name, content).with_context(|| format!("cannot write {}", name.display()))
    };
    write(dir.join(format!("{}.png", id)), &image)?;
    if gt {
        write(dir.join(format!("{}.gt.txt", id)), line.cor.as_bytes())?;
    }
    write(dir.join(format!("{}.txt", id)), line.ocr.as_bytes())?;
    tracing::debug!(%id, dir = %dir.display(), "downloaded snippet");
    Ok(())
}

async fn upload_snippet(client: &Client, file: &Path, image: bool, ocr: bool) -> Result<()> {
    let files = SnippetFiles::resolve(file)?;
    let (book, page, line) = files
        .line_id()
        .with_context(|| format!("cannot determine line id of {}", file.display()))?;
    let data = snippet::post_ocr(&files, image, ocr)?;
    client
        .put_line_ocr(book, page, line, &data)
        .await
        .with_context(|| format!("cannot put snippet {}", files.llocs.display()))?;
    tracing::debug!(book, page, line, "uploaded snippet");
    Ok(())
}
