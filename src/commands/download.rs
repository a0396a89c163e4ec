use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{book_id, Globals};
use crate::client::PageRef;
use crate::ids::ResourceId;

/// Writes the zipped book to `file` or to stdout.
pub async fn download(globals: &Globals, id: &str, file: Option<&Path>) -> Result<()> {
    let book = book_id(id)?;
    let archive = globals
        .client()?
        .download_book(book)
        .await
        .with_context(|| format!("cannot download book {}", book))?;
    tracing::debug!(book, bytes = archive.len(), "downloaded book");
    match file {
        Some(path) => std::fs::write(path, &archive)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(&archive)?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Writes the page or line images of `ids` to stdout.
pub async fn show(globals: &Globals, ids: &[String]) -> Result<()> {
    let ids = ids
        .iter()
        .map(|id| match id.parse::<ResourceId>() {
            Ok(id @ (ResourceId::Page { .. } | ResourceId::Line { .. })) => Ok(id),
            _ => bail!("invalid id: {:?}", id),
        })
        .collect::<Result<Vec<_>>>()?;
    let client = globals.client()?;
    for id in ids {
        let img_file = match id {
            ResourceId::Line { book, page, line } => {
                client
                    .get_line(book, page, line)
                    .await
                    .with_context(|| format!("cannot get line {}", id))?
                    .img_file
            }
            ResourceId::Page { book, page } => {
                client
                    .get_page(book, PageRef::Id(page))
                    .await
                    .with_context(|| format!("cannot get page {}", id))?
                    .img_file
            }
            _ => bail!("invalid id: {:?}", id.to_string()),
        };
        let image = client
            .get_image(&img_file)
            .await
            .with_context(|| format!("cannot get image {}", img_file))?;
        let mut out = std::io::stdout().lock();
        out.write_all(&image)?;
        out.flush()?;
    }
    Ok(())
}
