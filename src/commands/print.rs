use std::collections::HashSet;
use std::io::Stdout;

use anyhow::{Context, Result};

use super::{read_stdin_line, Globals};
use crate::cli::PrintArgs;
use crate::client::PageRef;
use crate::context::CommandContext;
use crate::format::FormatOptions;
use crate::ids::{split_modifier, ResourceId};

pub async fn run(globals: &Globals, args: PrintArgs) -> Result<()> {
    let options = FormatOptions {
        words: args.display.words,
        ocr: args.display.ocr,
        no_cor: args.display.nocor,
        only_manual: args.manual,
        color: false,
    };
    let mut ctx = globals.context(options)?;
    for id in &args.ids {
        print_id(&mut ctx, id).await?;
    }
    if args.ids.is_empty() {
        while let Some(id) = read_stdin_line()? {
            let id = id.trim();
            if !id.is_empty() {
                print_id(&mut ctx, id).await?;
            }
        }
    }
    ctx.finish()?;
    Ok(())
}

/// Page 0 is the first and page -1 the last page of a book.
fn page_ref(page: i64, modifier: i64) -> PageRef {
    match (page, modifier) {
        (0, _) => PageRef::First,
        (-1, _) => PageRef::Last,
        (page, 0) => PageRef::Id(page),
        (page, n) => PageRef::Relative(page, n),
    }
}

async fn print_id(ctx: &mut CommandContext<Stdout>, id: &str) -> Result<()> {
    let (id, modifier) = split_modifier(id);
    match id.parse::<ResourceId>()? {
        ResourceId::Book(book) => print_book(ctx, book).await?,
        ResourceId::Page { book, page } => {
            let page = ctx
                .client()
                .get_page(book, page_ref(page, modifier))
                .await
                .context("cannot get page")?;
            ctx.add(page)?;
        }
        ResourceId::Line { book, page, line } => {
            let line = ctx
                .client()
                .get_line(book, page, line)
                .await
                .context("cannot get line")?;
            ctx.add(line)?;
        }
        ResourceId::Token { book, page, line, token } => {
            let token = ctx
                .client()
                .get_token(book, page, line, token, None)
                .await
                .context("cannot get word")?;
            ctx.add(token)?;
        }
        ResourceId::TokenLen { book, page, line, token, len } => {
            let token = ctx
                .client()
                .get_token(book, page, line, token, Some(len))
                .await
                .context("cannot get word")?;
            ctx.add(token)?;
        }
    }
    Ok(())
}

/// Follows the next page links starting at the first page. The last page
/// links to itself (or to 0).
async fn print_book(ctx: &mut CommandContext<Stdout>, book: i64) -> Result<()> {
    let mut seen = HashSet::new();
    let mut next = PageRef::First;
    loop {
        let page = ctx
            .client()
            .get_page(book, next)
            .await
            .context("cannot get page")?;
        seen.insert(page.page_id);
        let next_id = page.next_page_id;
        ctx.add(page)?;
        if next_id == 0 || seen.contains(&next_id) {
            return Ok(());
        }
        next = PageRef::Id(next_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_ref() {
        assert_eq!(page_ref(0, 3), PageRef::First);
        assert_eq!(page_ref(-1, 0), PageRef::Last);
        assert_eq!(page_ref(7, 0), PageRef::Id(7));
        assert_eq!(page_ref(7, -2), PageRef::Relative(7, -2));
    }
}
