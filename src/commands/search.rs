use anyhow::{bail, Context, Result};

use super::{book_id, Globals};
use crate::cli::SearchArgs;
use crate::client::SearchQuery;
use crate::format::FormatOptions;
use crate::ids::unescape;

/// Searches a book. With `--all` the search continues `max` matches at a
/// time until a request returns no more matches.
pub async fn run(globals: &Globals, args: SearchArgs) -> Result<()> {
    let book = book_id(&args.id)?;
    if args.all && args.max <= 0 {
        bail!("--all needs a positive --max, got {}", args.max);
    }
    let query = SearchQuery {
        queries: args.queries.iter().map(|q| unescape(q)).collect(),
        search_type: args.typ,
        ignore_case: args.ignore_case,
        max: args.max,
    };
    let options = FormatOptions {
        words: args.display.words,
        ocr: args.display.ocr,
        no_cor: args.display.nocor,
        ..FormatOptions::default()
    };
    let mut ctx = globals.context(options)?;
    let mut skip = args.skip;
    loop {
        let results = ctx
            .client()
            .search(book, &query, skip)
            .await
            .with_context(|| format!("cannot search book {}", book))?;
        if !results.has_matches() {
            break;
        }
        ctx.add(results)?;
        if !args.all {
            break;
        }
        skip += query.max;
    }
    ctx.finish()?;
    Ok(())
}
