use anyhow::{Context, Result};

use super::{book_id, user_id, Globals};
use crate::cli::ListCommand;
use crate::format::FormatOptions;
use crate::ids::{parse_single_id, unescape};
use crate::utils::expand_char_filter;

pub async fn run(globals: &Globals, command: ListCommand) -> Result<()> {
    let mut ctx = globals.context(FormatOptions::default())?;
    match command {
        ListCommand::Users { ids } if ids.is_empty() => {
            let users = ctx.client().get_users().await.context("cannot list users")?;
            ctx.add(users)?;
        }
        ListCommand::Users { ids } => {
            let ids = ids.iter().map(|id| user_id(id)).collect::<Result<Vec<_>>>()?;
            for id in ids {
                let user = ctx
                    .client()
                    .get_user(id)
                    .await
                    .with_context(|| format!("cannot get user {}", id))?;
                ctx.add(user)?;
            }
        }
        ListCommand::Books { ids } if ids.is_empty() => {
            let books = ctx.client().get_books().await.context("cannot list books")?;
            ctx.add(books)?;
        }
        ListCommand::Books { ids } => {
            let ids = ids.iter().map(|id| book_id(id)).collect::<Result<Vec<_>>>()?;
            for id in ids {
                let book = ctx
                    .client()
                    .get_book(id)
                    .await
                    .with_context(|| format!("cannot get book {}", id))?;
                ctx.add(book)?;
            }
        }
        ListCommand::Patterns { id, queries, hist } => {
            let id = book_id(&id)?;
            let queries: Vec<String> = queries.iter().map(|q| unescape(q)).collect();
            let patterns = ctx
                .client()
                .get_patterns(id, !hist, &queries)
                .await
                .context("cannot list patterns")?;
            ctx.add(patterns)?;
        }
        ListCommand::Suggestions { id, queries } => {
            let id = book_id(&id)?;
            if queries.is_empty() {
                let profile = ctx.client().get_profile(id).await.context("cannot get profile")?;
                ctx.add(profile)?;
            } else {
                let queries: Vec<String> = queries.iter().map(|q| unescape(q)).collect();
                let suggestions = ctx
                    .client()
                    .query_profile(id, &queries)
                    .await
                    .context("cannot query profile")?;
                ctx.add(suggestions)?;
            }
        }
        ListCommand::Suspicious { id } => {
            let counts = ctx
                .client()
                .get_suspicious(book_id(&id)?)
                .await
                .context("cannot list suspicious words")?;
            ctx.add(counts)?;
        }
        ListCommand::Adaptive { id } => {
            let tokens = ctx
                .client()
                .get_adaptive_tokens(book_id(&id)?)
                .await
                .context("cannot list adaptive tokens")?;
            ctx.add(tokens)?;
        }
        ListCommand::El { id } => {
            let el = ctx
                .client()
                .get_extended_lexicon(book_id(&id)?)
                .await
                .context("cannot list extended lexicon")?;
            ctx.add(el)?;
        }
        ListCommand::Rrdm { id } => {
            let pc = ctx
                .client()
                .get_post_correction(book_id(&id)?)
                .await
                .context("cannot list post-correction")?;
            ctx.add(pc)?;
        }
        ListCommand::Ocr { id } => {
            let models = ctx
                .client()
                .get_ocr_models(book_id(&id)?)
                .await
                .context("cannot list ocr models")?;
            ctx.add(models)?;
        }
        ListCommand::Chars { id, filter } => {
            let chars = ctx
                .client()
                .get_char_map(book_id(&id)?, &expand_char_filter(&filter))
                .await
                .context("cannot list characters")?;
            ctx.add(chars)?;
        }
        ListCommand::Job { id } => {
            let id = parse_single_id(&id).context("invalid job id")?;
            let status = ctx
                .client()
                .get_job_status(id)
                .await
                .with_context(|| format!("cannot get job {}", id))?;
            ctx.add(status)?;
        }
    }
    ctx.finish()?;
    Ok(())
}
