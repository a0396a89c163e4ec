use anyhow::{Context, Result};

use super::{book_id, user_id, Globals};
use crate::cli::SplitArgs;
use crate::format::FormatOptions;
use crate::models::SplitRequest;

/// Assigns a package to a user or, without a user, back to its owner.
pub async fn assign(globals: &Globals, id: &str, user: Option<&str>) -> Result<()> {
    let package = book_id(id).context("cannot assign package")?;
    let user = user.map(user_id).transpose()?;
    globals
        .client()?
        .assign(package, user)
        .await
        .with_context(|| format!("cannot assign package {}", package))
}

/// Gives all packages of a book back to the book's owner.
pub async fn takeback(globals: &Globals, id: &str) -> Result<()> {
    let book = book_id(id).context("cannot take back packages")?;
    globals
        .client()?
        .takeback(book)
        .await
        .with_context(|| format!("cannot take back packages of book {}", book))
}

/// Splits a book into one package per user. Packages are assigned to the
/// users in the given order.
pub async fn split(globals: &Globals, args: SplitArgs) -> Result<()> {
    let book = book_id(&args.id).context("cannot split")?;
    let request = SplitRequest {
        user_ids: args
            .user_ids
            .iter()
            .map(|id| user_id(id))
            .collect::<Result<_>>()?,
        random: args.random,
    };
    let mut ctx = globals.context(FormatOptions::default())?;
    let packages = ctx
        .client()
        .split(book, &request)
        .await
        .with_context(|| format!("cannot split book {}", book))?;
    ctx.add(packages)?;
    ctx.finish()?;
    Ok(())
}
