use anyhow::{Context, Result};

use super::Globals;
use crate::archive;
use crate::cli::{CreateCommand, NewBookArgs, NewUserArgs};
use crate::format::FormatOptions;
use crate::models::{CreateUserRequest, NewBook, User};

pub async fn run(globals: &Globals, command: CreateCommand) -> Result<()> {
    match command {
        CreateCommand::Book(args) => create_book(globals, args).await,
        CreateCommand::User(args) => create_user(globals, args).await,
    }
}

async fn create_book(globals: &Globals, args: NewBookArgs) -> Result<()> {
    let archive = archive::open_as_zip(&args.path)
        .with_context(|| format!("cannot create new book: open {}", args.path.display()))?;
    let book = NewBook {
        author: args.author,
        title: args.title,
        language: args.language,
        description: args.description,
        hist_patterns: args.patterns,
        profiler_url: args.profilerurl,
        year: args.year,
    };
    let mut ctx = globals.context(FormatOptions::default())?;
    let created = ctx
        .client()
        .create_book(&book, archive)
        .await
        .context("cannot create new book")?;
    ctx.add(created)?;
    ctx.finish()?;
    Ok(())
}

async fn create_user(globals: &Globals, args: NewUserArgs) -> Result<()> {
    let request = CreateUserRequest {
        user: User {
            name: args.name,
            email: args.email,
            institute: args.institute,
            admin: args.admin,
            ..User::default()
        },
        password: args.password,
    };
    let mut ctx = globals.context(FormatOptions::default())?;
    let user = ctx
        .client()
        .create_user(&request)
        .await
        .context("cannot create new user")?;
    ctx.add(user)?;
    ctx.finish()?;
    Ok(())
}
