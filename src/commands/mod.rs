//! Sub command handlers. Every handler parses its arguments, talks to the
//! server through a [`CommandContext`] and returns on the first error.

mod correct;
mod create;
mod delete;
mod download;
mod list;
mod pkg;
mod pool;
mod print;
mod search;
mod session;
mod snippet;
mod start;

use std::io::{self, BufRead, Stdout};

use anyhow::{Context, Result};

use crate::cli::Command;
use crate::client::Client;
use crate::config::Settings;
use crate::context::CommandContext;
use crate::format::{FormatOptions, Formatter, OutputMode};
use crate::ids::parse_single_id;

/// Settings shared by all sub commands of one invocation.
#[derive(Debug, Clone)]
pub struct Globals {
    pub settings: Settings,
    pub mode: OutputMode,
    pub color: bool,
}

impl Globals {
    pub fn client(&self) -> Result<Client> {
        let settings = &self.settings;
        Ok(Client::authenticate(
            &settings.url,
            &settings.auth,
            settings.skip_verify,
        )?)
    }

    pub fn context(&self, options: FormatOptions) -> Result<CommandContext<Stdout>> {
        Ok(self.context_with(self.client()?, options))
    }

    pub fn context_with(&self, client: Client, options: FormatOptions) -> CommandContext<Stdout> {
        let options = FormatOptions {
            color: self.color,
            ..options
        };
        CommandContext::new(client, Formatter::new(io::stdout(), self.mode.clone(), options))
    }
}

pub async fn run(command: Command, globals: &Globals) -> Result<()> {
    match command {
        Command::Login { email, password } => session::login(globals, email, password).await,
        Command::Logout => session::logout(globals).await,
        Command::Version => session::version(globals).await,
        Command::Raw { path } => session::raw(globals, &path).await,
        Command::List(list) => list::run(globals, list).await,
        Command::Create(create) => create::run(globals, create).await,
        Command::Correct(args) => correct::run(globals, args).await,
        Command::Print(args) => print::run(globals, args).await,
        Command::Search(args) => search::run(globals, args).await,
        Command::Download { id, file } => download::download(globals, &id, file.as_deref()).await,
        Command::Show { ids } => download::show(globals, &ids).await,
        Command::Delete(delete) => delete::run(globals, delete).await,
        Command::Assign { id, user_id } => pkg::assign(globals, &id, user_id.as_deref()).await,
        Command::Takeback { id } => pkg::takeback(globals, &id).await,
        Command::Split(args) => pkg::split(globals, args).await,
        Command::Pool(pool) => pool::run(globals, pool).await,
        Command::Start(args) => start::run(globals, args).await,
        Command::Snippet(snippet) => snippet::run(globals, snippet).await,
    }
}

fn book_id(id: &str) -> Result<i64> {
    parse_single_id(id).context("invalid book id")
}

fn user_id(id: &str) -> Result<i64> {
    parse_single_id(id).context("invalid user id")
}

/// Reads the next line from stdin, without the line terminator.
fn read_stdin_line() -> Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).context("cannot read stdin")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
