use std::io::Stdout;

use anyhow::{bail, Context, Result};

use super::{read_stdin_line, Globals};
use crate::cli::CorrectArgs;
use crate::context::CommandContext;
use crate::format::FormatOptions;
use crate::ids::{unescape, ResourceId};

pub async fn run(globals: &Globals, args: CorrectArgs) -> Result<()> {
    if args.args.len() % 2 != 0 {
        bail!("expected an even number of arguments");
    }
    let pairs = args
        .args
        .chunks(2)
        .map(|pair| Ok::<_, anyhow::Error>((pair[0].parse::<ResourceId>()?, pair[1].as_str())))
        .collect::<Result<Vec<_>>>()?;
    let mut ctx = globals.context(FormatOptions::default())?;
    for (id, cor) in pairs {
        correct(&mut ctx, id, cor, &args.typ).await?;
    }
    if args.args.is_empty() {
        while let Some(line) = read_stdin_line()? {
            let mut fields = line.split_whitespace();
            let id = fields.next();
            let cor = fields.collect::<Vec<_>>().join(" ");
            match id {
                Some(id) if !cor.is_empty() => {
                    correct(&mut ctx, id.parse()?, &cor, &args.typ).await?
                }
                _ => bail!("invalid input line: {:?}", line),
            }
        }
    }
    ctx.finish()?;
    Ok(())
}

async fn correct(ctx: &mut CommandContext<Stdout>, id: ResourceId, cor: &str, typ: &str) -> Result<()> {
    let cor = unescape(cor);
    match id {
        ResourceId::Line { book, page, line } => {
            let line = ctx
                .client()
                .correct_line(book, page, line, typ, &cor)
                .await
                .with_context(|| format!("cannot correct line {}", id))?;
            ctx.add(line)?;
        }
        ResourceId::Token { book, page, line, token } => {
            let token = ctx
                .client()
                .correct_token(book, page, line, token, None, typ, &cor)
                .await
                .with_context(|| format!("cannot correct word {}", id))?;
            ctx.add(token)?;
        }
        ResourceId::TokenLen { book, page, line, token, len } => {
            let token = ctx
                .client()
                .correct_token(book, page, line, token, Some(len), typ, &cor)
                .await
                .with_context(|| format!("cannot correct word {}", id))?;
            ctx.add(token)?;
        }
        _ => bail!("invalid id: {:?}", id.to_string()),
    }
    Ok(())
}
