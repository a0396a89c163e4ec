use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use super::{book_id, Globals};
use crate::cli::{StartArgs, StartCommand};
use crate::client::JobKind;
use crate::error::Error;
use crate::format::FormatOptions;
use crate::ids::parse_single_id;
use crate::jobs::JobPoller;

pub async fn run(globals: &Globals, args: StartArgs) -> Result<()> {
    let (kind, id) = match &args.job {
        StartCommand::Profile { id } => (JobKind::Profile, id),
        StartCommand::El { id } => (JobKind::ExtendedLexicon, id),
        StartCommand::Pc { id } => (JobKind::PostCorrection, id),
        StartCommand::Train { id } => (JobKind::Train, id),
        StartCommand::Predict { id, model } => {
            let model_id = parse_single_id(model).context("invalid model id")?;
            (JobKind::Predict { model_id }, id)
        }
    };
    let book = book_id(id)?;
    let mut ctx = globals.context(FormatOptions::default())?;

    let status = {
        let client = ctx.client();
        let kind = &kind;
        JobPoller::new(client)
            .interval(Duration::from_secs(args.sleep))
            .max_wait(args.max_wait.map(Duration::from_secs))
            .progress(spinner())
            .run(book, args.nowait, move || async move {
                let job = client.start_job(kind, book).await?;
                tracing::debug!(job_id = job.id, ?kind, "started job");
                Ok::<_, Error>(job.id)
            })
            .await
            .with_context(|| format!("cannot run {:?} job for book {}", kind, book))?
    };

    if let Some(status) = status {
        ctx.add(status)?;
    }
    ctx.finish()?;
    Ok(())
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner
}
