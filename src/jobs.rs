//! Waiting for server side jobs (profiling, lexicon extension,
//! post-correction, OCR training and prediction).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::ProgressBar;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::models::{JobState, JobStatus};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Anything that can report the status of a job.
#[async_trait]
pub trait JobStatusSource {
    async fn job_status(&self, job_id: i64) -> Result<JobStatus>;
}

#[async_trait]
impl JobStatusSource for Client {
    async fn job_status(&self, job_id: i64) -> Result<JobStatus> {
        self.get_job_status(job_id).await
    }
}

#[async_trait]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct JobPoller<'a, S, C> {
    source: &'a S,
    clock: C,
    interval: Duration,
    max_wait: Option<Duration>,
    progress: ProgressBar,
}

impl<'a, S> JobPoller<'a, S, TokioClock>
where
    S: JobStatusSource + Sync,
{
    pub fn new(source: &'a S) -> Self {
        JobPoller::with_clock(source, TokioClock)
    }
}

impl<'a, S, C> JobPoller<'a, S, C>
where
    S: JobStatusSource + Sync,
    C: Clock + Sync,
{
    pub fn with_clock(source: &'a S, clock: C) -> Self {
        JobPoller {
            source,
            clock,
            interval: DEFAULT_INTERVAL,
            max_wait: None,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Checks once whether the job is still queued or running. Callers use
    /// this to attach to a running job instead of submitting it again.
    pub async fn reattach(&self, job_id: i64) -> Result<bool> {
        let status = self.source.job_status(job_id).await?;
        tracing::debug!(job_id, status = ?status.status, "reattach");
        Ok(status.status.is_active())
    }

    /// Polls the job until it is done or failed. Status is checked before
    /// each sleep; any transport error ends the loop.
    pub async fn wait_for_job(&self, job_id: i64) -> Result<JobStatus> {
        let mut waited = Duration::ZERO;
        loop {
            let status = self.source.job_status(job_id).await?;
            tracing::debug!(job_id, status = ?status.status, "poll");
            match status.status {
                JobState::Done => {
                    self.progress.finish_and_clear();
                    return Ok(status);
                }
                JobState::Failed => {
                    self.progress.abandon();
                    return Err(Error::JobFailed { job_id });
                }
                JobState::Empty | JobState::Queued | JobState::Running => {}
            }
            if let Some(max_wait) = self.max_wait {
                if waited >= max_wait {
                    self.progress.abandon();
                    return Err(Error::JobTimeout {
                        job_id,
                        waited_secs: waited.as_secs(),
                    });
                }
            }
            self.progress
                .set_message(format!("job {} {:?}", job_id, status.status).to_lowercase());
            self.progress.tick();
            self.clock.sleep(self.interval).await;
            waited += self.interval;
        }
    }

    /// Submits the job for `book` unless it is already running, then waits
    /// for it to finish. With `no_wait` the status is never polled after
    /// submission and `None` is returned.
    pub async fn run<F, Fut>(&self, book: i64, no_wait: bool, submit: F) -> Result<Option<JobStatus>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<i64>>,
    {
        let job_id = if self.reattach(book).await? {
            tracing::info!(job_id = book, "job is already running");
            book
        } else {
            submit().await?
        };
        if no_wait {
            return Ok(None);
        }
        self.wait_for_job(job_id).await.map(Some)
    }
}
