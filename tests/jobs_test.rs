use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pocowebc::models::{JobState, JobStatus};
use pocowebc::{Clock, Error, JobPoller, JobStatusSource, Result};

/// Answers status requests from a fixed list of states. `None` stands for
/// a failed request.
struct ScriptedJob {
    states: Mutex<VecDeque<Option<JobState>>>,
    polls: AtomicUsize,
}

impl ScriptedJob {
    fn new(states: &[JobState]) -> Self {
        Self::with_steps(states.iter().cloned().map(Some).collect())
    }

    fn with_steps(steps: Vec<Option<JobState>>) -> Self {
        ScriptedJob {
            states: Mutex::new(steps.into()),
            polls: AtomicUsize::new(0),
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStatusSource for ScriptedJob {
    async fn job_status(&self, job_id: i64) -> Result<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let status = self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .expect("polled more often than scripted")
            .ok_or_else(|| Error::Api {
                status: reqwest::StatusCode::BAD_GATEWAY,
                message: "bad gateway".to_string(),
            })?;
        Ok(JobStatus {
            job_id,
            book_id: job_id,
            status,
            timestamp: 0,
        })
    }
}

#[derive(Default)]
struct FakeClock {
    sleeps: AtomicUsize,
}

#[async_trait]
impl<'a> Clock for &'a FakeClock {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_wait_until_done() {
    let job = ScriptedJob::new(&[JobState::Running, JobState::Running, JobState::Done]);
    let clock = FakeClock::default();

    let status = JobPoller::with_clock(&job, &clock).wait_for_job(13).await.unwrap();

    assert_eq!(status.status, JobState::Done);
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 2, "Should sleep between polls only");
    assert_eq!(job.polls(), 3);
}

#[tokio::test]
async fn test_failed_job_names_the_job() {
    let job = ScriptedJob::new(&[JobState::Running, JobState::Failed]);
    let clock = FakeClock::default();

    let err = JobPoller::with_clock(&job, &clock).wait_for_job(42).await.unwrap_err();

    assert!(matches!(err, Error::JobFailed { job_id: 42 }));
    assert_eq!(err.to_string(), "job 42 failed");
}

#[tokio::test]
async fn test_run_submits_when_not_running() {
    // reattach check, then two polls after submission
    let job = ScriptedJob::new(&[JobState::Done, JobState::Running, JobState::Done]);
    let clock = FakeClock::default();
    let submitted = AtomicUsize::new(0);
    let counter = &submitted;

    let status = JobPoller::with_clock(&job, &clock)
        .run(7, false, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(7)
        })
        .await
        .unwrap();

    assert_eq!(status.map(|s| s.status), Some(JobState::Done));
    assert_eq!(submitted.load(Ordering::SeqCst), 1);
    assert_eq!(job.polls(), 3);
}

#[tokio::test]
async fn test_run_reattaches_to_running_job() {
    let job = ScriptedJob::new(&[JobState::Running, JobState::Done]);
    let clock = FakeClock::default();
    let submitted = AtomicUsize::new(0);
    let counter = &submitted;

    JobPoller::with_clock(&job, &clock)
        .run(7, false, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(7)
        })
        .await
        .unwrap();

    assert_eq!(submitted.load(Ordering::SeqCst), 0, "Running jobs are not submitted again");
}

#[tokio::test]
async fn test_nowait_does_not_poll_after_submission() {
    let job = ScriptedJob::new(&[JobState::Done]);
    let clock = FakeClock::default();

    let status = JobPoller::with_clock(&job, &clock)
        .run(7, true, || async { Ok::<_, Error>(7) })
        .await
        .unwrap();

    assert!(status.is_none());
    assert_eq!(job.polls(), 1, "Only the reattach check may poll");
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_error_is_returned() {
    let job = ScriptedJob::new(&[JobState::Done]);
    let clock = FakeClock::default();

    let err = JobPoller::with_clock(&job, &clock)
        .run(7, false, || async { Err::<i64, _>(Error::MissingLogin) })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingLogin));
    assert_eq!(job.polls(), 1);
}

#[tokio::test]
async fn test_run_submits_book_without_job() {
    let job = ScriptedJob::new(&[JobState::Empty, JobState::Running, JobState::Done]);
    let clock = FakeClock::default();
    let submitted = AtomicUsize::new(0);
    let counter = &submitted;

    let status = JobPoller::with_clock(&job, &clock)
        .run(5, false, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(5)
        })
        .await
        .unwrap();

    assert_eq!(submitted.load(Ordering::SeqCst), 1, "A book without a job must be submitted");
    assert_eq!(status.map(|s| s.status), Some(JobState::Done));
    assert_eq!(job.polls(), 3);
}

#[tokio::test]
async fn test_request_error_ends_wait_without_sleeping() {
    let job = ScriptedJob::with_steps(vec![None]);
    let clock = FakeClock::default();

    let err = JobPoller::with_clock(&job, &clock).wait_for_job(3).await.unwrap_err();

    assert!(matches!(err, Error::Api { ref message, .. } if message == "bad gateway"));
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
    assert_eq!(job.polls(), 1);
}

#[tokio::test]
async fn test_request_error_after_polling() {
    let job = ScriptedJob::with_steps(vec![Some(JobState::Running), None, Some(JobState::Done)]);
    let clock = FakeClock::default();

    let err = JobPoller::with_clock(&job, &clock).wait_for_job(3).await.unwrap_err();

    assert!(matches!(err, Error::Api { .. }));
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 1);
    assert_eq!(job.polls(), 2, "Polling stops at the first error");
}
