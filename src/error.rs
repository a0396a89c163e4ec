use thiserror::Error;

/// Errors produced by the library layers (ids, client, jobs, formatting).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("missing login information: use --url/--auth or the login sub command")]
    MissingLogin,

    #[error("bad response: {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("bad content type: {0}")]
    BadContentType(String),

    #[error("job {job_id} failed")]
    JobFailed { job_id: i64 },

    #[error("job {job_id} did not finish within {waited_secs}s")]
    JobTimeout { job_id: i64, waited_secs: u64 },

    #[error("invalid format string: {0}")]
    Template(#[from] minijinja::Error),

    #[error("invalid llocs file {path}: {reason}")]
    Llocs { path: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
