pub mod archive;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod ids;
pub mod jobs;
pub mod models;
pub mod snippet;
pub mod utils;

// Re-export types needed for the public API
pub use cli::{Cli, Command, GlobalArgs};
pub use client::{Client, JobKind, PageRef, SearchQuery};
pub use config::{Config, Settings};
pub use context::CommandContext;
pub use error::{Error, Result};
pub use format::{FormatOptions, Formatter, OutputMode, Response};
pub use ids::{parse_ids, ResourceId};
pub use jobs::{Clock, JobPoller, JobStatusSource};
pub use utils::expand_char_filter;
