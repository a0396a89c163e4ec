use std::io::Write;

use crate::client::Client;
use crate::error::Result;
use crate::format::{Formatter, OutputMode, Response};

/// Authenticated client plus the formatter of one command invocation.
///
/// In default mode every response is printed as soon as it is added. JSON
/// and template output need the whole batch, so those responses wait for
/// [`CommandContext::finish`]. Errors are returned through `?`; after the
/// first one nothing else is printed.
pub struct CommandContext<W: Write> {
    client: Client,
    formatter: Formatter<W>,
    pending: Vec<Response>,
}

impl<W: Write> CommandContext<W> {
    pub fn new(client: Client, formatter: Formatter<W>) -> Self {
        CommandContext {
            client,
            formatter,
            pending: Vec::new(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn add(&mut self, response: impl Into<Response>) -> Result<()> {
        let response = response.into();
        if *self.formatter.mode() == OutputMode::Default {
            return self.formatter.write(std::slice::from_ref(&response));
        }
        self.pending.push(response);
        Ok(())
    }

    /// Writes the buffered responses and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.pending.is_empty() {
            self.formatter.write(&self.pending)?;
        }
        Ok(self.formatter.into_inner())
    }
}
