use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pocowebc", author, version, about = "Command line client for pocoweb", long_about = None)]
#[command(after_help = "Examples:
  pocowebc login user@example.org secret
  pocowebc list books
  pocowebc print 13:2 --words
  pocowebc search 13 'Thür' --all
  pocowebc start profile 13 --sleep 10
  pocowebc --format '{{bookId}} {{title}}\\n' list books")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output raw json
    #[arg(short = 'J', long, global = true)]
    pub json: bool,

    /// Format output using a template string
    #[arg(short = 'F', long, global = true, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Set the pocoweb url
    #[arg(short = 'U', long, global = true)]
    pub url: Option<String>,

    /// Set the auth token
    #[arg(short = 'A', long, global = true)]
    pub auth: Option<String>,

    /// Ignore invalid ssl certificates
    #[arg(short = 'S', long, global = true)]
    pub skip_verify: bool,

    /// Enable debug output
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// Read and store login information in this file
    #[arg(short = 'C', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not read or write the config file
    #[arg(short = 'N', long, global = true)]
    pub noconfig: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Login to pocoweb or print the current session
    Login {
        #[arg(requires = "password")]
        email: Option<String>,
        password: Option<String>,
    },
    /// Logout from pocoweb
    Logout,
    /// Print the api version of pocoweb
    Version,
    /// Send an authenticated GET request and print the response body
    Raw { path: String },
    /// List various information
    #[command(subcommand)]
    List(ListCommand),
    /// Create books and users
    #[command(subcommand)]
    Create(CreateCommand),
    /// Correct lines or words
    Correct(CorrectArgs),
    /// Print books, pages, lines and/or words
    Print(PrintArgs),
    /// Search for tokens and error patterns
    Search(SearchArgs),
    /// Download the zipped book ID
    Download {
        id: String,
        /// Output file (stdout if omitted)
        file: Option<PathBuf>,
    },
    /// Delete users or books
    #[command(subcommand)]
    Delete(DeleteCommand),
    /// Assign the package ID to USERID or back to its original owner
    Assign {
        id: String,
        user_id: Option<String>,
    },
    /// Reassign all packages of book ID to its owner
    Takeback { id: String },
    /// Split the book ID into one package per USERID
    Split(SplitArgs),
    /// Handle the user or global pool
    #[command(subcommand)]
    Pool(PoolCommand),
    /// Start various jobs
    Start(StartArgs),
    /// Write the images of the given page or line IDS to stdout
    Show {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Work with line snippets
    #[command(subcommand)]
    Snippet(SnippetCommand),
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// List user information
    Users { ids: Vec<String> },
    /// List book information
    Books { ids: Vec<String> },
    /// List error patterns of a book
    Patterns {
        id: String,
        queries: Vec<String>,
        /// List historical rewrite patterns instead of ocr patterns
        #[arg(short = 'H', long)]
        hist: bool,
    },
    /// List profiler suggestions of a book
    Suggestions { id: String, queries: Vec<String> },
    /// List suspicious words of a book
    Suspicious { id: String },
    /// List adaptive tokens of a book
    Adaptive { id: String },
    /// List extended lexicon tokens of a book
    El { id: String },
    /// List the post-correction of a book
    Rrdm { id: String },
    /// List available ocr models of a book
    Ocr { id: String },
    /// List character frequencies of a book
    Chars {
        id: String,
        /// Only count these characters (ranges like a-z are expanded)
        #[arg(short, long, default_value = "A-Za-z0-9")]
        filter: String,
    },
    /// Print the status of a job
    Job { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CreateCommand {
    /// Upload a new book from a zip archive or a directory
    Book(NewBookArgs),
    /// Create a new user
    User(NewUserArgs),
}

#[derive(Args, Debug)]
pub struct NewBookArgs {
    pub path: PathBuf,
    #[arg(short, long)]
    pub author: String,
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long)]
    pub language: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(short, long, default_value_t = 1900)]
    pub year: i32,
    #[arg(short = 'u', long, default_value = "local")]
    pub profilerurl: String,
    /// Historical rewrite patterns
    #[arg(short, long, default_value = "")]
    pub patterns: String,
}

#[derive(Args, Debug)]
pub struct NewUserArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub password: String,
    #[arg(short, long, default_value = "")]
    pub institute: String,
    #[arg(short, long)]
    pub admin: bool,
}

#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// Pairs of ID CORRECTION; read from stdin if omitted
    pub args: Vec<String>,
    /// Correction type
    #[arg(short = 't', long = "type", default_value = "automatic")]
    pub typ: String,
}

/// How lines and words are printed.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DisplayArgs {
    /// Print words instead of lines
    #[arg(short, long)]
    pub words: bool,
    /// Print ocr text
    #[arg(short, long)]
    pub ocr: bool,
    /// Do not print corrected text
    #[arg(short = 'c', long)]
    pub nocor: bool,
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Book, page, line or word ids; read from stdin if omitted
    pub ids: Vec<String>,
    #[command(flatten)]
    pub display: DisplayArgs,
    /// Only print manually corrected lines and words
    #[arg(short, long)]
    pub manual: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub id: String,
    pub queries: Vec<String>,
    /// Search type (token|pattern|ac|regex)
    #[arg(short = 't', long = "type", default_value = "token")]
    pub typ: String,
    /// Fetch all matches page by page
    #[arg(short, long)]
    pub all: bool,
    #[arg(short, long)]
    pub ignore_case: bool,
    /// Maximal number of matches per request
    #[arg(short, long, default_value_t = 50)]
    pub max: i64,
    /// Number of matches to skip
    #[arg(short, long, default_value_t = 0)]
    pub skip: i64,
    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Delete books, pages or lines
    Books {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete users
    Users {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    pub id: String,
    #[arg(required = true)]
    pub user_ids: Vec<String>,
    /// Distribute pages randomly
    #[arg(short, long)]
    pub random: bool,
}

#[derive(Subcommand, Debug)]
pub enum PoolCommand {
    /// Write the zipped pool to stdout
    Download {
        /// Use the user pool instead of the global pool
        #[arg(short, long)]
        user: bool,
    },
    /// Download and extract the pool, then run commands in its corpus directory
    Run(PoolRunArgs),
}

#[derive(Args, Debug)]
pub struct PoolRunArgs {
    /// Use the user pool instead of the global pool
    #[arg(short, long)]
    pub user: bool,
    /// Keep the extracted files
    #[arg(short, long)]
    pub persistent: bool,
    /// Extract into this directory instead of a temporary one
    #[arg(short, long)]
    pub base: Option<PathBuf>,
    /// Shell command to run (can be repeated)
    #[arg(short, long = "command")]
    pub commands: Vec<String>,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(subcommand)]
    pub job: StartCommand,
    /// Do not wait for the job to finish
    #[arg(short, long, global = true)]
    pub nowait: bool,
    /// Seconds to sleep between status checks
    #[arg(short, long, global = true, default_value_t = 5)]
    pub sleep: u64,
    /// Give up after waiting this many seconds
    #[arg(long, global = true)]
    pub max_wait: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum StartCommand {
    /// Profile book ID
    Profile { id: String },
    /// Create the extended lexicon of book ID
    El { id: String },
    /// Run the post-correction of book ID
    Pc { id: String },
    /// Train an ocr model on book ID
    Train { id: String },
    /// Recognize book ID with the ocr model MODEL
    Predict { id: String, model: String },
}

#[derive(Subcommand, Debug)]
pub enum SnippetCommand {
    /// Download line snippets IDS into DIR
    Get {
        dir: PathBuf,
        #[arg(required = true)]
        ids: Vec<String>,
        /// Do not write ground truth files
        #[arg(short, long)]
        nogt: bool,
    },
    /// Upload snippet FILES (.png or .llocs) to the server
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Upload image data
        #[arg(short, long)]
        image: bool,
        /// Do not upload ocr data
        #[arg(short, long)]
        noocr: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pocowebc", "list", "books", "-J", "--url", "http://x"]);
        assert!(cli.global.json);
        assert_eq!(cli.global.url.as_deref(), Some("http://x"));
        assert!(matches!(cli.command, Command::List(ListCommand::Books { .. })));
    }

    #[test]
    fn test_start_options_after_job() {
        let cli = Cli::parse_from(["pocowebc", "start", "profile", "3", "--nowait", "-s", "1"]);
        let Command::Start(start) = cli.command else {
            panic!("expected start");
        };
        assert!(start.nowait);
        assert_eq!(start.sleep, 1);
        assert!(matches!(start.job, StartCommand::Profile { ref id } if id == "3"));
    }
}
