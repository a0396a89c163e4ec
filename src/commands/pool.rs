use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::TempDir;

use super::Globals;
use crate::archive;
use crate::cli::{PoolCommand, PoolRunArgs};
use crate::config::{AUTH_ENV, URL_ENV};

pub async fn run(globals: &Globals, command: PoolCommand) -> Result<()> {
    match command {
        PoolCommand::Download { user } => {
            let pool = download_pool(globals, user).await?;
            let mut out = std::io::stdout().lock();
            out.write_all(&pool)?;
            out.flush()?;
            Ok(())
        }
        PoolCommand::Run(args) => run_pool(globals, args).await,
    }
}

async fn download_pool(globals: &Globals, user: bool) -> Result<Vec<u8>> {
    let pool = globals
        .client()?
        .download_pool(user)
        .await
        .with_context(|| format!("cannot download {} pool", if user { "user" } else { "global" }))?;
    tracing::debug!("downloaded {:.2}MB", pool.len() as f64 / (1024.0 * 1024.0));
    Ok(pool)
}

/// Where the pool gets extracted. A temporary directory is removed on drop
/// unless it is made persistent; a directory given with `--base` is never
/// removed.
enum BaseDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl BaseDir {
    fn new(base: Option<PathBuf>, persistent: bool) -> Result<Self> {
        if let Some(base) = base {
            std::fs::create_dir_all(&base)
                .with_context(|| format!("cannot create {}", base.display()))?;
            return Ok(BaseDir::Kept(base));
        }
        let dir = tempfile::Builder::new()
            .prefix("pocowebc_pool_")
            .tempdir()
            .context("cannot create temporary directory")?;
        if persistent {
            return Ok(BaseDir::Kept(dir.into_path()));
        }
        Ok(BaseDir::Temp(dir))
    }

    fn path(&self) -> &Path {
        match self {
            BaseDir::Temp(dir) => dir.path(),
            BaseDir::Kept(path) => path,
        }
    }
}

/// Downloads and extracts the pool, then runs every command with `sh -c` in
/// the pool's `corpus` directory. The child processes inherit the login
/// through the environment.
async fn run_pool(globals: &Globals, args: PoolRunArgs) -> Result<()> {
    let pool = download_pool(globals, args.user).await?;
    let base = BaseDir::new(args.base, args.persistent)?;
    let entries = archive::extract(&pool, base.path())
        .with_context(|| format!("cannot extract pool to {}", base.path().display()))?;
    tracing::debug!(entries, dir = %base.path().display(), "extracted pool");

    let corpus = base.path().join("corpus");
    for command in &args.commands {
        tracing::debug!(%command, "run");
        let mut child = tokio::process::Command::new("sh");
        child.arg("-c").arg(command).current_dir(&corpus);
        for name in URL_ENV {
            child.env(name, &globals.settings.url);
        }
        for name in AUTH_ENV {
            child.env(name, &globals.settings.auth);
        }
        let status = child
            .status()
            .await
            .with_context(|| format!("cannot run {:?}", command))?;
        if !status.success() {
            bail!("command {:?} failed: {}", command, status);
        }
    }
    if let BaseDir::Kept(path) = &base {
        eprintln!("{}", path.display());
    }
    Ok(())
}
