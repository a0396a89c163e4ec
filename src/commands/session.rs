use std::io::Write;

use anyhow::{Context, Result};

use super::Globals;
use crate::client::Client;
use crate::format::FormatOptions;

/// Without credentials prints the current session. Otherwise logs in and
/// stores url and token in the config file.
pub async fn login(globals: &Globals, email: Option<String>, password: Option<String>) -> Result<()> {
    let settings = &globals.settings;
    let (client, session) = match (email, password) {
        (Some(email), Some(password)) => {
            let (client, session) =
                Client::login(&settings.url, &email, &password, settings.skip_verify)
                    .await
                    .with_context(|| format!("cannot login {}", email))?;
            settings
                .persist(&settings.url, &session.auth)
                .context("cannot save login")?;
            (client, session)
        }
        _ => {
            let client = globals.client()?;
            let session = client.get_login().await.context("cannot get login")?;
            (client, session)
        }
    };
    let mut ctx = globals.context_with(client, FormatOptions::default());
    ctx.add(session)?;
    ctx.finish()?;
    Ok(())
}

pub async fn logout(globals: &Globals) -> Result<()> {
    let client = globals.client()?;
    client.logout().await.context("cannot logout")?;
    globals
        .settings
        .persist(&globals.settings.url, "")
        .context("cannot save logout")?;
    Ok(())
}

pub async fn version(globals: &Globals) -> Result<()> {
    let settings = &globals.settings;
    let client = Client::new(&settings.url, settings.skip_verify)?;
    let version = client.api_version().await.context("cannot get version")?;
    let mut ctx = globals.context_with(client, FormatOptions::default());
    ctx.add(version)?;
    ctx.finish()?;
    Ok(())
}

pub async fn raw(globals: &Globals, path: &str) -> Result<()> {
    let body = globals
        .client()?
        .raw(path)
        .await
        .with_context(|| format!("cannot get {}", path))?;
    let mut out = std::io::stdout().lock();
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}
