use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const URL_ENV: [&str; 2] = ["POCOWEBC_URL", "PCWCLIENT_URL"];
pub const AUTH_ENV: [&str; 2] = ["POCOWEBC_AUTH", "PCWCLIENT_AUTH"];
pub const CONFIG_ENV: &str = "POCOWEBC_CONFIG";

/// Login information persisted between invocations.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "Auth", default)]
    pub auth: String,
}

impl Config {
    /// Loads the config file at `path`. A missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut content = format!(
            "# Automatically created by pocowebc at {}\n",
            chrono::Local::now().to_rfc3339()
        );
        content.push_str(&toml::to_string(self).context("Failed to encode config")?);
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

/// Default location of the config file: `$POCOWEBC_CONFIG` or
/// `<config dir>/pocowebc/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("pocowebc").join("config.toml"))
}

/// Picks the first non empty value of: the command line flag, the given
/// environment variables in order, the config file entry.
pub fn resolve<F>(flag: Option<&str>, env_names: &[&str], env: F, file: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(flag) = flag.filter(|f| !f.is_empty()) {
        return flag.to_string();
    }
    env_names
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| file.to_string())
}

/// Connection settings of one invocation, built once in `main`.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub url: String,
    pub auth: String,
    pub skip_verify: bool,
    /// `None` when `--noconfig` is given.
    pub config_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_sources<F>(
        url: Option<&str>,
        auth: Option<&str>,
        skip_verify: bool,
        config_path: Option<PathBuf>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match &config_path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(Settings {
            url: resolve(url, &URL_ENV, &env, &file.url),
            auth: resolve(auth, &AUTH_ENV, &env, &file.auth),
            skip_verify,
            config_path,
        })
    }

    /// Stores url and auth in the config file unless running without one.
    pub fn persist(&self, url: &str, auth: &str) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let config = Config {
            url: url.to_string(),
            auth: auth.to_string(),
        };
        config.save(path)?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pocowebc").join("config.toml");
        let config = Config {
            url: "https://pocoweb.example.org/rest".to_string(),
            auth: "secret".to_string(),
        };
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Automatically created by pocowebc"));
        assert!(content.contains("URL = "));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_resolve_precedence() {
        let env = env_from(&[("PCWCLIENT_URL", "http://old"), ("POCOWEBC_URL", "")]);
        assert_eq!(resolve(Some("http://flag"), &URL_ENV, &env, "http://file"), "http://flag");
        assert_eq!(resolve(None, &URL_ENV, &env, "http://file"), "http://old");

        let env = env_from(&[]);
        assert_eq!(resolve(Some(""), &URL_ENV, &env, "http://file"), "http://file");
    }

    #[test]
    fn test_settings_without_config_file() {
        let env = env_from(&[("POCOWEBC_AUTH", "token")]);
        let settings =
            Settings::from_sources(Some("http://localhost"), None, true, None, env).unwrap();
        assert_eq!(settings.url, "http://localhost");
        assert_eq!(settings.auth, "token");
        assert!(settings.skip_verify);
        // no config file, nothing to write
        settings.persist("http://localhost", "other").unwrap();
    }

    #[test]
    fn test_settings_persist_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let settings =
            Settings::from_sources(None, None, false, Some(path.clone()), env_from(&[])).unwrap();
        assert!(settings.url.is_empty());
        settings.persist("http://host", "auth").unwrap();

        let settings =
            Settings::from_sources(None, None, false, Some(path), env_from(&[])).unwrap();
        assert_eq!(settings.url, "http://host");
        assert_eq!(settings.auth, "auth");
    }
}
