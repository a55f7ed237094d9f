use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::session::SessionIdentity;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub username: String,
    pub code: String,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            username: String::new(),
            code: String::new(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    username: Option<String>,
    code: Option<String>,
    log_filter: Option<String>,
}

impl ClientSettings {
    /// Defaults, then the config file (if present), then the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = Self::default();
        settings.merge_file(path)?;
        settings.merge_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file {}", path.display()))
            }
        };
        self.merge_toml(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.username {
            self.username = v;
        }
        if let Some(v) = file.code {
            self.code = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        Ok(())
    }

    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CODENAMES_SERVER_URL").or_else(|| lookup("APP__SERVER_URL")) {
            self.server_url = v;
        }
        if let Some(v) = lookup("CODENAMES_USERNAME").or_else(|| lookup("APP__USERNAME")) {
            self.username = v;
        }
        if let Some(v) = lookup("CODENAMES_CODE").or_else(|| lookup("APP__CODE")) {
            self.code = v;
        }
        if let Some(v) = lookup("RUST_LOG") {
            self.log_filter = v;
        }
    }

    pub fn identity(&self) -> Result<SessionIdentity> {
        let username = self.username.trim();
        if username.is_empty() {
            bail!("username is required (--username or CODENAMES_USERNAME)");
        }
        if self.code.trim().is_empty() {
            bail!("game code is required (--code or CODENAMES_CODE)");
        }
        Ok(SessionIdentity::new(username, self.code.as_str()))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
