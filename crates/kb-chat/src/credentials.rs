//! API key persistence in an env file

use std::path::{Path, PathBuf};

use crate::config::FilesConfig;
use crate::error::{Error, Result};

/// Reads and writes the provider key in a `KEY=value` env file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    key_var: String,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, key_var: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key_var: key_var.into(),
        }
    }

    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(config.env_file.clone(), config.api_key_var.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored key; the process environment is consulted when the env
    /// file does not set it. Blank values count as missing.
    pub fn load(&self) -> Result<Option<String>> {
        if self.path.exists() {
            let entries = dotenvy::from_path_iter(&self.path).map_err(|e| {
                Error::configuration(format!("{}: {}", self.path.display(), e))
            })?;

            for entry in entries {
                let (name, value) = entry.map_err(|e| {
                    Error::configuration(format!("{}: {}", self.path.display(), e))
                })?;
                if name == self.key_var && !value.trim().is_empty() {
                    return Ok(Some(value.trim().to_string()));
                }
            }
        }

        Ok(std::env::var(&self.key_var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// Store the key, replacing any existing assignment and keeping other lines
    pub fn save(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::configuration("No API key entered."));
        }

        let existing = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let assignment = format!("{}={}", self.key_var, key);
        let mut replaced = false;
        let mut lines: Vec<String> = existing
            .lines()
            .filter_map(|line| {
                if !self.assigns_key(line) {
                    return Some(line.to_string());
                }
                if replaced {
                    return None;
                }
                replaced = true;
                Some(assignment.clone())
            })
            .collect();

        if !replaced {
            lines.push(assignment);
        }

        let mut content = lines.join("\n");
        content.push('\n');
        std::fs::write(&self.path, content)?;

        tracing::info!("API key saved to {}", self.path.display());
        Ok(())
    }

    fn assigns_key(&self, line: &str) -> bool {
        let line = line.trim_start();
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        line.split_once('=')
            .map(|(name, _)| name.trim() == self.key_var)
            .unwrap_or(false)
    }
}
