// Configuration loader
// Reads ~/.solace/config.toml (or an explicit path), then applies environment overrides

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{solace_dir, Config, StoreKind};
use crate::errors::{config_parse_error, file_not_found_error};

pub const ENV_BIND: &str = "SOLACE_BIND";
pub const ENV_DATA_DIR: &str = "SOLACE_DATA_DIR";
pub const ENV_STORE: &str = "SOLACE_STORE";

pub fn default_config_path() -> PathBuf {
    solace_dir().join("config.toml")
}

/// Load configuration
///
/// An explicit path must exist; the default path is optional and falls back
/// to built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!(file_not_found_error(&path.display().to_string(), "Config file"));
            }
            load_from_file(path)?
        }
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                load_from_file(&default_path)?
            } else {
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str(&contents)
        .map_err(|e| anyhow!(config_parse_error(&path.display().to_string(), &e.to_string())))
}

/// Apply SOLACE_* overrides; `lookup` abstracts the environment for tests
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
        config.server.bind_address = bind;
    }

    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(dir);
        config.data.lexicon_path = Some(dir.join("lexicon.json"));
        config.data.knowledge_path = Some(dir.join("knowledge_base.json"));
        config.data.guide_questions_path = Some(dir.join("guide_questions.json"));
    }

    if let Some(kind) = lookup(ENV_STORE).filter(|v| !v.is_empty()) {
        config.storage.kind = kind
            .parse::<StoreKind>()
            .map_err(|e| anyhow!("{}: {}", ENV_STORE, e))?;
    }

    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    let p = config.chat.continuity_probability;
    if !(0.0..=1.0).contains(&p) {
        bail!("chat.continuity_probability must be within 0.0..=1.0, got {}", p);
    }
    if config.server.bind_address.trim().is_empty() {
        bail!("server.bind_address must not be empty");
    }
    Ok(())
}
