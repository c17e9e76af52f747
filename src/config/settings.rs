// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Directory holding config, store snapshot and logs (~/.solace)
pub fn solace_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".solace"))
        .unwrap_or_else(|| PathBuf::from(".solace"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Data files; unset paths use the copies built into the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub lexicon_path: Option<PathBuf>,
    pub knowledge_path: Option<PathBuf>,
    pub guide_questions_path: Option<PathBuf>,
    /// Enrich replies from the knowledge base
    pub knowledge_enabled: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            lexicon_path: None,
            knowledge_path: None,
            guide_questions_path: None,
            knowledge_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => Err(format!("unknown store kind '{}' (expected memory or file)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub kind: StoreKind,
    /// Snapshot file for the file store
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: solace_dir().join("store.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Recent turns remembered per user
    pub memory_depth: usize,
    /// Chance of prefixing a continuity phrase when memory exists
    pub continuity_probability: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            memory_depth: 3,
            continuity_probability: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append logs to this file in addition to stderr
    pub file: Option<PathBuf>,
}
