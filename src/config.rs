use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Directory holding the HTML views and static assets
    pub public_dir: PathBuf,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
    pub session_ttl_minutes: i64,
    /// How often expired sessions are swept from memory
    pub session_purge_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            public_dir: PathBuf::from("public"),
            secure_cookies: false,
            session_ttl_minutes: 60,
            session_purge_seconds: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// GeoJSON boundary used by the geofilter
    pub boundary: PathBuf,
    /// CSV with the location rows
    pub locations: PathBuf,
    pub questions: PathBuf,
    pub users: PathBuf,
    /// Append-only JSON lines file for classified survey answers
    pub survey_log: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            boundary: PathBuf::from("data/mx.json"),
            locations: PathBuf::from("data/arca_data.csv"),
            questions: PathBuf::from("data/preguntas.json"),
            users: PathBuf::from("users_db.json"),
            survey_log: PathBuf::from("data/respuestas.jsonl"),
        }
    }
}

/// External text-generation service used by `/api/chat`.
///
/// The API key is not part of the file; it comes from `GEMINI_API_KEY`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
