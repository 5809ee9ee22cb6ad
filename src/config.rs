//! TOML configuration with environment overrides.
//!
//! The config file is optional: when it does not exist, [`Config::default`]
//! is used. After the file is read, `.env` is loaded and two environment
//! overrides apply:
//!
//! - `PORT` replaces the port of `server.bind`.
//! - The API key is read from the variable named by `llm.api_key_env`
//!   (default `OPENAI_API_KEY`); it is never stored in the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding `index.html`, `chat.html` and other UI assets.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Resolved from `api_key_env` at load time.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
            api_key: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

impl Config {
    /// Configuration that needs no file and no credentials.
    ///
    /// The completion API is disabled, so only the notes and upload
    /// endpoints are functional.
    pub fn minimal() -> Self {
        let mut config = Self::default();
        config.llm.provider = "disabled".to_string();
        config
    }

    /// Parsed `server.bind` address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("server.bind is not a socket address: {}", self.server.bind))
    }
}

/// Reads `path` if it exists, applies environment overrides and validates.
pub fn load_config(path: &Path) -> Result<Config> {
    // A missing .env is the normal case outside development.
    let _ = dotenvy::dotenv();
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], with the environment supplied by `env`.
pub fn load_config_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    if let Some(port) = env("PORT").filter(|p| !p.trim().is_empty()) {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        let mut addr = config.bind_addr()?;
        addr.set_port(port);
        config.server.bind = addr.to_string();
    }

    config.llm.api_key = env(&config.llm.api_key_env).filter(|k| !k.is_empty());

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    config.bind_addr()?;

    match config.llm.provider.as_str() {
        "openai" | "disabled" => {}
        other => bail!(
            "Unknown llm provider: '{}'. Must be openai or disabled.",
            other
        ),
    }

    if config.llm.is_enabled() && config.llm.model.trim().is_empty() {
        bail!("llm.model must not be empty");
    }

    if config.upload.max_bytes == 0 {
        bail!("upload.max_bytes must be > 0");
    }

    Ok(())
}
