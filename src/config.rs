// config.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;

use crate::controller::Mode;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Parser)]
#[command(name = "keycalc", version, about = "Terminal calculator backed by a remote evaluation service")]
pub struct Args {
    /// Base URL of the evaluation service
    #[arg(long, env = "KEYCALC_SERVER")]
    pub server: Option<String>,
    /// Configuration file (default: <config dir>/keycalc/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Use the line editor instead of the keypad
    #[arg(long)]
    pub line: bool,
    /// Start in scientific mode
    #[arg(long)]
    pub scientific: bool,
    /// Check that the evaluation service is healthy and exit
    #[arg(long)]
    pub check: bool,
    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontEnd {
    #[default]
    Keypad,
    Line,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server_url: String,
    pub error_reset_ms: u64,
    pub request_timeout_secs: u64,
    pub mode: Mode,
    pub front_end: FrontEnd,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            error_reset_ms: 2000,
            request_timeout_secs: 10,
            mode: Mode::Basic,
            front_end: FrontEnd::Keypad,
            log_file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("keycalc").join("config.toml"))
    }

    /// Load `path`, or the default file when it exists, or built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Command-line flags win over the file.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(server) = &args.server {
            self.server_url = server.clone();
        }
        if args.line {
            self.front_end = FrontEnd::Line;
        }
        if args.scientific {
            self.mode = Mode::Scientific;
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = Some(log_file.clone());
        }
        self
    }

    pub fn server_url(&self) -> Result<Url> {
        Url::parse(&self.server_url).with_context(|| format!("invalid server url `{}`", self.server_url))
    }

    pub fn error_reset(&self) -> Duration {
        Duration::from_millis(self.error_reset_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
