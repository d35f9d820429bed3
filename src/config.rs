use crate::assembler::AssemblerConfig;
use crate::error::{Result, ScraperError};
use crate::types::Source;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Verbosity of the console and file logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub backoff_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_ms: 500,
            user_agent: crate::constants::USER_AGENT.to_string(),
        }
    }
}

/// Everything a run needs, resolved once at startup and passed down
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    /// JSON log files are written here when set
    pub log_dir: Option<PathBuf>,
    pub debug_dump_enabled: bool,
    pub debug_dir: PathBuf,
    pub output_path: PathBuf,
    pub sources: Vec<Source>,
    pub http: HttpConfig,
    pub assembler: AssemblerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_dir: None,
            debug_dump_enabled: false,
            debug_dir: PathBuf::from("debug"),
            output_path: PathBuf::from("output/events.csv"),
            sources: Source::ALL.to_vec(),
            http: HttpConfig::default(),
            assembler: AssemblerConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "expo_scraper.toml";

    /// Load `path`, or `expo_scraper.toml` if it exists, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(Self::DEFAULT_PATH).exists() => {
                Self::from_file(Path::new(Self::DEFAULT_PATH))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(ScraperError::Config("at least one source must be enabled".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ScraperError::Config("http.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
