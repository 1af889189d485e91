//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::api::DEFAULT_API_PATH;
use crate::infrastructure::image::disk_store::PHOTOS_DIR_NAME;
use crate::infrastructure::image::memory_cache::DEFAULT_CACHE_SIZE;
use crate::infrastructure::image::{InvalidServerUrl, PhotoUrlResolver};

const APP_NAME: &str = "locapp";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "locapp";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI
/// arguments.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Booklet server base URL, shared by the API and photo uploads.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// API prefix below the server URL.
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Bearer token for the mobile API.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Photo store root. Defaults to the platform data directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Number of decoded images kept in memory.
    #[serde(default = "default_memory_cache_size")]
    pub memory_cache_size: usize,

    /// HTTP request timeout in seconds. Unset or 0 keeps reqwest's default,
    /// which never times out.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_server_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

const fn default_memory_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(server_url) = &args.server_url {
            self.server_url.clone_from(server_url);
        }
        if let Some(token) = &args.token {
            self.auth_token = Some(token.clone());
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache_dir = Some(cache_dir.clone());
        }
        if let Some(timeout) = args.timeout {
            self.request_timeout_secs = Some(timeout);
        }
    }

    /// Builds the URL resolver for the configured server.
    ///
    /// # Errors
    /// Returns error if `server_url` is not an absolute http(s) URL.
    pub fn photo_url_resolver(&self) -> Result<PhotoUrlResolver, InvalidServerUrl> {
        PhotoUrlResolver::new(&self.server_url)
    }

    /// HTTP request timeout, if one is configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns effective photo store root, if one can be determined.
    #[must_use]
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(PHOTOS_DIR_NAME)))
    }
}

/// Platform directories for the application.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            server_url: default_server_url(),
            api_path: default_api_path(),
            auth_token: None,
            cache_dir: None,
            memory_cache_size: DEFAULT_CACHE_SIZE,
            request_timeout_secs: None,
        }
    }
}
