//! Effective configuration: file values, then CLI overrides, then validation.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::{AppConfig, project_dirs};
use super::args::CliArgs;
use crate::infrastructure::image::InvalidServerUrl;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that prevent the binary from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory is available.
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    /// The config file could not be read or the default one written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The default config could not be rendered.
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// The effective server URL is unusable.
    #[error(transparent)]
    InvalidServerUrl(#[from] InvalidServerUrl),
}

/// Locates `config.toml` and turns it into a validated [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Uses the platform config directory.
    ///
    /// # Errors
    /// Returns `ConfigError::ConfigDirNotFound` if the platform has none.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = project_dirs().ok_or(ConfigError::ConfigDirNotFound)?;
        Ok(Self::with_dir(dirs.config_dir().to_path_buf()))
    }

    /// Uses `config_dir` instead of the platform directory.
    #[must_use]
    pub const fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Config file used for `args`: `--config` if given, else the default.
    #[must_use]
    pub fn config_path(&self, args: &CliArgs) -> PathBuf {
        args.config
            .clone()
            .unwrap_or_else(|| self.config_dir.join(CONFIG_FILE_NAME))
    }

    /// Reads the config file (writing a default one if missing), applies
    /// `args` on top and checks the server URL.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or created, or if
    /// the resulting `server_url` is not an absolute http(s) URL.
    pub fn load(&self, args: &CliArgs) -> Result<AppConfig, ConfigError> {
        let path = self.config_path(args);
        let mut config = Self::read_or_create(&path)?;
        config.merge_with_args(args);
        config.photo_url_resolver()?;

        debug!(
            path = %path.display(),
            server = %config.server_url,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// A malformed file is left untouched and read as defaults.
    fn read_or_create(path: &Path) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
                AppConfig::default()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, writing defaults");
                let config = AppConfig::default();
                Self::write_atomically(path, &toml::to_string_pretty(&config)?)?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["locapp-photos"];
        argv.extend_from_slice(extra);
        argv.push("size");
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::with_dir(dir.path().join("locapp"));

        let config = loader.load(&args(&[])).unwrap();

        assert_eq!(config.memory_cache_size, 50);
        let written = fs::read_to_string(dir.path().join("locapp").join(CONFIG_FILE_NAME)).unwrap();
        assert!(written.contains("server_url"));
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("booklet.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "memory_cache_size = 7\n").unwrap();
        let loader = ConfigLoader::with_dir(dir.path().to_path_buf());

        let config = loader
            .load(&args(&["--config", path.to_str().unwrap()]))
            .unwrap();

        assert_eq!(config.memory_cache_size, 7);
        assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_args_override_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "server_url = \"https://old.example.com\"\nmemory_cache_size = 10\n",
        )
        .unwrap();
        let loader = ConfigLoader::with_dir(dir.path().to_path_buf());

        let config = loader
            .load(&args(&["--server-url", "https://booklet.example.com"]))
            .unwrap();

        assert_eq!(config.server_url, "https://booklet.example.com");
        assert_eq!(config.memory_cache_size, 10);
    }

    #[test]
    fn test_malformed_file_reads_as_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "server_url = [").unwrap();
        let loader = ConfigLoader::with_dir(dir.path().to_path_buf());

        let config = loader.load(&args(&[])).unwrap();

        assert_eq!(config.server_url, AppConfig::default().server_url);
        assert_eq!(fs::read_to_string(&path).unwrap(), "server_url = [");
    }

    #[test]
    fn test_invalid_server_url_in_file_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "server_url = \"booklet.example.com\"\n",
        )
        .unwrap();
        let loader = ConfigLoader::with_dir(dir.path().to_path_buf());

        let result = loader.load(&args(&[]));

        assert!(matches!(result, Err(ConfigError::InvalidServerUrl(_))));
    }

    #[test]
    fn test_invalid_server_url_from_args_is_rejected() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::with_dir(dir.path().to_path_buf());

        let result = loader.load(&args(&["--server-url", "ftp://booklet.example.com"]));

        assert!(matches!(result, Err(ConfigError::InvalidServerUrl(_))));
    }
}
