//! Configuration module for proxy-probe.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for the probe client
#[derive(Parser, Debug)]
#[command(name = "proxy-probe")]
#[command(author = "proxy-probe authors")]
#[command(version = "0.1.0")]
#[command(about = "Send one raw HTTP request through a local proxy and dump the reply", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Proxy endpoint to dial (e.g., 127.0.0.1:7077)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Remote host named in the request line and Host header
    #[arg(short, long)]
    pub remote_host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoint the probe connects to
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_target")]
    pub address: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            address: default_target(),
        }
    }
}

/// Request contents
#[derive(Debug, Deserialize)]
pub struct RequestConfig {
    /// Host substituted into the request template
    #[serde(default = "default_remote_host")]
    pub remote_host: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            remote_host: default_remote_host(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_target() -> String {
    "127.0.0.1:7077".to_string()
}

fn default_remote_host() -> String {
    "www.cnbeta.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub target: String,
    pub remote_host: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Self::merge(cli, toml_config))
    }

    /// Merge CLI args over TOML values (CLI takes precedence)
    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        Config {
            target: cli.target.unwrap_or(toml_config.target.address),
            remote_host: cli
                .remote_host
                .unwrap_or(toml_config.request.remote_host),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.target.address, "127.0.0.1:7077");
        assert_eq!(config.request.remote_host, "www.cnbeta.com");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [target]
            address = "10.0.0.2:8080"

            [request]
            remote_host = "example.org"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.target.address, "10.0.0.2:8080");
        assert_eq!(config.request.remote_host, "example.org");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str("[request]\nremote_host = \"a.test\"\n").unwrap();
        assert_eq!(config.target.address, "127.0.0.1:7077");
        assert_eq!(config.request.remote_host, "a.test");
    }

    #[test]
    fn test_no_args_uses_defaults() {
        let config = Config::from_args(CliArgs::parse_from(["proxy-probe"])).unwrap();
        assert_eq!(config.target, "127.0.0.1:7077");
        assert_eq!(config.remote_host, "www.cnbeta.com");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
            [target]
            address = "10.0.0.2:8080"

            [request]
            remote_host = "from-file.test"

            [logging]
            level = "warn"
        "#,
        )
        .unwrap();
        let cli = CliArgs::parse_from([
            "proxy-probe",
            "--target",
            "127.0.0.1:9999",
            "--log-level",
            "trace",
        ]);

        let config = Config::merge(cli, toml_config);
        assert_eq!(config.target, "127.0.0.1:9999");
        assert_eq!(config.remote_host, "from-file.test");
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliArgs::parse_from(["proxy-probe", "-c", "/nonexistent/proxy-probe.toml"]);
        match Config::from_args(cli) {
            Err(ConfigError::FileRead(path, _)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/proxy-probe.toml"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
