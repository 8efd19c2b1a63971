//! Runtime settings loaded from an optional TOML file.

use coinshell_lib::{
    ChartOptions, ClientConfig, DEFAULT_MAX_COLUMN_WIDTH, Endpoints, OutputFormat,
};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Settings file layout. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) client: ClientSection,
    pub(crate) endpoints: Endpoints,
    pub(crate) display: DisplaySection,
}

/// HTTP client section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ClientSection {
    /// Request timeout in seconds
    pub(crate) timeout_secs: u64,
    /// Connection timeout in seconds
    pub(crate) connect_timeout_secs: u64,
    /// Retries for rate-limited or failed requests
    pub(crate) max_retries: u32,
    /// First backoff delay in milliseconds
    pub(crate) base_delay_ms: u64,
    /// Backoff cap in milliseconds
    pub(crate) max_delay_ms: u64,
    /// User-Agent header, defaults to `coinshell/<version>`
    pub(crate) user_agent: Option<String>,
}

impl Default for ClientSection {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            timeout_secs: defaults.timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            max_retries: defaults.max_retries,
            base_delay_ms: defaults.base_delay_ms,
            max_delay_ms: defaults.max_delay_ms,
            user_agent: None,
        }
    }
}

impl ClientSection {
    pub(crate) fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

/// Output section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplaySection {
    /// Quote currency when a command gets no `--vs`
    pub(crate) default_vs: String,
    /// Rows shown when a listing gets no `--top`
    pub(crate) top: usize,
    /// table, csv, tsv, json or ndjson
    pub(crate) format: String,
    /// Longest cell in text tables, 0 for no limit
    pub(crate) max_column_width: usize,
    /// Candle columns in charts
    pub(crate) chart_width: usize,
    /// Price rows in charts
    pub(crate) chart_height: usize,
}

impl Default for DisplaySection {
    fn default() -> Self {
        let chart = ChartOptions::default();
        Self {
            default_vs: "usd".to_string(),
            top: 15,
            format: OutputFormat::default().as_str().to_string(),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            chart_width: chart.width,
            chart_height: chart.height,
        }
    }
}

impl DisplaySection {
    pub(crate) fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.format
            .parse()
            .map_err(|e| ConfigError::Validation(format!("display.format: {e}")))
    }

    pub(crate) const fn chart(&self) -> ChartOptions {
        ChartOptions {
            width: self.chart_width,
            height: self.chart_height,
        }
    }
}

impl Settings {
    /// Validate all configuration parameters
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "client.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.client.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "client.connect_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.client.max_delay_ms < self.client.base_delay_ms {
            return Err(ConfigError::Validation(format!(
                "client.max_delay_ms ({}) must be >= client.base_delay_ms ({})",
                self.client.max_delay_ms, self.client.base_delay_ms
            )));
        }

        for (name, url) in [
            ("coingecko", &self.endpoints.coingecko),
            ("coinpaprika", &self.endpoints.coinpaprika),
            ("binance", &self.endpoints.binance),
            ("coingecko_web", &self.endpoints.coingecko_web),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "endpoints.{name} cannot be empty"
                )));
            }
        }

        if self.display.default_vs.trim().is_empty() {
            return Err(ConfigError::Validation(
                "display.default_vs cannot be empty".to_string(),
            ));
        }

        if self.display.top == 0 {
            return Err(ConfigError::Validation(
                "display.top must be > 0".to_string(),
            ));
        }

        if self.display.chart_width < 20 || self.display.chart_height < 5 {
            return Err(ConfigError::Validation(format!(
                "chart must be at least 20x5, got {}x{}",
                self.display.chart_width, self.display.chart_height
            )));
        }

        self.display.output_format()?;
        Ok(())
    }
}

/// Platform config file, e.g. `~/.config/coinshell/config.toml`.
pub(crate) fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "coinshell").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load settings from a TOML file
pub(crate) fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = toml::from_str(&content)?;
    settings.validate()?;
    Ok(settings)
}

/// Loads `explicit` if given, else the platform file if it exists, else defaults.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    match default_path() {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "loading configuration");
            load_file(&path)
        }
        _ => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.endpoints, Endpoints::default());
        assert_eq!(settings.display.output_format().unwrap(), OutputFormat::Table);
        assert_eq!(settings.client.client_config().max_retries, ClientConfig::default().max_retries);
    }

    #[test]
    fn test_partial_file() {
        let file = write_config(
            r#"
[client]
timeout_secs = 5

[endpoints]
coingecko = "http://localhost:8080/api/v3"

[display]
format = "csv"
top = 50
"#,
        );
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.client.client_config().timeout, Duration::from_secs(5));
        assert_eq!(settings.client.connect_timeout_secs, 10);
        assert_eq!(settings.endpoints.coingecko, "http://localhost:8080/api/v3");
        assert_eq!(settings.endpoints.binance, Endpoints::default().binance);
        assert_eq!(settings.display.output_format().unwrap(), OutputFormat::Csv);
        assert_eq!(settings.display.top, 50);
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            "[client]\ntimeout_secs = 0",
            "[client]\nbase_delay_ms = 1000\nmax_delay_ms = 10",
            "[endpoints]\nbinance = \"\"",
            "[display]\nformat = \"xml\"",
            "[display]\ntop = 0",
        ];
        for case in cases {
            let file = write_config(case);
            let err = load(Some(file.path())).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)), "{case}: {err}");
        }
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let file = write_config("[display]\ncolour = true");
        assert!(matches!(load(Some(file.path())), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
