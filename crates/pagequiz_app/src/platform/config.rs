use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pagequiz_engine::{
    CaptureSettings, EngineSettings, FetchSettings, GenerationSettings, DEFAULT_ENDPOINT,
    DEFAULT_MODEL,
};
use pagequiz_logging::quiz_info;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "./pagequiz.ron";
const DEFAULT_STORAGE_FILE: &str = "./.pagequiz_state.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub capture: CaptureConfig,
    pub fetch: FetchConfig,
    pub storage_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub question_count: usize,
    pub max_source_chars: usize,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub initial_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub min_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            capture: CaptureConfig::default(),
            fetch: FetchConfig::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_FILE),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            question_count: 3,
            max_source_chars: 8000,
            request_timeout_secs: None,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            retry_delay_ms: 1000,
            max_retries: 3,
            min_chars: 50,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Reads `explicit` when given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let config = Self::from_file(&path)?;
        quiz_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.fetch.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
                redirect_limit: self.fetch.redirect_limit,
                max_bytes: self.fetch.max_bytes,
                ..FetchSettings::default()
            },
            capture: CaptureSettings {
                initial_delay: Duration::from_millis(self.capture.initial_delay_ms),
                retry_delay: Duration::from_millis(self.capture.retry_delay_ms),
                max_retries: self.capture.max_retries,
                min_chars: self.capture.min_chars,
            },
            generation: GenerationSettings {
                endpoint: self.generation.endpoint.clone(),
                model: self.generation.model.clone(),
                temperature: self.generation.temperature,
                max_tokens: self.generation.max_tokens,
                question_count: self.generation.question_count,
                max_source_chars: self.generation.max_source_chars,
                request_timeout: self.generation.request_timeout_secs.map(Duration::from_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_engine_defaults() {
        let settings = AppConfig::default().engine_settings();
        assert_eq!(settings.generation, GenerationSettings::default());
        assert_eq!(settings.capture, CaptureSettings::default());
        assert_eq!(settings.fetch.max_bytes, FetchSettings::default().max_bytes);
        assert_eq!(settings.fetch.redirect_limit, FetchSettings::default().redirect_limit);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pagequiz.ron");
        fs::write(
            &path,
            r#"(
                generation: (question_count: 5, request_timeout_secs: Some(20)),
                storage_path: "/tmp/keys.ron",
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.generation.question_count, 5);
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert_eq!(config.capture, CaptureConfig::default());
        assert_eq!(config.storage_path, PathBuf::from("/tmp/keys.ron"));
        assert_eq!(
            config.engine_settings().generation.request_timeout,
            Some(Duration::from_secs(20))
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(generation: [").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
