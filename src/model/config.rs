use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const ENV_CONFIG_PATH: &str = "CLAUSESPY_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ANALYSIS_MODEL: &str = "gpt-4o-mini";

const DEFAULT_MAX_DOCUMENT_CHARS: usize = 120_000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_UPLOAD_DIR_NAME: &str = "clausespy-uploads";
const DEFAULT_STORE_TTL_SECONDS: u64 = 3600;
const DEFAULT_STORE_MAX_ENTRIES: usize = 1024;

/// How the normalizer treats replies that are valid JSON but miss fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Missing or malformed fields turn the reply into an error result
    #[default]
    Strict,
    /// Missing fields are defaulted and reported as warnings
    Lenient,
}

/// Pipeline tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_policy: SchemaPolicy,
    /// Longest document text (in characters) embedded in a prompt
    pub max_document_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::default(),
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }
}

/// Upload handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    /// Directory for scoped upload files. Defaults to a folder under the system temp dir.
    pub dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            dir: None,
        }
    }
}

impl UploadConfig {
    pub fn upload_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_UPLOAD_DIR_NAME))
    }
}

/// Completed-result store limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_STORE_TTL_SECONDS,
            max_entries: DEFAULT_STORE_MAX_ENTRIES,
        }
    }
}

/// Completion service connection settings (environment only)
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Validated at load time
    pub base_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_ANALYSIS_MODEL.to_string(),
        }
    }
}

impl LlmConfig {
    fn from_env() -> Self {
        let api_key = std::env::var(ENV_OPENAI_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());

        let base_url = match std::env::var(ENV_OPENAI_BASE_URL) {
            Ok(raw) => match Url::parse(&raw) {
                Ok(_) => raw.trim_end_matches('/').to_string(),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid OPENAI_BASE_URL, using default");
                    DEFAULT_OPENAI_BASE_URL.to_string()
                }
            },
            Err(_) => DEFAULT_OPENAI_BASE_URL.to_string(),
        };

        let model = std::env::var(ENV_ANALYSIS_MODEL)
            .unwrap_or_else(|_| DEFAULT_ANALYSIS_MODEL.to_string());

        Self {
            api_key,
            base_url,
            model,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub analysis: AnalysisConfig,
    pub upload: UploadConfig,
    pub store: StoreConfig,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            analysis: AnalysisConfig::default(),
            upload: UploadConfig::default(),
            store: StoreConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(Path::new(&config_path)).unwrap_or_default();

        Self {
            port,
            host,
            analysis: file.analysis,
            upload: file.upload,
            store: file.store,
            llm: LlmConfig::from_env(),
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &Path) -> Option<ConfigFile> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
