use serde::{Deserialize, Serialize};

use std::{env, fmt, fs, path::Path, time::Duration};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub gemini: GeminiConfig,
    /// Origins allowed by CORS. Empty or `"*"` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Report generation failures with an error status instead of a 200 text body
    #[serde(default)]
    pub strict_errors: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Endpoint prefix, the API key is appended verbatim
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

// Keeps the key out of logs
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    #[error("failed to parse {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error(
        "config file not found and environment variables are incomplete. \
         Tried: '{path}', 'config.yaml', 'config.example.yaml', and environment variables. \
         Error: {source}"
    )]
    NotFound {
        path: String,
        source: Box<ConfigError>,
    },
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn load_from_file(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
        path: path.to_string(),
        source,
    })
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

pub fn load_from_env<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let timeout = lookup("GEMINI_TIMEOUT")
        .map(|raw| -> Result<Duration, ConfigError> {
            humantime_serde::deserialize(serde_yaml::Value::String(raw)).map_err(|e| {
                ConfigError::InvalidEnv {
                    name: "GEMINI_TIMEOUT",
                    reason: e.to_string(),
                }
            })
        })
        .transpose()?;

    let gemini = GeminiConfig {
        api_url: required(&lookup, "GEMINI_API_URL")?,
        api_key: required(&lookup, "GEMINI_API_KEY")?,
        timeout,
    };

    let port = match lookup("PORT") {
        Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidEnv {
            name: "PORT",
            reason: e.to_string(),
        })?,
        None => DEFAULT_PORT,
    };

    let allowed_origins = lookup("ALLOWED_ORIGINS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    let strict_errors = match lookup("STRICT_ERRORS") {
        Some(raw) => raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnv {
            name: "STRICT_ERRORS",
            reason: e.to_string(),
        })?,
        None => false,
    };

    Ok(Config {
        port,
        gemini,
        allowed_origins,
        strict_errors,
    })
}

/// Lets deployments keep the API key out of the config file.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY").filter(|key| !key.is_empty()) {
        tracing::info!("Using Gemini API key from GEMINI_API_KEY");
        config.gemini.api_key = key;
    }
    config
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path =
        env::var("EMAIL_WRITER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path).map(|cfg| apply_env_overrides(cfg, env_lookup));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml").map(|cfg| apply_env_overrides(cfg, env_lookup));
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return load_from_file("config.example.yaml")
            .map(|cfg| apply_env_overrides(cfg, env_lookup));
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    match load_from_env(env_lookup) {
        Ok(config) => {
            tracing::info!("Successfully loaded configuration from environment variables");
            Ok(config)
        }
        Err(e) => Err(ConfigError::NotFound {
            path: config_path,
            source: Box::new(e),
        }),
    }
}
