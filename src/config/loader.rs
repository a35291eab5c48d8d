use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8004;
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3 * 60 * 60);
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Local,
    Drive,
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageKind::Local),
            "drive" | "gdrive" => Ok(StorageKind::Drive),
            other => Err(ConfigError::InvalidValue {
                key: "STORAGE_BACKEND".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,
    /// Directory for `local`, parent folder id for `drive`.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: StorageKind::default(),
            destination: None,
            credentials_path: None,
            access_token: None,
            api_base_url: default_api_base_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_require_auth")]
    pub require_auth: bool,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL.as_secs()
}

fn default_require_auth() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_api_base_url() -> String {
    DEFAULT_DRIVE_API_BASE_URL.to_string()
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn new() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_file(input_file: &str) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(input_file)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageKind::default(),
        };

        let destination = match backend {
            StorageKind::Local => get("STORAGE_DESTINATION"),
            StorageKind::Drive => get("STORAGE_DESTINATION").or_else(|| get("DRIVE_FOLDER_ID")),
        };

        let config = Config {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            jwt_secret: get("JWT_SECRET").unwrap_or_default(),
            token_ttl_secs: parse_or(
                "TOKEN_TTL_SECS",
                get("TOKEN_TTL_SECS"),
                DEFAULT_TOKEN_TTL.as_secs(),
            )?,
            require_auth: parse_or("REQUIRE_AUTH", get("REQUIRE_AUTH"), true)?,
            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                get("MAX_BODY_BYTES"),
                DEFAULT_MAX_BODY_BYTES,
            )?,
            storage: StorageConfig {
                backend,
                destination,
                credentials_path: get("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
                access_token: get("DRIVE_ACCESS_TOKEN"),
                api_base_url: get("DRIVE_API_BASE_URL").unwrap_or_else(default_api_base_url),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.token_ttl_secs == 0 || self.token_ttl() > MAX_TOKEN_TTL {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_TTL_SECS".to_string(),
                value: self.token_ttl_secs.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v,
        }),
        None => Ok(default),
    }
}
