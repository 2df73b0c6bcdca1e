use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};

pub const DEFAULT_HOST: &str = "https://app.terraform.io";
pub const HOST_ENV: &str = "TFE_HOST";
pub const TOKEN_ENV: &str = "TFE_TOKEN";

lazy_static! {
    static ref ENV_REFERENCE: Regex = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    #[serde(default)]
    pub removal: RemovalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Organization used when `--org` is not given on the command line
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemovalConfig {
    /// Pause after a successful bulk removal before reporting it
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_access_log")]
    pub access_log: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_settle_delay_secs() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_log() -> bool {
    true
}

impl Default for RemovalConfig {
    fn default() -> Self {
        RemovalConfig {
            settle_delay_secs: default_settle_delay_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            access_log: default_access_log(),
        }
    }
}

impl PlatformConfig {
    /// Root of the v2 API, e.g. `https://app.terraform.io/api/v2`
    pub fn api_base(&self) -> String {
        format!("{}/api/v2", self.host.trim_end_matches('/'))
    }

    /// Bearer token, present once `AppConfig::validate` has passed
    pub fn bearer_token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::AuthConfig(format!("{} environment variable is required", TOKEN_ENV))
            })
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        // Expand environment variables in YAML content
        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(app_config)
    }

    /// Build configuration from `TFE_HOST` / `TFE_TOKEN`
    pub fn from_env() -> Self {
        let host = std::env::var(HOST_ENV)
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_host);
        let token = std::env::var(TOKEN_ENV).ok();

        AppConfig {
            platform: PlatformConfig {
                host,
                token,
                organization: None,
            },
            removal: RemovalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Reject configurations that cannot authenticate against the platform.
    /// Runs before any network call.
    pub fn validate(&self) -> AppResult<()> {
        let host = self.platform.host.trim();
        if host.is_empty() {
            return Err(AppError::AuthConfig("platform host is empty".to_string()));
        }

        let parsed = url::Url::parse(host)
            .map_err(|e| AppError::AuthConfig(format!("invalid platform host '{}': {}", host, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::AuthConfig(format!(
                "platform host must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        self.platform.bearer_token()?;
        Ok(())
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut expanded = String::with_capacity(content.len());
        let mut last = 0;

        for caps in ENV_REFERENCE.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let var_name = &caps[1];

            let value = match (std::env::var(var_name), caps.get(2)) {
                (Ok(val), _) => val,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    return Err(AppError::Configuration(format!(
                        "Environment variable {} not found and no default provided",
                        var_name
                    )));
                }
            };

            expanded.push_str(&content[last..whole.start()]);
            expanded.push_str(&value);
            last = whole.end();
        }

        expanded.push_str(&content[last..]);
        Ok(expanded)
    }
}
