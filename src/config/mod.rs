//! Configuration management
//!
//! This module handles loading and parsing configuration for agrisite.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Token signing configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Chatbot backend configuration
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    /// Default data seeding
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Directory holding the built SPA bundle (served for non-API paths)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Bearer token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

fn default_jwt_secret() -> String {
    "fallback_secret_key".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_HOURS: i64 = 87_600;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    10_000
}

/// Chatbot (OpenAI-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    /// API key; without one the chatbot answers with its fallback text
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_chatbot_model")]
    pub model: String,
    /// Base URL of the chat completions API
    #[serde(default = "default_chatbot_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_chatbot_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_chatbot_model(),
            base_url: default_chatbot_base_url(),
            timeout_seconds: default_chatbot_timeout(),
        }
    }
}

fn default_chatbot_model() -> String {
    "gpt-5".to_string()
}

fn default_chatbot_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chatbot_timeout() -> u64 {
    30
}

/// Default data seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Load the default catalog and admin account on startup
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_seed_enabled(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            admin_email: default_admin_email(),
            admin_name: default_admin_name(),
        }
    }
}

fn default_seed_enabled() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_email() -> String {
    "admin@sakthisaibiotech.com".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - AGRISITE_SERVER_HOST / AGRISITE_SERVER_PORT
    /// - AGRISITE_SERVER_CORS_ORIGIN / AGRISITE_SERVER_STATIC_DIR
    /// - AGRISITE_AUTH_JWT_SECRET (then JWT_SECRET, then SESSION_SECRET)
    /// - AGRISITE_AUTH_TOKEN_TTL_HOURS
    /// - AGRISITE_CACHE_TTL_SECONDS
    /// - AGRISITE_CHATBOT_API_KEY (then OPENAI_API_KEY)
    /// - AGRISITE_CHATBOT_MODEL / AGRISITE_CHATBOT_BASE_URL
    /// - AGRISITE_SEED_ENABLED / AGRISITE_SEED_ADMIN_PASSWORD
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("AGRISITE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AGRISITE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("AGRISITE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }
        if let Ok(dir) = std::env::var("AGRISITE_SERVER_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }

        // Auth configuration
        if let Some(secret) = first_env(&["AGRISITE_AUTH_JWT_SECRET", "JWT_SECRET", "SESSION_SECRET"]) {
            self.auth.jwt_secret = secret;
        }
        if let Ok(ttl) = std::env::var("AGRISITE_AUTH_TOKEN_TTL_HOURS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.token_ttl_hours = ttl;
            }
        }

        // Cache configuration
        if let Ok(ttl) = std::env::var("AGRISITE_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        // Chatbot configuration
        if let Some(key) = first_env(&["AGRISITE_CHATBOT_API_KEY", "OPENAI_API_KEY"]) {
            self.chatbot.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("AGRISITE_CHATBOT_MODEL") {
            self.chatbot.model = model;
        }
        if let Ok(base_url) = std::env::var("AGRISITE_CHATBOT_BASE_URL") {
            self.chatbot.base_url = base_url;
        }

        // Seed configuration
        if let Ok(enabled) = std::env::var("AGRISITE_SEED_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.seed.enabled = true,
                "0" | "false" | "no" => self.seed.enabled = false,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(password) = std::env::var("AGRISITE_SEED_ADMIN_PASSWORD") {
            self.seed.admin_password = password;
        }
    }

    /// Check values that would make the server unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_hours must be positive".to_string(),
            ));
        }
        if self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_hours must be at most {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// First non-empty environment variable among `names`
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_agrisite_config.yml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.seed.enabled);
        assert!(config.chatbot.api_key.is_none());
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let file = write_config("   \n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let file = write_config(
            "server:\n  port: 8081\nchatbot:\n  model: gpt-4o-mini\n",
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chatbot.model, "gpt-4o-mini");
        assert_eq!(config.chatbot.base_url, "https://api.openai.com");
        assert_eq!(config.cache.ttl_seconds, 300);
    }

    #[test]
    fn test_load_invalid_yaml_reports_location() {
        let file = write_config("server:\n  port: [not a port\n");
        let err = Config::load(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = Config::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_hours = 3_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();
        std::env::set_var("AGRISITE_SERVER_PORT", "9090");
        std::env::set_var("AGRISITE_AUTH_JWT_SECRET", "from-env");
        std::env::set_var("AGRISITE_SEED_ENABLED", "false");

        let config = Config::load_with_env(std::path::Path::new("nonexistent_agrisite_config.yml")).unwrap();

        std::env::remove_var("AGRISITE_SERVER_PORT");
        std::env::remove_var("AGRISITE_AUTH_JWT_SECRET");
        std::env::remove_var("AGRISITE_SEED_ENABLED");

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_env_invalid_port_ignored() {
        let _guard = lock_env();
        std::env::set_var("AGRISITE_SERVER_PORT", "not-a-port");
        let config = Config::load_with_env(std::path::Path::new("nonexistent_agrisite_config.yml")).unwrap();
        std::env::remove_var("AGRISITE_SERVER_PORT");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_bind_address() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }
}
