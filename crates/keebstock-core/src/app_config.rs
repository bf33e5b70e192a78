use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub content_space_id: Option<String>,
    pub content_token: Option<String>,
    pub content_environment: String,
    pub sheets_api_key: Option<String>,
    pub sheet_id: Option<String>,
    pub revalidate_secret: Option<String>,
    pub categories_path: Option<PathBuf>,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
    pub http_backoff_ms: u64,
}

impl AppConfig {
    /// Names of the credential variables that are unset.
    ///
    /// Production startup refuses to proceed when this is non-empty; in
    /// development the affected routes answer 503 instead.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.content_space_id.is_none() {
            missing.push("KEEBSTOCK_CONTENT_SPACE_ID");
        }
        if self.content_token.is_none() {
            missing.push("KEEBSTOCK_CONTENT_TOKEN");
        }
        if self.sheets_api_key.is_none() {
            missing.push("KEEBSTOCK_SHEETS_API_KEY");
        }
        if self.sheet_id.is_none() {
            missing.push("KEEBSTOCK_SHEET_ID");
        }
        if self.revalidate_secret.is_none() {
            missing.push("KEEBSTOCK_REVALIDATE_SECRET");
        }
        missing
    }

    /// Enforce the startup strictness of the configured environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the unset credential
    /// variables when `env` is [`Environment::Production`]; development and
    /// test start degraded instead (the affected routes answer 503).
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let missing = self.missing_credentials();
        if self.env == Environment::Production && !missing.is_empty() {
            return Err(ConfigError::MissingEnvVar(missing.join(", ")));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("content_space_id", &self.content_space_id)
            .field(
                "content_token",
                &self.content_token.as_ref().map(|_| "[redacted]"),
            )
            .field("content_environment", &self.content_environment)
            .field(
                "sheets_api_key",
                &self.sheets_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sheet_id", &self.sheet_id)
            .field(
                "revalidate_secret",
                &self.revalidate_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("categories_path", &self.categories_path)
            .field("user_agent", &self.user_agent)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_backoff_ms", &self.http_backoff_ms)
            .finish()
    }
}
