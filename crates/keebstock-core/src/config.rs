use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. Upstream credentials are
/// optional at this layer; see [`AppConfig::missing_credentials`].
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("KEEBSTOCK_ENV", "development"))?;

    let bind_addr = parse_addr("KEEBSTOCK_BIND_ADDR", "0.0.0.0:4000")?;
    let log_level = or_default("KEEBSTOCK_LOG_LEVEL", "info");

    let content_space_id = lookup("KEEBSTOCK_CONTENT_SPACE_ID").ok();
    let content_token = lookup("KEEBSTOCK_CONTENT_TOKEN").ok();
    let content_environment = or_default("KEEBSTOCK_CONTENT_ENVIRONMENT", "master");
    let sheets_api_key = lookup("KEEBSTOCK_SHEETS_API_KEY").ok();
    let sheet_id = lookup("KEEBSTOCK_SHEET_ID").ok();
    let revalidate_secret = lookup("KEEBSTOCK_REVALIDATE_SECRET").ok();
    let categories_path = lookup("KEEBSTOCK_CATEGORIES_PATH").ok().map(PathBuf::from);

    let user_agent = or_default("KEEBSTOCK_USER_AGENT", "keebstock/0.1 (catalog-backend)");
    let http_timeout_secs = parse_u64("KEEBSTOCK_HTTP_TIMEOUT_SECS", "15")?;
    let http_max_retries = parse_u32("KEEBSTOCK_HTTP_MAX_RETRIES", "2")?;
    let http_backoff_ms = parse_u64("KEEBSTOCK_HTTP_BACKOFF_MS", "500")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        content_space_id,
        content_token,
        content_environment,
        sheets_api_key,
        sheet_id,
        revalidate_secret,
        categories_path,
        user_agent,
        http_timeout_secs,
        http_max_retries,
        http_backoff_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values are an error rather than a silent fallback: a typo in
/// `KEEBSTOCK_ENV` must not demote a production deployment to development
/// behavior.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KEEBSTOCK_ENV".to_string(),
            reason: format!("unrecognized environment '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with the full credential set populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("KEEBSTOCK_CONTENT_SPACE_ID", "space-1");
        m.insert("KEEBSTOCK_CONTENT_TOKEN", "cda-token");
        m.insert("KEEBSTOCK_SHEETS_API_KEY", "sheets-key");
        m.insert("KEEBSTOCK_SHEET_ID", "sheet-1");
        m.insert("KEEBSTOCK_REVALIDATE_SECRET", "hunter2");
        m
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(
            parse_environment("development").unwrap(),
            Environment::Development
        );
        assert_eq!(parse_environment("test").unwrap(), Environment::Test);
        assert_eq!(
            parse_environment("production").unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn parse_environment_unknown_is_rejected() {
        let result = parse_environment("prod");
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEEBSTOCK_ENV"),
            "expected InvalidEnvVar(KEEBSTOCK_ENV), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        // Credentials are optional at load time; the server degrades per-route.
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:4000");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.content_space_id.is_none());
        assert!(cfg.content_token.is_none());
        assert_eq!(cfg.content_environment, "master");
        assert!(cfg.sheets_api_key.is_none());
        assert!(cfg.sheet_id.is_none());
        assert!(cfg.revalidate_secret.is_none());
        assert!(cfg.categories_path.is_none());
        assert_eq!(cfg.http_timeout_secs, 15);
        assert_eq!(cfg.http_max_retries, 2);
        assert_eq!(cfg.http_backoff_ms, 500);
        assert_eq!(cfg.missing_credentials().len(), 5);
    }

    #[test]
    fn build_app_config_reads_credentials() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.content_space_id.as_deref(), Some("space-1"));
        assert_eq!(cfg.content_token.as_deref(), Some("cda-token"));
        assert_eq!(cfg.sheets_api_key.as_deref(), Some("sheets-key"));
        assert_eq!(cfg.sheet_id.as_deref(), Some("sheet-1"));
        assert_eq!(cfg.revalidate_secret.as_deref(), Some("hunter2"));
        assert!(cfg.missing_credentials().is_empty());
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEEBSTOCK_BIND_ADDR"),
            "expected InvalidEnvVar(KEEBSTOCK_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_environment() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_ENV", "staging");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEEBSTOCK_ENV"),
            "expected InvalidEnvVar(KEEBSTOCK_ENV), got: {result:?}"
        );
    }

    #[test]
    fn http_timeout_override() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_HTTP_TIMEOUT_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.http_timeout_secs, 60);
    }

    #[test]
    fn http_timeout_invalid() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_HTTP_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEEBSTOCK_HTTP_TIMEOUT_SECS"),
            "expected InvalidEnvVar(KEEBSTOCK_HTTP_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn http_max_retries_override() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_HTTP_MAX_RETRIES", "5");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.http_max_retries, 5);
    }

    #[test]
    fn http_max_retries_invalid() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_HTTP_MAX_RETRIES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEEBSTOCK_HTTP_MAX_RETRIES"),
            "expected InvalidEnvVar(KEEBSTOCK_HTTP_MAX_RETRIES), got: {result:?}"
        );
    }

    #[test]
    fn http_backoff_override() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_HTTP_BACKOFF_MS", "250");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.http_backoff_ms, 250);
    }

    #[test]
    fn content_environment_override() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_CONTENT_ENVIRONMENT", "staging-content");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.content_environment, "staging-content");
    }

    #[test]
    fn categories_path_is_optional_pathbuf() {
        let mut map = full_env();
        map.insert("KEEBSTOCK_CATEGORIES_PATH", "./config/categories.yaml");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.categories_path.as_deref(),
            Some(std::path::Path::new("./config/categories.yaml"))
        );
    }

    #[test]
    fn user_agent_default_and_override() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.user_agent, "keebstock/0.1 (catalog-backend)");

        let mut map = full_env();
        map.insert("KEEBSTOCK_USER_AGENT", "custom-agent/2.0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.user_agent, "custom-agent/2.0");
    }
}
