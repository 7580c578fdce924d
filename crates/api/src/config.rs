//! Process configuration, read once from the environment at startup.

use sparekeep_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
/// Audience the hosted auth service stamps on user access tokens.
pub const DEFAULT_JWT_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub log_format: LogFormat,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// Variables that were missing or unparsable and fell back to a default.
    defaulted: Vec<(&'static str, String)>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut defaulted = Vec::new();

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            defaulted.push(("JWT_SECRET", "not set; using insecure dev default".to_string()));
            DEFAULT_JWT_SECRET.to_string()
        });

        let jwt_audience = get("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string());

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                defaulted.push(("LOG_FORMAT", e));
                LogFormat::default()
            }),
        };

        let use_persistent_stores = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.parse::<bool>().unwrap_or_else(|_| {
                defaulted.push(("USE_PERSISTENT_STORES", format!("'{raw}' is not a bool; using false")));
                false
            }),
        };

        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            defaulted.push(("DATABASE_URL", "not set while USE_PERSISTENT_STORES=true".to_string()));
        }

        Self {
            bind_addr,
            jwt_secret,
            jwt_audience,
            log_format,
            use_persistent_stores,
            database_url,
            defaulted,
        }
    }

    /// Emit one warning per variable that fell back to a default. Call after
    /// the subscriber is installed.
    pub fn log_defaults(&self) {
        for (key, reason) in &self.defaulted {
            tracing::warn!(variable = *key, "{reason}");
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.jwt_audience, "authenticated");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(!cfg.use_persistent_stores);
        assert_eq!(cfg.defaulted.len(), 1);
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", " s3cret "),
            ("LOG_FORMAT", "pretty"),
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/sparekeep"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.use_persistent_stores);
        assert!(cfg.defaulted.is_empty());
    }

    #[test]
    fn unparsable_values_fall_back() {
        let cfg = config(&[
            ("JWT_SECRET", "x"),
            ("LOG_FORMAT", "xml"),
            ("USE_PERSISTENT_STORES", "yes"),
        ]);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(!cfg.use_persistent_stores);
        let keys: Vec<_> = cfg.defaulted.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["LOG_FORMAT", "USE_PERSISTENT_STORES"]);
    }
}
