//! Configuration parsed from environment variables.
//!
//! The backend pair (`SUPABASE_URL` + `SUPABASE_PUBLISHABLE_KEY`) is optional:
//! without it the server still starts, the gate lets every request through,
//! and handlers that need the provider answer 503.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Hosted provider endpoint and publishable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub key: String,
    pub timeouts: BackendTimeouts,
}

impl BackendConfig {
    /// Load from `SUPABASE_URL` and `SUPABASE_PUBLISHABLE_KEY`.
    /// Returns `None` if either is missing or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_parts(
            std::env::var("SUPABASE_URL").ok().as_deref(),
            std::env::var("SUPABASE_PUBLISHABLE_KEY").ok().as_deref(),
            BackendTimeouts {
                request_secs: env_parse("BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS),
            },
        )
    }

    #[must_use]
    pub fn from_parts(url: Option<&str>, key: Option<&str>, timeouts: BackendTimeouts) -> Option<Self> {
        let url = url.map(str::trim).filter(|v| !v.is_empty())?;
        let key = key.map(str::trim).filter(|v| !v.is_empty())?;
        Some(Self { url: url.trim_end_matches('/').to_owned(), key: key.to_owned(), timeouts })
    }

    #[must_use]
    pub fn is_https(&self) -> bool {
        self.url.starts_with("https://")
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub backend: Option<BackendConfig>,
    pub cookie_secure: bool,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let backend = BackendConfig::from_env();
        let cookie_secure = env_bool("COOKIE_SECURE")
            .unwrap_or_else(|| backend.as_ref().is_some_and(BackendConfig::is_https));
        Self { port: env_parse("PORT", DEFAULT_PORT), backend, cookie_secure }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
