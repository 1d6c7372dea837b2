use yurist_core::site::{SiteSettings, DEFAULT_HOSTNAME, DEFAULT_PORT, DEFAULT_SITE_NAME};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Site binding defaults and absolute-URL settings.
    pub site: SiteSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// Site settings are read by [`site_settings_from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = comma_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            site: site_settings_from_env(),
        }
    }
}

/// Load site settings.
///
/// | Env Var         | Default              |
/// |-----------------|----------------------|
/// | `SITE_HOSTNAME` | `crimea-yurist.ru`   |
/// | `SITE_NAME`     | `Crimea Yurist`      |
/// | `SITE_PORT`     | `80`                 |
/// | `SITE_DOMAIN`   | `crimea-yurist.ru`   |
/// | `ALLOWED_HOSTS` | (empty)              |
/// | `DEBUG`         | `false`              |
pub fn site_settings_from_env() -> SiteSettings {
    let port: i32 = std::env::var("SITE_PORT")
        .map(|v| v.parse().expect("SITE_PORT must be a valid port"))
        .unwrap_or(DEFAULT_PORT);

    SiteSettings {
        hostname: std::env::var("SITE_HOSTNAME").unwrap_or_else(|_| DEFAULT_HOSTNAME.into()),
        port,
        site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| DEFAULT_SITE_NAME.into()),
        fallback_domain: std::env::var("SITE_DOMAIN").unwrap_or_else(|_| DEFAULT_HOSTNAME.into()),
        allowed_hosts: comma_list(&std::env::var("ALLOWED_HOSTS").unwrap_or_default()),
        debug: std::env::var("DEBUG").is_ok_and(|v| parse_flag(&v)),
    }
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_list_skips_blanks() {
        assert_eq!(
            comma_list(" a.test, ,b.test,"),
            vec!["a.test".to_string(), "b.test".to_string()]
        );
        assert!(comma_list("").is_empty());
    }

    #[test]
    fn debug_flag_values() {
        for on in ["1", "true", "TRUE", " yes "] {
            assert!(parse_flag(on), "{on} should enable debug");
        }
        for off in ["0", "false", "", "nope"] {
            assert!(!parse_flag(off), "{off} should not enable debug");
        }
    }
}
