use std::time::Duration;

use crate::app::domain::OrganizationId;

/// Runtime settings, read once at startup.
///
/// | variable                  | default                        |
/// |---------------------------|--------------------------------|
/// | `DATABASE_URL`            | required                       |
/// | `BIND_ADDR`               | `0.0.0.0:3000`                 |
/// | `APP_URL`                 | `http://localhost:3000`        |
/// | `MAIL_FROM`               | `please-configure@example.com` |
/// | `MAIL_ADAPTER`            | `console` (`smtp` also known)  |
/// | `SMTP_HOST`               | unset                          |
/// | `SMTP_PORT`               | `587`                          |
/// | `SMTP_USER`, `SMTP_PASS`  | unset                          |
/// | `DEFAULT_ORGANIZATION_ID` | unset                          |
/// | `BACKEND_TIMEOUT_MS`      | `5000`                         |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Used for links in outgoing mail.
    pub app_url: String,
    pub mail_from: String,
    pub mail_adapter: String,
    /// Without a host the smtp adapter degrades to a no-op mailer.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    /// Tenant chosen when a stale active-organization cookie no longer
    /// matches a membership. Unset means the newest organization.
    pub default_organization_id: Option<OrganizationId>,
    /// Upper bound on one datastore call made by the gate or the tenant resolver.
    pub backend_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL").ok_or("DATABASE_URL must be set in .env")?;
        let smtp_port = or("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|_| "SMTP_PORT must be a valid port number")?;
        let default_organization_id = get("DEFAULT_ORGANIZATION_ID")
            .map(|raw| OrganizationId::from_string(&raw))
            .transpose()
            .map_err(|_| "DEFAULT_ORGANIZATION_ID must be a valid organization id")?;
        let backend_timeout = or("BACKEND_TIMEOUT_MS", "5000")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .ok_or("BACKEND_TIMEOUT_MS must be a positive number of milliseconds")?;

        Ok(Self {
            database_url,
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            app_url: or("APP_URL", "http://localhost:3000"),
            mail_from: or("MAIL_FROM", "please-configure@example.com"),
            mail_adapter: or("MAIL_ADAPTER", "console"),
            smtp_host: get("SMTP_HOST"),
            smtp_port,
            smtp_user: get("SMTP_USER"),
            smtp_pass: get("SMTP_PASS"),
            default_organization_id,
            backend_timeout,
        })
    }

    pub fn app_url_base(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }

    /// In-memory database, console mailer, no fallback tenant.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            app_url: "http://localhost:3000".to_string(),
            mail_from: "test@example.com".to_string(),
            mail_adapter: "console".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            default_organization_id: None,
            backend_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("DATABASE_URL", "sqlite://salon.db")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.mail_adapter, "console");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.backend_timeout, Duration::from_secs(5));
        assert!(config.default_organization_id.is_none());
        assert!(config.smtp_host.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn fallback_organization_must_be_an_id() {
        let id = OrganizationId::new();
        let raw = id.as_str();
        let ok = config(&[("DATABASE_URL", "x"), ("DEFAULT_ORGANIZATION_ID", raw.as_str())]).unwrap();
        assert_eq!(ok.default_organization_id, Some(id));

        let err = config(&[("DATABASE_URL", "x"), ("DEFAULT_ORGANIZATION_ID", "demo")]).unwrap_err();
        assert!(err.contains("DEFAULT_ORGANIZATION_ID"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(config(&[("DATABASE_URL", "x"), ("BACKEND_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn app_url_base_strips_trailing_slash() {
        let mut config = Config::for_tests();
        config.app_url = "https://salon.example.jp/".to_string();
        assert_eq!(config.app_url_base(), "https://salon.example.jp");
    }
}
