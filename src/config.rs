// src/config.rs
use crate::auth::credentials::CredentialError;
use crate::auth::{CaseSensitivity, CredentialStore};
use crate::content::ContentError;
use crate::relay::{RelayConfig, RelayError};
use crate::session::{DEFAULT_SESSION_TTL, DEFAULT_SWEEP_INTERVAL};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("ALLOWED_USERS: {0}")]
    Credentials(#[from] CredentialError),
    #[error("CONTENT_PATH: {0}")]
    Content(#[from] ContentError),
    #[error("chat relay: {0}")]
    Relay(#[from] RelayError),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub credentials: CredentialStore,
    pub session_ttl: chrono::Duration,
    pub sweep_interval: Duration,
    pub host: String,
    pub port: u16,
    pub content_path: Option<PathBuf>,
    pub relay: RelayConfig,
}

impl PortalConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let case = if parse_or(&get, "LOGIN_CASE_INSENSITIVE", false)? {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        };
        let allowed = get("ALLOWED_USERS").ok_or(ConfigError::Missing("ALLOWED_USERS"))?;
        let credentials = CredentialStore::parse(&allowed, case)?;

        let ttl_secs: u32 = parse_or(
            &get,
            "SESSION_TTL_SECS",
            DEFAULT_SESSION_TTL.num_seconds() as u32,
        )?;
        if ttl_secs == 0 {
            return Err(invalid("SESSION_TTL_SECS", "0"));
        }

        let sweep_secs: u64 = parse_or(
            &get,
            "SESSION_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL.as_secs(),
        )?;
        if sweep_secs == 0 {
            return Err(invalid("SESSION_SWEEP_INTERVAL_SECS", "0"));
        }

        let temperature: Option<f32> = match get("CHAT_TEMPERATURE") {
            Some(raw) => Some(parse_value("CHAT_TEMPERATURE", &raw)?),
            None => None,
        };
        if let Some(t) = temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(invalid("CHAT_TEMPERATURE", &t.to_string()));
            }
        }

        let mut relay = RelayConfig::default();
        relay.api_key = get("OPENAI_API_KEY");
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            relay.base_url = base_url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            relay.model = model;
        }
        if let Some(prompt) = get("GPT_SYSTEM_PROMPT") {
            relay.system_prompt = prompt;
        }
        relay.temperature = temperature;
        relay.blocked_topics = get("BLOCKED_TOPICS")
            .map(|raw| RelayConfig::parse_topics(&raw))
            .unwrap_or_default();

        Ok(Self {
            credentials,
            session_ttl: chrono::Duration::seconds(i64::from(ttl_secs)),
            sweep_interval: Duration::from_secs(sweep_secs),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            content_path: get("CONTENT_PATH").map(PathBuf::from),
            relay,
        })
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(name, raw))
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::from_lookup(lookup(&[("ALLOWED_USERS", "Admin:x")])).unwrap();
        assert_eq!(config.session_ttl, chrono::Duration::hours(12));
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.content_path.is_none());
        assert!(config.relay.api_key.is_none());
        assert_eq!(config.relay.model, "gpt-4.1-mini");
        assert!(config.relay.blocked_topics.is_empty());
        assert_eq!(
            config.credentials.case_sensitivity(),
            CaseSensitivity::Sensitive
        );
    }

    #[test]
    fn test_missing_users_is_fatal() {
        assert!(matches!(
            PortalConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("ALLOWED_USERS"))
        ));
        assert!(matches!(
            PortalConfig::from_lookup(lookup(&[("ALLOWED_USERS", "  ")])),
            Err(ConfigError::Missing("ALLOWED_USERS"))
        ));
        assert!(matches!(
            PortalConfig::from_lookup(lookup(&[("ALLOWED_USERS", "nopassword")])),
            Err(ConfigError::Credentials(CredentialError::NoAccounts))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("ALLOWED_USERS", "Admin:x,joao:y"),
            ("LOGIN_CASE_INSENSITIVE", "true"),
            ("SESSION_TTL_SECS", "60"),
            ("SESSION_SWEEP_INTERVAL_SECS", "5"),
            ("PORT", "8080"),
            ("CONTENT_PATH", "/etc/mural/content.json"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("CHAT_TEMPERATURE", "0.3"),
            ("BLOCKED_TOPICS", "Salário, demissão ,,"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.accounts().len(), 2);
        assert_eq!(
            config.credentials.case_sensitivity(),
            CaseSensitivity::Insensitive
        );
        assert_eq!(config.session_ttl, chrono::Duration::seconds(60));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.content_path,
            Some(PathBuf::from("/etc/mural/content.json"))
        );
        assert_eq!(config.relay.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.relay.model, "gpt-4o");
        assert_eq!(config.relay.temperature, Some(0.3));
        assert_eq!(config.relay.blocked_topics, vec!["salário", "demissão"]);
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("SESSION_TTL_SECS", "twelve"),
            ("SESSION_TTL_SECS", "0"),
            ("SESSION_SWEEP_INTERVAL_SECS", "0"),
            ("PORT", "70000"),
            ("LOGIN_CASE_INSENSITIVE", "yes"),
            ("CHAT_TEMPERATURE", "3.5"),
        ] {
            let result =
                PortalConfig::from_lookup(lookup(&[("ALLOWED_USERS", "Admin:x"), (name, value)]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{}={} should be rejected",
                name,
                value
            );
        }
    }
}
