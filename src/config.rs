// src/config.rs
use std::fmt::Debug;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "qwen/qwen2.5-vl-72b-instruct:free";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Relay settings, built once at startup and handed to the router state.
#[derive(Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Client-side timeout for the upstream call. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RelayConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable             | Default                                          |
    /// |----------------------|--------------------------------------------------|
    /// | `OPENROUTER_API_KEY` | required                                         |
    /// | `OPENROUTER_API_URL` | `https://openrouter.ai/api/v1/chat/completions`  |
    /// | `RELAY_MODEL`        | `qwen/qwen2.5-vl-72b-instruct:free`              |
    /// | `RELAY_BIND_ADDR`    | `0.0.0.0:3000`                                   |
    /// | `RELAY_TIMEOUT_SECS` | unset (no timeout)                               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("OPENROUTER_API_KEY")
            .ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?
            .trim()
            .to_string();

        let request_timeout = match non_blank("RELAY_TIMEOUT_SECS") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            bind_addr: non_blank("RELAY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            api_url: non_blank("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            api_key,
            model: non_blank("RELAY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            request_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { name: "RELAY_TIMEOUT_SECS", reason };

    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| invalid(format!("{raw:?}: {e}")))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero".into()));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let cfg = RelayConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.request_timeout, None);
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert_eq!(
            RelayConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("OPENROUTER_API_KEY")
        );
        assert_eq!(
            RelayConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "   ")])).unwrap_err(),
            ConfigError::Missing("OPENROUTER_API_KEY")
        );
    }

    #[test]
    fn overrides_and_timeout() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "k"),
            ("OPENROUTER_API_URL", "http://127.0.0.1:9/v1/chat/completions"),
            ("RELAY_MODEL", "some/model"),
            ("RELAY_BIND_ADDR", "127.0.0.1:8080"),
            ("RELAY_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:9/v1/chat/completions");
        assert_eq!(cfg.model, "some/model");
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["0", "soon", "-5"] {
            let err = RelayConfig::from_lookup(lookup(&[
                ("OPENROUTER_API_KEY", "k"),
                ("RELAY_TIMEOUT_SECS", raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "RELAY_TIMEOUT_SECS", .. }));
        }
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cfg = RelayConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-secret")])).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
