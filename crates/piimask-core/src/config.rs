//! Service configuration loaded from the environment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// What to do with detections that could not be placed in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop them silently; only logged.
    #[default]
    Drop,
    /// Drop them from masking, but list them in the response.
    Report,
}

impl FromStr for UnresolvedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "report" => Ok(Self::Report),
            other => Err(Error::Config(format!(
                "unknown unresolved policy '{}', expected 'drop' or 'report'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Report => write!(f, "report"),
        }
    }
}

/// Settings for the OpenAI-compatible detection backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API root, e.g. `https://api.openai.com/v1` or a local server.
    pub base_url: String,
    /// Bearer token. Without it no detector is available.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    /// Per-request timeout for the detection call.
    pub timeout_secs: u64,
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub llm: LlmSettings,
    /// Upper bound on in-flight detection calls within one batch.
    pub batch_concurrency: usize,
    /// Largest accepted `texts` array.
    pub max_batch_size: usize,
    pub unresolved_policy: UnresolvedPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            llm: LlmSettings::default(),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            unresolved_policy: UnresolvedPolicy::Drop,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from process environment and defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            "Loaded config: {}:{}, model={}, policy={}",
            config.host, config.port, config.llm.model, config.unresolved_policy
        );
        Ok(config)
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()))
        };

        let defaults = Self::default();

        let host = get(&["PIIMASK_HOST"]).unwrap_or(defaults.host);
        let port = match get(&["PORT"]) {
            Some(v) => parse_value("PORT", &v)?,
            None => defaults.port,
        };

        let llm = LlmSettings {
            base_url: get(&["OPENAI_BASE_URL", "BASE_URL"])
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.llm.base_url),
            api_key: get(&["OPENAI_API_KEY"]),
            model: get(&["OPENAI_MODEL", "OPENAI_MODEL_NAME"]).unwrap_or(defaults.llm.model),
            timeout_secs: match get(&["PIIMASK_LLM_TIMEOUT_SECS"]) {
                Some(v) => parse_value("PIIMASK_LLM_TIMEOUT_SECS", &v)?,
                None => defaults.llm.timeout_secs,
            },
            temperature: defaults.llm.temperature,
        };

        let batch_concurrency = match get(&["PIIMASK_BATCH_CONCURRENCY"]) {
            Some(v) => parse_value("PIIMASK_BATCH_CONCURRENCY", &v)?,
            None => defaults.batch_concurrency,
        };
        let max_batch_size = match get(&["PIIMASK_MAX_BATCH_SIZE"]) {
            Some(v) => parse_value("PIIMASK_MAX_BATCH_SIZE", &v)?,
            None => defaults.max_batch_size,
        };
        let unresolved_policy = match get(&["PIIMASK_UNRESOLVED_POLICY"]) {
            Some(v) => v.parse()?,
            None => defaults.unresolved_policy,
        };

        let config = Self {
            host,
            port,
            llm,
            batch_concurrency,
            max_batch_size,
            unresolved_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_concurrency == 0 {
            return Err(Error::Config("batch_concurrency must be at least 1".into()));
        }
        if self.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be at least 1".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("LLM timeout must be at least 1 second".into()));
        }
        if self.host.trim().is_empty() || self.host.contains(char::is_whitespace) {
            return Err(Error::Config(format!("invalid listen host '{}'", self.host)));
        }
        Ok(())
    }

    /// `host:port` string the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid value for {}: '{}' ({})", key, raw, e)))
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
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8081);
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.unresolved_policy, UnresolvedPolicy::Drop);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("BASE_URL", "http://localhost:11434/v1/"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL_NAME", "llama3"),
            ("PIIMASK_UNRESOLVED_POLICY", "Report"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.unresolved_policy, UnresolvedPolicy::Report);
    }

    #[test]
    fn test_primary_key_wins_over_alias() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_MODEL_NAME", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ServiceConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(Error::Config(_))
        ));
        assert!(ServiceConfig::from_lookup(lookup(&[("PIIMASK_BATCH_CONCURRENCY", "0")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[("PIIMASK_UNRESOLVED_POLICY", "loud")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[("PIIMASK_HOST", "not a host")])).is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = ServiceConfig::default();
        config.llm.api_key = Some("sk-secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
