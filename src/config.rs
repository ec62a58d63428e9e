use crate::session::SessionConfig;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub nats: NatsConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    pub scoring: ScoringConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct PresenceConfig {
    pub interval_ms: u64,
    pub detection_timeout_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            detection_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct PersistenceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

fn default_subject_prefix() -> String {
    "interview".to_string()
}

impl Config {
    /// Load from a file (any extension `config` understands) with
    /// `INTERVIEW__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("INTERVIEW").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Per-session tuning derived from the service configuration
    pub fn session_config(&self) -> SessionConfig {
        let evaluation_secs = self.scoring.timeout_secs.max(self.persistence.timeout_secs);

        SessionConfig {
            presence_interval: Duration::from_millis(self.presence.interval_ms),
            detection_timeout: Duration::from_millis(self.presence.detection_timeout_ms),
            evaluation_timeout: Duration::from_secs(evaluation_secs),
            ..SessionConfig::default()
        }
    }

    /// Scoring API key, read from the configured environment variable
    pub fn scoring_api_key(&self) -> Option<String> {
        self.scoring
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
    }
}
