use crate::error::ConfigError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PORT: u16 = 8000;
const ENV_PREFIX: &str = "SCREWVISION";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub endpoint: EndpointSettings,
    pub live: LiveSettings,
    pub still: StillSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointSettings {
    pub base_url: String,
}

/// Live polling parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiveSettings {
    pub interval_ms: u64,
    pub quality: f32,
    pub confidence: f32,
    pub request_timeout_ms: u64,
    pub narrow_label_width: f32,
}

/// Single-shot capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StillSettings {
    pub quality: f32,
    pub confidence: f32,
    pub settle_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub narrow_label_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: EndpointSettings::default(),
            live: LiveSettings::default(),
            still: StillSettings::default(),
        }
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1200,
            quality: 0.5,
            confidence: 0.25,
            request_timeout_ms: 1200,
            narrow_label_width: crate::geometry::LIVE_NARROW_LABEL_WIDTH,
        }
    }
}

impl Default for StillSettings {
    fn default() -> Self {
        Self {
            quality: 0.8,
            confidence: 0.2,
            settle_delay_ms: 300,
            request_timeout_ms: 10_000,
            narrow_label_width: crate::geometry::RESULT_NARROW_LABEL_WIDTH,
        }
    }
}

impl LiveSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl StillSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl EndpointSettings {
    /// Normalized base address of the detector endpoint.
    pub fn resolve(&self) -> Result<String, ConfigError> {
        normalize_base_url(&self.base_url)
    }
}

impl Settings {
    /// Layers defaults, an optional TOML file, then `SCREWVISION__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("screwvision").required(false)),
        };
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.live.interval_ms == 0 {
            return Err(invalid("live.interval_ms", "must be greater than 0"));
        }
        if self.live.request_timeout_ms == 0 {
            return Err(invalid("live.request_timeout_ms", "must be greater than 0"));
        }
        if self.still.request_timeout_ms == 0 {
            return Err(invalid("still.request_timeout_ms", "must be greater than 0"));
        }

        let unit_fields = [
            ("live.quality", self.live.quality),
            ("live.confidence", self.live.confidence),
            ("still.quality", self.still.quality),
            ("still.confidence", self.still.confidence),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{value} is not in 0.0..=1.0")));
            }
        }

        self.endpoint.resolve()?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Accepts what a user would type for the server address: a bare host, a
/// host and port, or a full URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Endpoint("address is empty".to_string()));
    }

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
        None => ("http".to_string(), trimmed),
    };
    let rest = rest.trim_end_matches('/');
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::Endpoint(format!("unsupported scheme {scheme}")));
    }

    let (authority, path) = match rest.find('/') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };
    if authority.is_empty() {
        return Err(ConfigError::Endpoint(format!("{raw} has no host")));
    }
    let has_port = match authority.rfind(']') {
        // Bracketed IPv6 literal
        Some(end) => authority[end..].contains(':'),
        None => authority.contains(':'),
    };

    let normalized = if has_port {
        format!("{scheme}://{authority}{path}")
    } else {
        format!("{scheme}://{authority}:{DEFAULT_PORT}{path}")
    };
    reqwest::Url::parse(&normalized).map_err(|e| ConfigError::Endpoint(e.to_string()))?;
    Ok(normalized)
}
