//! Provider credentials and service settings, read from the environment.
//!
//! A provider whose API key is absent is disabled, not misconfigured: the
//! pipeline simply treats that source as missing.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The three upstream data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// EPA AirNow ground-sensor network.
    Ground,
    /// NASA TEMPO satellite data.
    Satellite,
    /// OpenWeather air pollution / weather.
    Weather,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Ground, Provider::Satellite, Provider::Weather];

    fn env_prefix(self) -> &'static str {
        match self {
            Provider::Ground => "EPA_AIRNOW",
            Provider::Satellite => "TEMPO",
            Provider::Weather => "OPENWEATHER",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Ground => "https://www.airnowapi.org",
            Provider::Satellite => "https://api.nasa.gov/tempo",
            Provider::Weather => "https://api.openweathermap.org/data/2.5",
        }
    }

    /// Query parameter the provider expects its key in.
    fn key_param(self) -> &'static str {
        match self {
            Provider::Ground => "API_KEY",
            Provider::Satellite => "api_key",
            Provider::Weather => "appid",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Ground => write!(f, "EPA AirNow"),
            Provider::Satellite => write!(f, "NASA TEMPO"),
            Provider::Weather => write!(f, "OpenWeather"),
        }
    }
}

/// Base URL and optional key for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCredentials {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub key_param: &'static str,
}

impl ProviderCredentials {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Credentials for all three providers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderKeys {
    pub ground: ProviderCredentials,
    pub satellite: ProviderCredentials,
    pub weather: ProviderCredentials,
}

impl ProviderKeys {
    /// Reads `<PREFIX>_BASE_URL` and `<PREFIX>_API_KEY` for each provider
    /// from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the key set from an arbitrary variable lookup. Empty values
    /// count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let load = |provider: Provider| {
            let prefix = provider.env_prefix();
            let non_empty = |name: String| lookup(&name).filter(|v| !v.trim().is_empty());

            ProviderCredentials {
                provider,
                base_url: non_empty(format!("{prefix}_BASE_URL"))
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
                api_key: non_empty(format!("{prefix}_API_KEY")),
                key_param: provider.key_param(),
            }
        };

        Self {
            ground: load(Provider::Ground),
            satellite: load(Provider::Satellite),
            weather: load(Provider::Weather),
        }
    }

    /// Key set with every provider disabled.
    pub fn none() -> Self {
        Self::from_lookup(|_| None)
    }

    pub fn get(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::Ground => &self.ground,
            Provider::Satellite => &self.satellite,
            Provider::Weather => &self.weather,
        }
    }

    /// Iterates over `(provider, credentials)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &ProviderCredentials)> {
        Provider::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// Names of the env vars whose keys are missing.
    pub fn missing_keys(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, c)| !c.is_configured())
            .map(|(p, _)| format!("{}_API_KEY", p.env_prefix()))
            .collect()
    }
}

/// Per-call upstream timeout, from `UPSTREAM_TIMEOUT_SECS` (default 30s).
pub fn upstream_timeout() -> Duration {
    let secs = std::env::var("UPSTREAM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(30);
    Duration::from_secs(secs)
}
