//! Typed wrappers over the three upstream providers.
//!
//! Each wrapper checks its credential before touching the network and
//! returns the provider's JSON body unmodified. No retries.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{Provider, ProviderCredentials, ProviderKeys};
use crate::error::FetchError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{HttpClient, fetch_json};
use crate::model::Location;
use crate::satellite::{self, SatellitePayload};

const AIRNOW_ZIP_CURRENT: &str = "/aq/observation/zipCode/current/";
const AIRNOW_LATLONG_CURRENT: &str = "/aq/observation/latLong/current/";
const AIRNOW_SEARCH_DISTANCE_MILES: &str = "25";
const TEMPO_SATELLITE_DATA: &str = "/satellite/air-quality";
const TEMPO_TROPOSPHERIC_DATA: &str = "/tropospheric/pollution";
const OPENWEATHER_AIR_POLLUTION: &str = "/air_pollution";

/// Holds the shared HTTP client and the provider credentials.
#[derive(Clone)]
pub struct Gateway {
    client: Arc<dyn HttpClient>,
    keys: ProviderKeys,
}

/// Joins `base` and `path` and appends the query pairs.
fn build_url(base: &str, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    let mut url = reqwest::Url::parse(&joined).map_err(|e| FetchError::InvalidUrl {
        url: joined.clone(),
        message: e.to_string(),
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url.into())
}

impl Gateway {
    pub fn new(client: Arc<dyn HttpClient>, keys: ProviderKeys) -> Self {
        Self { client, keys }
    }

    pub fn keys(&self) -> &ProviderKeys {
        &self.keys
    }

    /// Issues an authenticated GET against one provider.
    async fn get(
        &self,
        creds: &ProviderCredentials,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        let key = creds.api_key.as_ref().ok_or(FetchError::Configuration {
            provider: creds.provider,
        })?;

        let url = build_url(&creds.base_url, path, params)?;
        let client = UrlParam {
            inner: self.client.clone(),
            param_name: creds.key_param.to_string(),
            key: key.clone(),
        };

        debug!(provider = %creds.provider, url = %url, "Calling upstream");
        fetch_json(&client, creds.provider, &url).await
    }

    /// Current ground-sensor observations near the location: by zip code
    /// when one is given, else by coordinates.
    #[tracing::instrument(skip(self), fields(lat = location.lat, lng = location.lng))]
    pub async fn fetch_ground(&self, location: &Location) -> Result<Value, FetchError> {
        let mut params = vec![("format", "application/json".to_string())];
        let path = match &location.zip_code {
            Some(zip) => {
                params.push(("zipCode", zip.clone()));
                AIRNOW_ZIP_CURRENT
            }
            None => {
                params.push(("latitude", location.lat.to_string()));
                params.push(("longitude", location.lng.to_string()));
                AIRNOW_LATLONG_CURRENT
            }
        };
        params.push(("distance", AIRNOW_SEARCH_DISTANCE_MILES.to_string()));

        self.get(&self.keys.ground, path, &params).await
    }

    /// Weather provider air-pollution components for the coordinates.
    #[tracing::instrument(skip(self), fields(lat = location.lat, lng = location.lng))]
    pub async fn fetch_weather(&self, location: &Location) -> Result<Value, FetchError> {
        let params = [
            ("lat", location.lat.to_string()),
            ("lon", location.lng.to_string()),
        ];
        self.get(&self.keys.weather, OPENWEATHER_AIR_POLLUTION, &params)
            .await
    }

    /// Satellite column data for a date (today when `None`).
    #[tracing::instrument(skip(self), fields(lat = location.lat, lng = location.lng))]
    pub async fn fetch_satellite(
        &self,
        location: &Location,
        date: Option<NaiveDate>,
    ) -> Result<Value, FetchError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let params = [
            ("lat", location.lat.to_string()),
            ("lon", location.lng.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        self.get(&self.keys.satellite, TEMPO_SATELLITE_DATA, &params)
            .await
    }

    /// Secondary satellite endpoint with tropospheric products.
    #[tracing::instrument(skip(self), fields(lat = location.lat, lng = location.lng))]
    pub async fn fetch_tropospheric(&self, location: &Location) -> Result<Value, FetchError> {
        let params = [
            ("latitude", location.lat.to_string()),
            ("longitude", location.lng.to_string()),
            ("format", "json".to_string()),
        ];
        self.get(&self.keys.satellite, TEMPO_TROPOSPHERIC_DATA, &params)
            .await
    }

    /// Satellite data with the endpoint fallback applied: the satellite
    /// endpoint first, then the tropospheric one. Returns the normalized
    /// payload of whichever answered.
    pub async fn satellite_payload(
        &self,
        location: &Location,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<SatellitePayload, FetchError> {
        let raw = match self.fetch_satellite(location, date).await {
            Ok(raw) => raw,
            Err(e) if e.is_expected() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Satellite endpoint failed, trying tropospheric endpoint");
                self.fetch_tropospheric(location).await?
            }
        };
        Ok(satellite::normalize(&raw, location.lat, location.lng, now))
    }

    /// Which providers have a key configured.
    pub fn availability(&self) -> Vec<(Provider, bool)> {
        self.keys
            .iter()
            .map(|(p, c)| (p, c.is_configured()))
            .collect()
    }
}
