//! Normalized satellite payload served by `/satellite` and consumed by the
//! satellite transform.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub const SATELLITE_NAME: &str = "TEMPO";
pub const NATIVE_RESOLUTION: &str = "2.1km x 4.4km";

/// Whether a payload came from the provider or was fabricated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SatelliteDataSource {
    #[serde(rename = "NASA_TEMPO_Real")]
    Real,
    #[serde(rename = "NASA_TEMPO_Simulated")]
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Atmospheric-column quantities; not surface concentrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ColumnMeasurements {
    pub no2_column: f64,
    pub o3_column: f64,
    pub so2_column: f64,
    pub hcho_column: f64,
    pub aerosol_optical_depth: f64,
    pub cloud_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityFlags {
    pub no2_quality: String,
    pub o3_quality: String,
    pub overall_quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatellitePayload {
    pub satellite: String,
    pub timestamp: DateTime<Utc>,
    pub location: GeoPoint,
    pub measurements: ColumnMeasurements,
    pub quality_flags: QualityFlags,
    pub spatial_resolution: String,
    pub overpass_time: DateTime<Utc>,
    pub data_source: SatelliteDataSource,
}

impl ColumnMeasurements {
    /// True when the provider returned no column values at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl SatellitePayload {
    pub fn is_simulated(&self) -> bool {
        self.data_source == SatelliteDataSource::Simulated
    }
}

/// Reads a column, preferring the tropospheric field name.
fn column(raw: &Value, gas: &str) -> f64 {
    raw[format!("{gas}_tropospheric_column")]
        .as_f64()
        .or_else(|| raw[format!("{gas}_column")].as_f64())
        .unwrap_or(0.0)
}

fn text_or(raw: &Value, key: &str, fallback: &str) -> String {
    raw[key].as_str().unwrap_or(fallback).to_string()
}

fn time_or(raw: &Value, key: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    raw[key]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(fallback)
}

/// Normalizes a raw provider body. Fields may sit at the top level or under
/// a `measurements` object; anything missing reads as 0 / `"unknown"`.
pub fn normalize(raw: &Value, lat: f64, lng: f64, now: DateTime<Utc>) -> SatellitePayload {
    let m = if raw["measurements"].is_object() {
        &raw["measurements"]
    } else {
        raw
    };

    SatellitePayload {
        satellite: SATELLITE_NAME.to_string(),
        timestamp: time_or(raw, "timestamp", now),
        location: GeoPoint {
            latitude: lat,
            longitude: lng,
        },
        measurements: ColumnMeasurements {
            no2_column: column(m, "no2"),
            o3_column: column(m, "o3"),
            so2_column: column(m, "so2"),
            hcho_column: column(m, "hcho"),
            aerosol_optical_depth: m["aerosol_optical_depth"].as_f64().unwrap_or(0.0),
            cloud_fraction: m["cloud_fraction"].as_f64().unwrap_or(0.0),
        },
        quality_flags: QualityFlags {
            no2_quality: text_or(raw, "no2_quality_flag", "unknown"),
            o3_quality: text_or(raw, "o3_quality_flag", "unknown"),
            overall_quality: text_or(raw, "overall_quality_flag", "unknown"),
        },
        spatial_resolution: text_or(raw, "spatial_resolution", NATIVE_RESOLUTION),
        overpass_time: time_or(raw, "overpass_time", now),
        data_source: SatelliteDataSource::Real,
    }
}
