//! Core data types shared by the aggregation pipeline and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aqi::AqiCategory;

/// Latitude of the fallback location (Washington, DC).
pub const DEFAULT_LAT: f64 = 38.9072;
/// Longitude of the fallback location (Washington, DC).
pub const DEFAULT_LNG: f64 = -77.0369;
pub const DEFAULT_LOCATION_NAME: &str = "Washington, DC";

/// A point the caller wants readings for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            lat: DEFAULT_LAT,
            lng: DEFAULT_LNG,
            name: DEFAULT_LOCATION_NAME.to_string(),
            zip_code: None,
        }
    }
}

impl Location {
    /// Builds a location from optional query values, falling back to the
    /// default coordinates for anything missing or out of range.
    pub fn from_parts(
        lat: Option<f64>,
        lng: Option<f64>,
        name: Option<String>,
        zip_code: Option<String>,
    ) -> Self {
        let fallback = Self::default();
        Self {
            lat: lat
                .filter(|v| (-90.0..=90.0).contains(v))
                .unwrap_or(fallback.lat),
            lng: lng
                .filter(|v| (-180.0..=180.0).contains(v))
                .unwrap_or(fallback.lng),
            name: name.filter(|n| !n.trim().is_empty()).unwrap_or(fallback.name),
            zip_code: zip_code.filter(|z| !z.trim().is_empty()),
        }
    }
}

/// The canonical unit of data in the pipeline.
///
/// A field equal to exactly `0` means "unset" until the combiner fills it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementVector {
    /// 0–500, higher is worse.
    pub aqi: u32,
    /// µg/m³
    pub pm25: f64,
    /// µg/m³
    pub pm10: f64,
    /// ppb
    pub no2: f64,
    /// ppb
    pub o3: f64,
    /// ppm
    pub co: f64,
}

impl MeasurementVector {
    /// True when no field has been populated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Provenance label for a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTag {
    GroundSensors,
    #[serde(rename = "GroundSensors+Satellite")]
    GroundSensorsSatellite,
    Satellite,
    WeatherDerived,
    Combined,
    Simulated,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::GroundSensors => write!(f, "GroundSensors"),
            SourceTag::GroundSensorsSatellite => write!(f, "GroundSensors+Satellite"),
            SourceTag::Satellite => write!(f, "Satellite"),
            SourceTag::WeatherDerived => write!(f, "WeatherDerived"),
            SourceTag::Combined => write!(f, "Combined"),
            SourceTag::Simulated => write!(f, "Simulated"),
        }
    }
}

/// One normalized air-quality reading, built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub location: Location,
    pub measurements: MeasurementVector,
    pub source: SourceTag,
    pub timestamp: DateTime<Utc>,
    /// `false` means every field was synthesized.
    pub data_available: bool,
    pub category: AqiCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults_when_absent() {
        let loc = Location::from_parts(None, None, None, None);
        assert_eq!(loc, Location::default());
        assert_eq!(loc.lat, 38.9072);
        assert_eq!(loc.lng, -77.0369);
    }

    #[test]
    fn test_location_rejects_out_of_range_coordinates() {
        let loc = Location::from_parts(Some(95.0), Some(-200.0), None, Some("  ".into()));
        assert_eq!(loc.lat, DEFAULT_LAT);
        assert_eq!(loc.lng, DEFAULT_LNG);
        assert_eq!(loc.zip_code, None);
    }

    #[test]
    fn test_source_tag_serializes_combined_label() {
        let json = serde_json::to_string(&SourceTag::GroundSensorsSatellite).unwrap();
        assert_eq!(json, "\"GroundSensors+Satellite\"");
        assert_eq!(SourceTag::GroundSensorsSatellite.to_string(), "GroundSensors+Satellite");
    }

    #[test]
    fn test_location_uses_camel_case_zip_code() {
        let loc = Location::from_parts(None, None, None, Some("20001".into()));
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["zipCode"], "20001");
    }
}
