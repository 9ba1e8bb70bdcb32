//! Per-source transforms from raw provider payloads into a
//! [`MeasurementVector`].
//!
//! All transforms are pure and tolerant: anything missing or malformed stays
//! at 0, which the combiner reads as "unset".

use serde_json::Value;

use crate::aqi::overall_aqi;
use crate::model::MeasurementVector;
use crate::satellite::ColumnMeasurements;

/// Surface NO2 (ppb) per unit of satellite NO2 column. Placeholder factor.
pub const SATELLITE_NO2_FACTOR: f64 = 0.8;
/// Surface O3 (ppb) per unit of satellite O3 column. Placeholder factor.
pub const SATELLITE_O3_FACTOR: f64 = 0.6;

/// Scale from the weather provider's 1–5 index onto 0–500.
const WEATHER_INDEX_SCALE: f64 = 50.0;

// µg/m³ per unit of the breakpoint tables at 25 °C and 1 atm.
const NO2_UGM3_PER_PPB: f64 = 1.88;
const O3_UGM3_PER_PPB: f64 = 1.96;
const CO_UGM3_PER_PPM: f64 = 1145.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroundParameter {
    Pm25,
    Pm10,
    O3,
    No2,
    Co,
}

/// Case-insensitive substring match on a reported parameter name.
fn classify_parameter(name: &str) -> Option<GroundParameter> {
    let name = name.to_ascii_lowercase();
    if name.contains("pm2.5") {
        Some(GroundParameter::Pm25)
    } else if name.contains("pm10") {
        Some(GroundParameter::Pm10)
    } else if name.contains("ozone") || name.contains("o3") {
        Some(GroundParameter::O3)
    } else if name.contains("no2") {
        Some(GroundParameter::No2)
    } else if name.contains("co") {
        Some(GroundParameter::Co)
    } else {
        None
    }
}

fn non_negative(v: &Value) -> Option<f64> {
    v.as_f64().filter(|x| *x >= 0.0)
}

/// Ground-sensor observations: a list of
/// `{ParameterName, Value, AQI}` entries.
///
/// Recognized pollutants keep their concentration; `aqi` is the running
/// maximum of every reported index. When no index was reported, `aqi` is
/// computed from the concentrations.
pub fn transform_ground(raw: &Value) -> MeasurementVector {
    let mut v = MeasurementVector::default();
    let Some(entries) = raw.as_array() else {
        return v;
    };

    for entry in entries {
        let Some(param) = entry["ParameterName"].as_str().and_then(classify_parameter) else {
            continue;
        };

        if let Some(value) = non_negative(&entry["Value"]) {
            match param {
                GroundParameter::Pm25 => v.pm25 = value,
                GroundParameter::Pm10 => v.pm10 = value,
                GroundParameter::O3 => v.o3 = value,
                GroundParameter::No2 => v.no2 = value,
                GroundParameter::Co => v.co = value,
            }
        }

        if let Some(index) = non_negative(&entry["AQI"]) {
            v.aqi = v.aqi.max(index.round() as u32);
        }
    }

    if v.aqi == 0 {
        v.aqi = overall_aqi(&v);
    }
    v
}

/// Index from weather-provider components, which are all µg/m³. Gases are
/// converted to the table units first.
fn weather_components_aqi(v: &MeasurementVector) -> u32 {
    overall_aqi(&MeasurementVector {
        no2: v.no2 / NO2_UGM3_PER_PPB,
        o3: v.o3 / O3_UGM3_PER_PPB,
        co: v.co / CO_UGM3_PER_PPM,
        ..*v
    })
}

/// Weather-provider air pollution body. Components come either from
/// `list[0].components` or a top-level `components` object and map 1:1;
/// a 1–5 overall index is scaled by 50, and without one the index is
/// computed from the unit-converted components.
pub fn transform_weather(raw: &Value) -> MeasurementVector {
    let entry = if raw["list"].is_array() {
        &raw["list"][0]
    } else {
        raw
    };
    let c = &entry["components"];
    let field = |key: &str| non_negative(&c[key]).unwrap_or(0.0);

    let mut v = MeasurementVector {
        aqi: 0,
        pm25: field("pm2_5"),
        pm10: field("pm10"),
        no2: field("no2"),
        o3: field("o3"),
        co: field("co"),
    };

    v.aqi = match entry["main"]["aqi"].as_f64() {
        Some(index) if (1.0..=5.0).contains(&index) => (index * WEATHER_INDEX_SCALE).round() as u32,
        _ => weather_components_aqi(&v),
    };
    v
}

/// Approximate index from column quantities, clamped to `[20, 200]`.
pub fn satellite_derived_aqi(m: &ColumnMeasurements) -> u32 {
    let raw = (m.no2_column * 2.0)
        .max(m.o3_column * 1.5)
        .max(m.aerosol_optical_depth * 100.0);
    raw.clamp(20.0, 200.0).round() as u32
}

/// Satellite columns approximated as surface NO2/O3. `aqi` carries the
/// column-derived approximation; the combiner decides whether to use it.
/// A payload without any column values yields an empty vector.
pub fn transform_satellite(m: &ColumnMeasurements) -> MeasurementVector {
    if m.is_empty() {
        return MeasurementVector::default();
    }
    MeasurementVector {
        aqi: satellite_derived_aqi(m),
        no2: m.no2_column * SATELLITE_NO2_FACTOR,
        o3: m.o3_column * SATELLITE_O3_FACTOR,
        ..Default::default()
    }
}
