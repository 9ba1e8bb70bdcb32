//! Fabricated satellite column data, used when the satellite provider is
//! unconfigured or unreachable.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::Rng;
use std::f64::consts::PI;

use super::local_time;
use crate::satellite::{
    ColumnMeasurements, GeoPoint, NATIVE_RESOLUTION, QualityFlags, SATELLITE_NAME,
    SatelliteDataSource, SatellitePayload,
};

/// Extra NO2 column during the morning and evening commute.
const RUSH_HOUR_NO2_BOOST: f64 = 2.0;

fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (17..=19).contains(&hour)
}

/// Uniform noise centred on zero with total width `width`.
fn centred<R: Rng + ?Sized>(rng: &mut R, width: f64) -> f64 {
    (rng.r#gen::<f64>() - 0.5) * width
}

fn quality<R: Rng + ?Sized>(rng: &mut R, p_good: f64) -> String {
    if rng.gen_bool(p_good) { "good" } else { "moderate" }.to_string()
}

/// Plausible column values for the location's local hour and season.
pub fn simulated_columns<R: Rng + ?Sized>(
    rng: &mut R,
    lng: f64,
    now: DateTime<Utc>,
) -> ColumnMeasurements {
    let local = local_time(now, lng);
    let h = f64::from(local.hour());
    let day_of_year = f64::from(local.ordinal());

    let rush = if is_rush_hour(local.hour()) {
        RUSH_HOUR_NO2_BOOST
    } else {
        0.0
    };
    // Ozone peaks in summer.
    let seasonal_o3 = 5.0 * ((day_of_year - 80.0) / 365.0 * 2.0 * PI).sin();

    let base_no2 = 15.0 + ((h - 8.0) / 12.0 * PI).sin() * 8.0 + rush;
    let base_o3 = 40.0 + ((h - 14.0) / 12.0 * PI).sin() * 20.0 + seasonal_o3;
    let base_so2 = 5.0 + rng.r#gen::<f64>() * 3.0;
    let base_hcho = 2.0 + rng.r#gen::<f64>() * 1.5;

    ColumnMeasurements {
        no2_column: (base_no2 + centred(rng, 4.0)).max(0.0),
        o3_column: (base_o3 + centred(rng, 8.0)).max(0.0),
        so2_column: (base_so2 + centred(rng, 2.0)).max(0.0),
        hcho_column: (base_hcho + centred(rng, 1.0)).max(0.0),
        aerosol_optical_depth: 0.1 + rng.r#gen::<f64>() * 0.3,
        cloud_fraction: rng.r#gen::<f64>() * 0.8,
    }
}

/// A complete satellite payload labelled [`SatelliteDataSource::Simulated`].
pub fn simulated_payload<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lng: f64,
    now: DateTime<Utc>,
) -> SatellitePayload {
    let measurements = simulated_columns(rng, lng, now);
    let quality_flags = QualityFlags {
        no2_quality: quality(rng, 0.8),
        o3_quality: quality(rng, 0.85),
        overall_quality: quality(rng, 0.9),
    };

    SatellitePayload {
        satellite: SATELLITE_NAME.to_string(),
        timestamp: now,
        location: GeoPoint {
            latitude: lat,
            longitude: lng,
        },
        measurements,
        quality_flags,
        spatial_resolution: NATIVE_RESOLUTION.to_string(),
        overpass_time: now,
        data_source: SatelliteDataSource::Simulated,
    }
}
