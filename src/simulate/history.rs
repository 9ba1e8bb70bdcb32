//! The last 24 hours of fabricated readings for the trends chart.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;

use super::{hourly, local_time, round_to};
use crate::model::SourceTag;

pub const HISTORY_HOURS: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Local `HH:MM` label for the chart axis.
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub aqi: u32,
    pub pm25: u32,
    pub no2: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub mean_aqi: f64,
    pub stddev_aqi: f64,
    pub peak_aqi: u32,
    pub peak_time: Option<String>,
}

impl TrendSummary {
    pub fn from_points(points: &[TrendPoint]) -> Self {
        let values: Vec<f64> = points.iter().map(|p| f64::from(p.aqi)).collect();
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let peak = points.iter().max_by_key(|p| p.aqi);
        Self {
            mean_aqi: round_to(mean, 1),
            stddev_aqi: round_to(variance.sqrt(), 1),
            peak_aqi: peak.map(|p| p.aqi).unwrap_or(0),
            peak_time: peak.map(|p| p.time.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalTrends {
    pub trends: Vec<TrendPoint>,
    pub summary: TrendSummary,
    pub source: SourceTag,
}

fn rush_hour_boost(hour: u32) -> f64 {
    match hour {
        7..=9 => 20.0,
        17..=19 => 15.0,
        _ => 0.0,
    }
}

/// Hourly points for the 24 hours ending at `now`, oldest first.
pub fn generate_trends<R: Rng + ?Sized>(
    rng: &mut R,
    lng: f64,
    now: DateTime<Utc>,
) -> HistoricalTrends {
    let start = now - Duration::hours(HISTORY_HOURS as i64 - 1);

    let trends: Vec<TrendPoint> = (0..HISTORY_HOURS)
        .map(|i| {
            let timestamp = hourly(start, i);
            let local = local_time(timestamp, lng);
            let hour = local.hour();

            let base = 50.0
                + ((f64::from(hour) - 6.0) / 24.0 * 2.0 * PI).sin() * 25.0
                + rush_hour_boost(hour);

            let aqi = (base + (rng.r#gen::<f64>() - 0.5) * 20.0).round().max(20.0);
            let pm25 = (base * 0.4 + (rng.r#gen::<f64>() - 0.5) * 10.0).round().max(5.0);
            let no2 = (base * 0.5 + (rng.r#gen::<f64>() - 0.5) * 15.0).round().max(10.0);

            TrendPoint {
                time: local.format("%H:%M").to_string(),
                timestamp,
                aqi: aqi as u32,
                pm25: pm25 as u32,
                no2: no2 as u32,
            }
        })
        .collect();

    HistoricalTrends {
        summary: TrendSummary::from_points(&trends),
        trends,
        source: SourceTag::Simulated,
    }
}
