//! Hourly forecast series from hand-tuned sinusoids and bounded noise.
//!
//! This is not a model. It produces a plausible-looking series so the
//! dashboard has something to chart, and labels itself as simulated.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;

use super::{hourly, local_time, round_to};
use crate::model::{Location, SourceTag};

const BASELINE_AQI: f64 = 65.0;
pub const CONFIDENCE_CEILING: f64 = 0.95;
pub const CONFIDENCE_FLOOR: f64 = 0.6;

/// Forecast horizon accepted by `/forecast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Timeframe {
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "48h")]
    TwoDays,
}

impl Timeframe {
    /// `6h` and `24h` map directly, absent means `24h`, anything else is
    /// treated as `48h`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("24h") => Timeframe::OneDay,
            Some("6h") => Timeframe::SixHours,
            Some(_) => Timeframe::TwoDays,
        }
    }

    pub fn hours(self) -> usize {
        match self {
            Timeframe::SixHours => 6,
            Timeframe::OneDay => 24,
            Timeframe::TwoDays => 48,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Relative weight of each source in a point. Need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceWeights {
    pub tempo: f64,
    pub ground: f64,
    pub weather: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub aqi: u32,
    pub confidence: f64,
    pub pm25: f64,
    pub no2: f64,
    pub o3: f64,
    pub weather: WeatherConditions,
    pub sources: SourceWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMetadata {
    pub model_version: &'static str,
    pub last_trained: &'static str,
    pub accuracy: f64,
    pub rmse: f64,
    pub data_sources: [&'static str; 3],
    pub update_frequency: &'static str,
    pub timeframe: Timeframe,
    pub horizon_hours: usize,
    pub location: Location,
    pub generated_at: DateTime<Utc>,
    pub source: SourceTag,
    pub simulated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub forecast: Vec<ForecastPoint>,
    pub metadata: ForecastMetadata,
}

fn describe(temperature: f64, humidity: f64, wind_speed: f64, pressure: f64) -> &'static str {
    if wind_speed > 10.0 {
        "windy"
    } else if humidity > 80.0 {
        "humid"
    } else if pressure < 1010.0 {
        "unsettled"
    } else if temperature > 25.0 {
        "warm and sunny"
    } else {
        "clear"
    }
}

/// Adjustment to the index from simulated weather.
fn weather_impact(temperature: f64, humidity: f64, wind_speed: f64, pressure: f64) -> f64 {
    let mut impact = 0.0;
    if temperature > 25.0 {
        impact += 10.0;
    }
    if humidity > 80.0 {
        impact += 8.0;
    }
    impact -= (wind_speed * 2.0).min(20.0);
    if pressure < 1010.0 {
        impact += 5.0;
    }
    impact
}

/// Generates `hours` hourly points starting at `start`.
///
/// Confidence begins at most [`CONFIDENCE_CEILING`], decays roughly linearly
/// with noise, never drops below [`CONFIDENCE_FLOOR`], and never increases
/// from one point to the next.
pub fn generate_points<R: Rng + ?Sized>(
    rng: &mut R,
    location: &Location,
    start: DateTime<Utc>,
    hours: usize,
) -> Vec<ForecastPoint> {
    let month = f64::from(local_time(start, location.lng).month0());
    let seasonal = (month / 12.0 * 2.0 * PI).sin() * 15.0;

    let mut points = Vec::with_capacity(hours);
    let mut confidence_so_far = CONFIDENCE_CEILING;

    for i in 0..hours {
        let timestamp = hourly(start, i);
        let local = local_time(timestamp, location.lng);
        let h = f64::from(local.hour());
        let step = i as f64;

        let diurnal = ((h - 6.0) / 24.0 * 2.0 * PI).sin() * 20.0;
        let weekly = match local.weekday() {
            Weekday::Sat | Weekday::Sun => -15.0,
            _ => 10.0,
        };

        let temperature =
            15.0 + ((h - 6.0) / 24.0 * 2.0 * PI).sin() * 8.0 + rng.r#gen::<f64>() * 4.0;
        let humidity =
            (60.0 + (h / 12.0 * PI).sin() * 20.0 + rng.r#gen::<f64>() * 10.0).clamp(0.0, 100.0);
        let wind_speed = (3.0 + rng.r#gen::<f64>() * 8.0 + (step / 6.0).sin() * 3.0).max(0.0);
        let pressure = 1013.0 + (step / 12.0).sin() * 10.0 + rng.r#gen::<f64>() * 5.0;

        let tempo_weight = 0.4 + rng.r#gen::<f64>() * 0.2;
        let ground_weight = 0.3 + rng.r#gen::<f64>() * 0.2;
        let weather_weight = 0.2 + rng.r#gen::<f64>() * 0.1;

        let uncertainty = (rng.r#gen::<f64>() - 0.5) * 20.0;
        let predicted = (BASELINE_AQI
            + seasonal
            + diurnal
            + weekly
            + weather_impact(temperature, humidity, wind_speed, pressure)
            + uncertainty)
            .clamp(20.0, 200.0);

        let raw_confidence = (CONFIDENCE_CEILING
            - step / hours as f64 * 0.3
            - rng.r#gen::<f64>() * 0.1)
            .max(CONFIDENCE_FLOOR);
        confidence_so_far = confidence_so_far.min(round_to(raw_confidence, 2));

        let pm25 = predicted * 0.35 + rng.r#gen::<f64>() * 8.0;
        let no2 = predicted * 0.4 + rng.r#gen::<f64>() * 12.0;
        let ozone_heat = if temperature > 20.0 { 15.0 } else { 0.0 };
        let o3 = predicted * 0.6 + ozone_heat + rng.r#gen::<f64>() * 15.0;

        points.push(ForecastPoint {
            timestamp,
            aqi: predicted.round() as u32,
            confidence: confidence_so_far,
            pm25: round_to(pm25, 1),
            no2: round_to(no2, 1),
            o3: round_to(o3, 1),
            weather: WeatherConditions {
                temperature: round_to(temperature, 1),
                humidity: humidity.round(),
                wind_speed: round_to(wind_speed, 1),
                pressure: round_to(pressure, 1),
                description: Some(
                    describe(temperature, humidity, wind_speed, pressure).to_string(),
                ),
            },
            sources: SourceWeights {
                tempo: round_to(tempo_weight, 2),
                ground: round_to(ground_weight, 2),
                weather: round_to(weather_weight, 2),
            },
        });
    }

    points
}

/// Full `/forecast` response body.
pub fn generate_forecast<R: Rng + ?Sized>(
    rng: &mut R,
    location: &Location,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Forecast {
    let hours = timeframe.hours();
    Forecast {
        forecast: generate_points(rng, location, now, hours),
        metadata: ForecastMetadata {
            model_version: "v2.1.0",
            last_trained: "2024-01-15T10:00:00Z",
            accuracy: 87.3,
            rmse: 12.4,
            data_sources: ["TEMPO", "EPA_AirNow", "NOAA_Weather"],
            update_frequency: "5min",
            timeframe,
            horizon_hours: hours,
            location: location.clone(),
            generated_at: now,
            source: SourceTag::Simulated,
            simulated: true,
        },
    }
}
