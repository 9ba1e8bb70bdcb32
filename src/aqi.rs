//! EPA Air Quality Index calculation.
//!
//! Each pollutant has a static breakpoint table mapping a concentration band
//! onto an index band. Tables are stored contiguously: a band's upper
//! concentration is the next band's lower concentration, and the lower band
//! wins on a shared boundary.

use serde::Serialize;
use std::fmt;

use crate::model::MeasurementVector;

/// Pollutants the calculator has breakpoint tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    /// µg/m³, 24-hour
    Pm25,
    /// µg/m³, 24-hour
    Pm10,
    /// ppb, 8-hour
    O3,
    /// ppb, 1-hour
    No2,
    /// ppm, 8-hour
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 5] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::Co,
    ];

    /// The breakpoint table for this pollutant.
    pub fn breakpoints(self) -> &'static [Breakpoint] {
        match self {
            Pollutant::Pm25 => PM25_BREAKPOINTS,
            Pollutant::Pm10 => PM10_BREAKPOINTS,
            Pollutant::O3 => O3_BREAKPOINTS,
            Pollutant::No2 => NO2_BREAKPOINTS,
            Pollutant::Co => CO_BREAKPOINTS,
        }
    }

    fn concentration_in(self, v: &MeasurementVector) -> f64 {
        match self {
            Pollutant::Pm25 => v.pm25,
            Pollutant::Pm10 => v.pm10,
            Pollutant::O3 => v.o3,
            Pollutant::No2 => v.no2,
            Pollutant::Co => v.co,
        }
    }
}

/// One row of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: u32,
    pub index_high: u32,
}

const fn bp(conc_low: f64, conc_high: f64, index_low: u32, index_high: u32) -> Breakpoint {
    Breakpoint {
        conc_low,
        conc_high,
        index_low,
        index_high,
    }
}

static PM25_BREAKPOINTS: &[Breakpoint] = &[
    bp(0.0, 12.0, 0, 50),
    bp(12.0, 35.4, 51, 100),
    bp(35.4, 55.4, 101, 150),
    bp(55.4, 150.4, 151, 200),
    bp(150.4, 250.4, 201, 300),
    bp(250.4, 350.4, 301, 400),
    bp(350.4, 500.4, 401, 500),
];

static PM10_BREAKPOINTS: &[Breakpoint] = &[
    bp(0.0, 54.0, 0, 50),
    bp(54.0, 154.0, 51, 100),
    bp(154.0, 254.0, 101, 150),
    bp(254.0, 354.0, 151, 200),
    bp(354.0, 424.0, 201, 300),
    bp(424.0, 504.0, 301, 400),
    bp(504.0, 604.0, 401, 500),
];

// 8-hour ozone has no bands above 300.
static O3_BREAKPOINTS: &[Breakpoint] = &[
    bp(0.0, 54.0, 0, 50),
    bp(54.0, 70.0, 51, 100),
    bp(70.0, 85.0, 101, 150),
    bp(85.0, 105.0, 151, 200),
    bp(105.0, 200.0, 201, 300),
];

static NO2_BREAKPOINTS: &[Breakpoint] = &[
    bp(0.0, 53.0, 0, 50),
    bp(53.0, 100.0, 51, 100),
    bp(100.0, 360.0, 101, 150),
    bp(360.0, 649.0, 151, 200),
    bp(649.0, 1249.0, 201, 300),
    bp(1249.0, 1649.0, 301, 400),
    bp(1649.0, 2049.0, 401, 500),
];

static CO_BREAKPOINTS: &[Breakpoint] = &[
    bp(0.0, 4.4, 0, 50),
    bp(4.4, 9.4, 51, 100),
    bp(9.4, 12.4, 101, 150),
    bp(12.4, 15.4, 151, 200),
    bp(15.4, 30.4, 201, 300),
    bp(30.4, 40.4, 301, 400),
    bp(40.4, 50.4, 401, 500),
];

/// Maps a concentration onto the 0–500 index by linear interpolation within
/// its breakpoint band.
///
/// Returns 0 when the concentration lies outside every band, including
/// values above the top of the table. The top band is not extrapolated.
pub fn calculate_sub_index(pollutant: Pollutant, concentration: f64) -> u32 {
    let Some(row) = pollutant
        .breakpoints()
        .iter()
        .find(|b| b.conc_low <= concentration && concentration <= b.conc_high)
    else {
        return 0;
    };

    let index_span = f64::from(row.index_high) - f64::from(row.index_low);
    let conc_span = row.conc_high - row.conc_low;
    let index = index_span / conc_span * (concentration - row.conc_low) + f64::from(row.index_low);

    index.round() as u32
}

/// Overall index: the maximum sub-index across every pollutant with a known
/// (non-zero) concentration, or 0 when none is known.
pub fn overall_aqi(v: &MeasurementVector) -> u32 {
    Pollutant::ALL
        .iter()
        .map(|&p| (p, p.concentration_in(v)))
        .filter(|(_, c)| *c > 0.0)
        .map(|(p, c)| calculate_sub_index(p, c))
        .max()
        .unwrap_or(0)
}

/// EPA health category for an index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// | Index    | Category                       |
    /// |----------|--------------------------------|
    /// | 0–50     | Good                           |
    /// | 51–100   | Moderate                       |
    /// | 101–150  | Unhealthy for Sensitive Groups |
    /// | 151–200  | Unhealthy                      |
    /// | 201–300  | Very Unhealthy                 |
    /// | > 300    | Hazardous                      |
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::UnhealthyForSensitiveGroups => {
                write!(f, "Unhealthy for Sensitive Groups")
            }
            AqiCategory::Unhealthy => write!(f, "Unhealthy"),
            AqiCategory::VeryUnhealthy => write!(f, "Very Unhealthy"),
            AqiCategory::Hazardous => write!(f, "Hazardous"),
        }
    }
}
