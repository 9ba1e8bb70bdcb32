//! Merges up to three per-source vectors into one reading.
//!
//! Priority is ground > satellite > weather > fixed defaults. The combiner
//! never fails: with no sources at all it returns a fully defaulted reading
//! labelled [`SourceTag::Simulated`].

use chrono::{DateTime, Utc};

use crate::aqi::AqiCategory;
use crate::model::{Location, MeasurementVector, Reading, SourceTag};

/// "Typical urban" values for any field no source provided.
pub const DEFAULT_PM25: f64 = 12.5;
pub const DEFAULT_PM10: f64 = 23.8;
pub const DEFAULT_CO: f64 = 0.8;
pub const DEFAULT_NO2: f64 = 18.2;
pub const DEFAULT_O3: f64 = 34.7;

/// Whatever each source produced for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceInputs {
    pub ground: Option<MeasurementVector>,
    pub satellite: Option<MeasurementVector>,
    pub weather: Option<MeasurementVector>,
}

/// Result of merging, before it is wrapped into a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combined {
    pub measurements: MeasurementVector,
    pub source: SourceTag,
    pub data_available: bool,
}

fn fill_f64(slot: &mut f64, value: f64) {
    if *slot == 0.0 {
        *slot = value;
    }
}

fn fill_aqi(slot: &mut u32, value: u32) {
    if *slot == 0 {
        *slot = value;
    }
}

pub fn combine(inputs: &SourceInputs) -> Combined {
    let mut v = MeasurementVector::default();
    let mut has_ground = false;
    let mut has_satellite = false;

    if let Some(g) = &inputs.ground {
        has_ground = true;
        v.pm25 = g.pm25;
        v.pm10 = g.pm10;
        v.no2 = g.no2;
        v.o3 = g.o3;
        v.co = g.co;
        v.aqi = v.aqi.max(g.aqi);
    }

    if let Some(s) = &inputs.satellite {
        has_satellite = true;
        fill_f64(&mut v.no2, s.no2);
        fill_f64(&mut v.o3, s.o3);
        if !has_ground {
            v.aqi = s.aqi;
        }
    }

    let has_weather = inputs.weather.is_some();
    if let Some(w) = &inputs.weather {
        fill_f64(&mut v.pm25, w.pm25);
        fill_f64(&mut v.pm10, w.pm10);
        fill_f64(&mut v.no2, w.no2);
        fill_f64(&mut v.o3, w.o3);
        fill_f64(&mut v.co, w.co);
        fill_aqi(&mut v.aqi, w.aqi);
    }

    fill_f64(&mut v.pm25, DEFAULT_PM25);
    fill_f64(&mut v.pm10, DEFAULT_PM10);
    fill_f64(&mut v.co, DEFAULT_CO);
    fill_f64(&mut v.no2, DEFAULT_NO2);
    fill_f64(&mut v.o3, DEFAULT_O3);
    if v.aqi == 0 {
        let worst = v.pm25.max(v.pm10).max(v.no2).max(v.o3);
        v.aqi = (2.0 * worst).clamp(20.0, 200.0).round() as u32;
    }

    let source = match (has_ground, has_satellite, has_weather) {
        (true, true, _) => SourceTag::GroundSensorsSatellite,
        (true, false, _) => SourceTag::GroundSensors,
        (false, true, _) => SourceTag::Satellite,
        (false, false, true) => SourceTag::WeatherDerived,
        (false, false, false) => SourceTag::Simulated,
    };

    Combined {
        measurements: v,
        source,
        data_available: has_ground || has_satellite || has_weather,
    }
}

impl Combined {
    pub fn into_reading(self, location: Location, timestamp: DateTime<Utc>) -> Reading {
        Reading {
            location,
            category: AqiCategory::from_aqi(self.measurements.aqi),
            measurements: self.measurements,
            source: self.source,
            timestamp,
            data_available: self.data_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_ground() -> MeasurementVector {
        MeasurementVector {
            aqi: 87,
            pm25: 28.0,
            pm10: 41.0,
            no2: 22.0,
            o3: 48.0,
            co: 0.6,
        }
    }

    #[test]
    fn test_no_inputs_yields_simulated_defaults() {
        let c = combine(&SourceInputs::default());
        assert_eq!(
            c.measurements,
            MeasurementVector {
                aqi: 69,
                pm25: 12.5,
                pm10: 23.8,
                no2: 18.2,
                o3: 34.7,
                co: 0.8,
            }
        );
        assert_eq!(c.source, SourceTag::Simulated);
        assert!(!c.data_available);
    }

    #[test]
    fn test_ground_only_is_passed_through() {
        let g = full_ground();
        let c = combine(&SourceInputs {
            ground: Some(g),
            ..Default::default()
        });
        assert_eq!(c.measurements, g);
        assert_eq!(c.source, SourceTag::GroundSensors);
        assert!(c.data_available);
    }

    #[test]
    fn test_ground_pm25_scenario_fills_defaults() {
        let g = MeasurementVector {
            aqi: 112,
            pm25: 40.0,
            ..Default::default()
        };
        let c = combine(&SourceInputs {
            ground: Some(g),
            ..Default::default()
        });
        assert_eq!(c.measurements.aqi, 112);
        assert_eq!(c.measurements.pm25, 40.0);
        assert_eq!(c.measurements.pm10, DEFAULT_PM10);
        assert_eq!(c.measurements.no2, DEFAULT_NO2);
        assert_eq!(c.measurements.o3, DEFAULT_O3);
        assert_eq!(c.measurements.co, DEFAULT_CO);
        assert_eq!(c.source, SourceTag::GroundSensors);
    }

    #[test]
    fn test_ground_and_satellite_disjoint_union() {
        let g = MeasurementVector {
            aqi: 60,
            pm25: 15.0,
            pm10: 30.0,
            co: 0.5,
            ..Default::default()
        };
        let s = MeasurementVector {
            aqi: 150,
            no2: 16.0,
            o3: 30.0,
            ..Default::default()
        };
        let c = combine(&SourceInputs {
            ground: Some(g),
            satellite: Some(s),
            weather: None,
        });
        assert_eq!(
            c.measurements,
            MeasurementVector {
                aqi: 60,
                pm25: 15.0,
                pm10: 30.0,
                no2: 16.0,
                o3: 30.0,
                co: 0.5,
            }
        );
        assert_eq!(c.source, SourceTag::GroundSensorsSatellite);
    }

    #[test]
    fn test_ground_wins_over_satellite_and_weather() {
        let g = full_ground();
        let other = MeasurementVector {
            aqi: 190,
            pm25: 99.0,
            pm10: 99.0,
            no2: 99.0,
            o3: 99.0,
            co: 9.0,
        };
        let c = combine(&SourceInputs {
            ground: Some(g),
            satellite: Some(other),
            weather: Some(other),
        });
        assert_eq!(c.measurements, g);
    }

    #[test]
    fn test_satellite_only_uses_derived_index() {
        let s = MeasurementVector {
            aqi: 75,
            no2: 16.0,
            o3: 30.0,
            ..Default::default()
        };
        let c = combine(&SourceInputs {
            satellite: Some(s),
            ..Default::default()
        });
        assert_eq!(c.measurements.aqi, 75);
        assert_eq!(c.measurements.no2, 16.0);
        assert_eq!(c.measurements.pm25, DEFAULT_PM25);
        assert_eq!(c.source, SourceTag::Satellite);
    }

    #[test]
    fn test_weather_fills_only_remaining_fields() {
        let s = MeasurementVector {
            aqi: 40,
            no2: 10.0,
            ..Default::default()
        };
        let w = MeasurementVector {
            aqi: 100,
            pm25: 5.0,
            no2: 55.0,
            o3: 20.0,
            ..Default::default()
        };
        let c = combine(&SourceInputs {
            satellite: Some(s),
            weather: Some(w),
            ..Default::default()
        });
        assert_eq!(c.measurements.no2, 10.0);
        assert_eq!(c.measurements.pm25, 5.0);
        assert_eq!(c.measurements.o3, 20.0);
        assert_eq!(c.measurements.aqi, 40);
        assert_eq!(c.measurements.co, DEFAULT_CO);
        assert_eq!(c.source, SourceTag::Satellite);
    }

    #[test]
    fn test_weather_only_is_weather_derived() {
        let w = MeasurementVector {
            aqi: 100,
            pm25: 5.0,
            ..Default::default()
        };
        let c = combine(&SourceInputs {
            weather: Some(w),
            ..Default::default()
        });
        assert_eq!(c.source, SourceTag::WeatherDerived);
        assert_eq!(c.measurements.aqi, 100);
        assert!(c.data_available);
    }

    #[test]
    fn test_empty_ground_vector_still_counts_as_present() {
        let c = combine(&SourceInputs {
            ground: Some(MeasurementVector::default()),
            ..Default::default()
        });
        assert_eq!(c.source, SourceTag::GroundSensors);
        assert_eq!(c.measurements.aqi, 69);
        assert!(c.data_available);
    }

    #[test]
    fn test_into_reading_attaches_category() {
        let r = combine(&SourceInputs::default()).into_reading(Location::default(), Utc::now());
        assert_eq!(r.category, AqiCategory::Moderate);
        assert_eq!(r.source, SourceTag::Simulated);
    }
}
