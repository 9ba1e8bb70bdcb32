//! Reading output: JSON to the log, or one flattened CSV row per reading.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::model::{Reading, SourceTag};

/// A [`Reading`] flattened into CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRow {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub aqi: u32,
    pub category: String,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub source: SourceTag,
    pub data_available: bool,
}

impl From<&Reading> for ReadingRow {
    fn from(r: &Reading) -> Self {
        Self {
            timestamp: r.timestamp,
            location: r.location.name.clone(),
            lat: r.location.lat,
            lng: r.location.lng,
            aqi: r.measurements.aqi,
            category: r.category.to_string(),
            pm25: r.measurements.pm25,
            pm10: r.measurements.pm10,
            no2: r.measurements.no2,
            o3: r.measurements.o3,
            co: r.measurements.co,
            source: r.source,
            data_available: r.data_available,
        }
    }
}

/// Logs a reading as pretty-printed JSON.
pub fn print_json(reading: &Reading) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(reading)?);
    Ok(())
}

/// Appends one row for `reading`, writing the header only when the file is
/// new. Parent directories are created as needed.
pub fn append_reading(path: &Path, reading: &Reading) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending reading");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(ReadingRow::from(reading))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{SourceInputs, combine};
    use crate::model::Location;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join("aq_aggregator_tests").join(name);
        let _ = fs::remove_file(&path);
        path
    }

    fn reading() -> Reading {
        combine(&SourceInputs::default()).into_reading(Location::default(), Utc::now())
    }

    #[test]
    fn test_row_flattens_reading() {
        let row = ReadingRow::from(&reading());
        assert_eq!(row.location, "Washington, DC");
        assert_eq!(row.aqi, 69);
        assert_eq!(row.category, "Moderate");
        assert_eq!(row.source, SourceTag::Simulated);
        assert!(!row.data_available);
    }

    #[test]
    fn test_print_json_succeeds() {
        print_json(&reading()).unwrap();
    }

    #[test]
    fn test_appends_rows_under_one_header() {
        let path = scratch("readings.csv");
        append_reading(&path, &reading()).unwrap();
        append_reading(&path, &reading()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,location,lat,lng,aqi"));
        assert_eq!(
            content.lines().filter(|l| l.starts_with("timestamp")).count(),
            1
        );
        assert!(lines[1].contains("\"Washington, DC\""));
        assert!(lines[1].contains("Simulated"));

        fs::remove_file(&path).unwrap();
    }
}
