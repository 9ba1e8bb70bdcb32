//! Synthetic stand-ins for the satellite provider and the forecast model.
//!
//! Every generator takes its randomness as an argument so callers can pass a
//! seeded RNG, and every payload it produces identifies itself as simulated.

pub mod forecast;
pub mod history;
pub mod satellite;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

/// Offset of local solar time from UTC at a longitude, whole hours.
pub fn solar_offset(lng: f64) -> FixedOffset {
    let hours = (lng / 15.0).round().clamp(-12.0, 12.0) as i32;
    FixedOffset::east_opt(hours * 3600).unwrap_or(Utc.fix())
}

/// `ts` expressed in local solar time at `lng`.
pub fn local_time(ts: DateTime<Utc>, lng: f64) -> DateTime<FixedOffset> {
    ts.with_timezone(&solar_offset(lng))
}

/// Rounds to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// The `i`th hour after `start`.
pub(crate) fn hourly(start: DateTime<Utc>, i: usize) -> DateTime<Utc> {
    start + Duration::hours(i as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_solar_offset_tracks_longitude() {
        let noon_utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(local_time(noon_utc, 0.0).hour(), 12);
        assert_eq!(local_time(noon_utc, -77.0369).hour(), 7);
        assert_eq!(local_time(noon_utc, 139.7).hour(), 21);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(0.8765, 2), 0.88);
    }
}
