//! One aggregation request: fan out to the providers, transform, combine.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::combine::{SourceInputs, combine};
use crate::config::Provider;
use crate::error::FetchError;
use crate::gateway::Gateway;
use crate::model::{Location, MeasurementVector, Reading};
use crate::transform::{transform_ground, transform_satellite, transform_weather};

/// Keeps a source only when it produced something usable.
fn usable(
    provider: Provider,
    result: Result<MeasurementVector, FetchError>,
) -> Option<MeasurementVector> {
    match result {
        Ok(v) if v.is_empty() => {
            debug!(%provider, "Provider returned no usable measurements");
            None
        }
        Ok(v) => Some(v),
        Err(e) if e.is_expected() => {
            debug!(%provider, error = %e, "Provider skipped");
            None
        }
        Err(e) => {
            warn!(%provider, error = %e, "Provider failed, continuing without it");
            None
        }
    }
}

/// Queries all three providers concurrently and merges what came back.
///
/// Never fails. Each provider failure only removes that source; with every
/// source gone the reading is fully defaulted and tagged `Simulated`.
#[tracing::instrument(skip(gateway), fields(lat = location.lat, lng = location.lng))]
pub async fn aggregate(gateway: &Gateway, location: Location, now: DateTime<Utc>) -> Reading {
    let (ground, satellite, weather) = tokio::join!(
        gateway.fetch_ground(&location),
        gateway.satellite_payload(&location, Some(now.date_naive()), now),
        gateway.fetch_weather(&location),
    );

    let inputs = SourceInputs {
        ground: usable(Provider::Ground, ground.map(|raw| transform_ground(&raw))),
        satellite: usable(
            Provider::Satellite,
            satellite.map(|p| transform_satellite(&p.measurements)),
        ),
        weather: usable(Provider::Weather, weather.map(|raw| transform_weather(&raw))),
    };

    let reading = combine(&inputs).into_reading(location, now);
    info!(
        source = %reading.source,
        aqi = reading.measurements.aqi,
        data_available = reading.data_available,
        "Aggregated reading"
    );
    reading
}
