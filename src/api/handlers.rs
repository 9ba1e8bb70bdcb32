//! Request handlers. Query parameters are parsed leniently: anything
//! missing or malformed falls back to a default instead of rejecting.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::MutexGuard;
use tracing::{debug, warn};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::health::{self, HealthReport};
use crate::model::{Location, Reading};
use crate::notify::{self, EmailRequest, PushRequest, Receipt, SmsRequest};
use crate::pipeline;
use crate::satellite::SatellitePayload;
use crate::simulate::forecast::{self, Forecast, Timeframe};
use crate::simulate::history::{self, HistoricalTrends};
use crate::simulate::satellite::simulated_payload;

const DEFAULT_ALERT_AQI: u32 = 85;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub zip_code: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub timeframe: Option<String>,
    pub aqi: Option<String>,
}

fn number(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
}

impl LocationQuery {
    fn location(&self) -> Location {
        Location::from_parts(
            number(&self.lat),
            number(&self.lng),
            self.name.clone(),
            self.zip_code.clone(),
        )
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }

    fn aqi(&self) -> u32 {
        self.aqi
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_ALERT_AQI)
    }
}

fn rng(state: &AppState) -> ApiResult<MutexGuard<'_, StdRng>> {
    state
        .rng
        .lock()
        .map_err(|_| ApiError::Internal("random source poisoned".to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let providers: serde_json::Map<String, Value> = state
        .gateway
        .availability()
        .into_iter()
        .map(|(p, configured)| (p.to_string(), Value::Bool(configured)))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": providers,
    }))
}

pub async fn get_air_quality(
    State(state): State<AppState>,
    Query(q): Query<LocationQuery>,
) -> Json<Reading> {
    Json(pipeline::aggregate(&state.gateway, q.location(), Utc::now()).await)
}

/// Real satellite data when the provider answers, simulated otherwise.
pub async fn get_satellite(
    State(state): State<AppState>,
    Query(q): Query<LocationQuery>,
) -> ApiResult<Json<SatellitePayload>> {
    let location = q.location();
    let now = Utc::now();

    match state.gateway.satellite_payload(&location, q.date(), now).await {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => {
            if e.is_expected() {
                debug!(error = %e, "Serving simulated satellite data");
            } else {
                warn!(error = %e, "Satellite endpoints failed, serving simulated data");
            }
            let mut rng = rng(&state)?;
            Ok(Json(simulated_payload(
                &mut *rng,
                location.lat,
                location.lng,
                now,
            )))
        }
    }
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Query(q): Query<LocationQuery>,
) -> ApiResult<Json<Forecast>> {
    let timeframe = Timeframe::parse(q.timeframe.as_deref());
    let mut rng = rng(&state)?;
    Ok(Json(forecast::generate_forecast(
        &mut *rng,
        &q.location(),
        timeframe,
        Utc::now(),
    )))
}

pub async fn get_historical(
    State(state): State<AppState>,
    Query(q): Query<LocationQuery>,
) -> ApiResult<Json<HistoricalTrends>> {
    let mut rng = rng(&state)?;
    Ok(Json(history::generate_trends(
        &mut *rng,
        q.location().lng,
        Utc::now(),
    )))
}

pub async fn get_health_alerts(
    State(state): State<AppState>,
    Query(q): Query<LocationQuery>,
) -> ApiResult<Json<HealthReport>> {
    let location = q.location();
    let mut rng = rng(&state)?;
    Ok(Json(health::health_report(
        &mut *rng,
        q.aqi(),
        &location.name,
        Utc::now(),
    )))
}

pub async fn notify_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<Json<Receipt>> {
    let req = body(payload)?;
    let mut rng = rng(&state)?;
    Ok(Json(notify::send_email(&mut *rng, &req, Utc::now())?))
}

pub async fn notify_sms(
    State(state): State<AppState>,
    payload: Result<Json<SmsRequest>, JsonRejection>,
) -> ApiResult<Json<Receipt>> {
    let req = body(payload)?;
    let mut rng = rng(&state)?;
    Ok(Json(notify::send_sms(&mut *rng, &req, Utc::now())?))
}

pub async fn notify_push(
    State(state): State<AppState>,
    payload: Result<Json<PushRequest>, JsonRejection>,
) -> ApiResult<Json<Receipt>> {
    let req = body(payload)?;
    let mut rng = rng(&state)?;
    Ok(Json(notify::send_push(&mut *rng, &req, Utc::now())?))
}
