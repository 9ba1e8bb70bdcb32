use aq_aggregator::api::{AppState, create_router};
use aq_aggregator::config::ProviderKeys;
use aq_aggregator::fetch::BasicClient;
use aq_aggregator::gateway::Gateway;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Router with no provider keys, so nothing touches the network.
fn app() -> Router {
    let gateway = Gateway::new(Arc::new(BasicClient::new()), ProviderKeys::none());
    create_router(AppState::new(gateway, Some(7)))
}

async fn call(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    call(Method::GET, uri, None).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    call(Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn test_health_reports_providers() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"]["EPA AirNow"], false);
}

#[tokio::test]
async fn test_airquality_without_keys_is_simulated() {
    let (status, body) = get("/airquality?lat=40.7128&lng=-74.006&name=New%20York").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "Simulated");
    assert_eq!(body["dataAvailable"], false);
    assert_eq!(body["measurements"]["aqi"], 69);
    assert_eq!(body["measurements"]["pm25"], 12.5);
    assert_eq!(body["location"]["name"], "New York");
    assert_eq!(body["location"]["lat"], 40.7128);
}

#[tokio::test]
async fn test_airquality_tolerates_bad_coordinates() {
    let (status, body) = get("/airquality?lat=north&lng=999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["lat"], 38.9072);
    assert_eq!(body["location"]["lng"], -77.0369);
}

#[tokio::test]
async fn test_satellite_falls_back_to_simulation() {
    let (status, body) = get("/satellite?lat=34.05&lng=-118.24&date=2024-06-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_source"], "NASA_TEMPO_Simulated");
    assert_eq!(body["satellite"], "TEMPO");
    assert_eq!(body["location"]["latitude"], 34.05);
    assert!(body["measurements"]["no2_column"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_forecast_timeframes() {
    let (status, body) = get("/forecast?timeframe=6h").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 6);
    assert_eq!(body["metadata"]["simulated"], true);

    let (_, body) = get("/forecast").await;
    assert_eq!(body["forecast"].as_array().unwrap().len(), 24);

    let (_, body) = get("/forecast?timeframe=48h").await;
    let points = body["forecast"].as_array().unwrap();
    assert_eq!(points.len(), 48);
    for p in points {
        let c = p["confidence"].as_f64().unwrap();
        assert!((0.6..=0.95).contains(&c));
    }
}

#[tokio::test]
async fn test_historical_has_a_day_of_points() {
    let (status, body) = get("/historical").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trends"].as_array().unwrap().len(), 24);
    assert!(body["summary"]["peakAqi"].as_u64().unwrap() >= 20);
}

#[tokio::test]
async fn test_health_alerts_for_hazardous_air() {
    let (status, body) = get("/health-alerts?aqi=250").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["highestSeverity"], "emergency");
    assert_eq!(body["alerts"][0]["location"], "Washington, DC");
    assert!(
        body["healthImpact"]["protectiveMeasures"]
            .as_array()
            .unwrap()
            .len()
            > 1
    );
}

#[tokio::test]
async fn test_notification_validation_errors() {
    let (status, body) = post("/notifications/email", json!({"to": "a@b.c"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Missing required fields");

    let (status, body) = post(
        "/notifications/sms",
        json!({"to": "call me maybe", "message": "hi"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid phone number format");

    let (status, _) = call(Method::POST, "/notifications/push", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_push_notification_succeeds() {
    let (status, body) = post(
        "/notifications/push",
        json!({"title": "Smoke", "message": "Stay inside", "severity": "danger"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Push notification sent successfully");
}
