//! HTTP surface consumed by the dashboard.

pub mod handlers;
pub mod server;

use axum::{
    Router,
    routing::{get, post},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::gateway::Gateway;

pub use server::serve;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    /// Source of randomness for every simulated response. Never held
    /// across an await.
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// Seeded when `seed` is given, else seeded from OS entropy.
    pub fn new(gateway: Gateway, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            gateway,
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/airquality", get(handlers::get_air_quality))
        .route("/satellite", get(handlers::get_satellite))
        .route("/forecast", get(handlers::get_forecast))
        .route("/historical", get(handlers::get_historical))
        .route("/health-alerts", get(handlers::get_health_alerts))
        .route("/notifications/email", post(handlers::notify_email))
        .route("/notifications/sms", post(handlers::notify_sms))
        .route("/notifications/push", post(handlers::notify_push))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
