pub mod api;
pub mod aqi;
pub mod combine;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod health;
pub mod model;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod satellite;
pub mod simulate;
pub mod transform;
