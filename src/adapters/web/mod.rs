//! Web adapter.
//!
//! Serves the dashboard page plus the JSON API the page polls: latest
//! prices, windowed history for the chart, alert CRUD, and the
//! triggered-events pass. All state lives in the two shared stores; the
//! handlers only read, validate, and delegate.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::domain::watchlist::Watchlist;
use crate::services::alerts::AlertStore;
use crate::services::timeseries::TimeSeriesStore;

pub struct AppState {
    pub prices: Arc<TimeSeriesStore>,
    pub alerts: Arc<AlertStore>,
    pub watchlist: Arc<Watchlist>,
    pub currency: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/prices", get(handlers::prices))
        .route("/api/history/{symbol}", get(handlers::history))
        .route("/api/alerts", get(handlers::list_alerts))
        .route("/api/alerts/price", post(handlers::add_price_alert))
        .route("/api/alerts/percent", post(handlers::add_percent_alert))
        .route(
            "/api/alerts/{kind}/{symbol}/{index}",
            delete(handlers::remove_alert),
        )
        .route("/api/alerts/triggered", get(handlers::triggered_alerts))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
