//! HTTP request handlers.

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::alert::{AlertBook, AlertKind};
use crate::domain::engine::TriggeredEvent;
use crate::domain::history::{PricePoint, Window};
use crate::domain::money::format_amount;

use super::{AppState, WebError};

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let template = super::templates::DashboardTemplate {
        assets: state.watchlist.assets(),
        currency: &state.currency,
    };
    let html = template
        .render()
        .map_err(|e| WebError::internal(e.to_string()))?;
    Ok(Html(html).into_response())
}

/// Per-symbol card data: latest price plus the trailing-day move.
#[derive(Debug, Serialize)]
pub struct PriceCard {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub display: Option<String>,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub updated_at: Option<DateTime<Utc>>,
    pub cards: Vec<PriceCard>,
}

pub async fn prices(State(state): State<Arc<AppState>>) -> Json<PricesResponse> {
    let latest = state.prices.latest();
    let cards = state
        .watchlist
        .assets()
        .iter()
        .map(|asset| {
            let price = latest
                .get(&asset.ticker)
                .copied()
                .filter(|p| *p > 0.0);
            let points = state.prices.range(&asset.ticker, Window::Day);
            let change_pct = match (points.first(), points.last()) {
                (Some(first), Some(last)) if points.len() > 1 && first.price != 0.0 => {
                    Some((last.price - first.price) / first.price * 100.0)
                }
                _ => None,
            };
            PriceCard {
                symbol: asset.ticker.clone(),
                name: asset.name.clone(),
                display: price.map(|p| format_amount(&state.currency, p)),
                price,
                change_pct,
            }
        })
        .collect();

    Json(PricesResponse {
        updated_at: state.prices.last_updated(),
        cards,
    })
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub window: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub window: &'static str,
    pub points: Vec<PricePoint>,
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, WebError> {
    let symbol = symbol.to_uppercase();
    if !state.watchlist.contains(&symbol) {
        return Err(WebError::not_found(format!("unknown symbol: {symbol}")));
    }

    let window = Window::parse(query.window.as_deref().unwrap_or("1d"));
    let points = state.prices.range(&symbol, window);
    Ok(Json(HistoryResponse {
        symbol,
        window: window.label(),
        points,
    }))
}

pub async fn list_alerts(State(state): State<Arc<AppState>>) -> Json<AlertBook> {
    Json(state.alerts.snapshot())
}

#[derive(Debug, Deserialize)]
pub struct AddPriceAlertRequest {
    pub symbol: String,
    pub value: f64,
}

pub async fn add_price_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPriceAlertRequest>,
) -> Result<Response, WebError> {
    let symbol = req.symbol.to_uppercase();
    if !state.watchlist.contains(&symbol) {
        return Err(WebError::bad_request(format!("unknown symbol: {symbol}")));
    }
    if !req.value.is_finite() || req.value <= 0.0 {
        return Err(WebError::bad_request(
            "target price must be a positive number",
        ));
    }

    state.alerts.add_price_alert(&symbol, req.value);
    Ok((StatusCode::CREATED, Json(state.alerts.snapshot())).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AddPercentAlertRequest {
    pub symbol: String,
    pub percent: f64,
}

pub async fn add_percent_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPercentAlertRequest>,
) -> Result<Response, WebError> {
    let symbol = req.symbol.to_uppercase();
    if !state.watchlist.contains(&symbol) {
        return Err(WebError::bad_request(format!("unknown symbol: {symbol}")));
    }
    if !req.percent.is_finite() || req.percent == 0.0 {
        return Err(WebError::bad_request(
            "target percent must be a non-zero number",
        ));
    }

    state.alerts.add_percent_alert(&symbol, req.percent);
    Ok((StatusCode::CREATED, Json(state.alerts.snapshot())).into_response())
}

pub async fn remove_alert(
    State(state): State<Arc<AppState>>,
    Path((kind, symbol, index)): Path<(String, String, usize)>,
) -> Result<StatusCode, WebError> {
    let kind = AlertKind::parse(&kind)
        .ok_or_else(|| WebError::bad_request(format!("unknown alert kind: {kind}")))?;
    let symbol = symbol.to_uppercase();

    if state.alerts.remove_alert(kind, &symbol, index) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WebError::not_found("no such alert"))
    }
}

pub async fn triggered_alerts(State(state): State<Arc<AppState>>) -> Json<Vec<TriggeredEvent>> {
    let events = state
        .alerts
        .evaluate(&state.prices, &state.watchlist, &state.currency);
    Json(events)
}

pub async fn not_found() -> WebError {
    WebError::not_found("not found")
}
