//! Balance query and mutation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::core::conversion::Report;
use crate::core::rates::fetch_with_timeout;
use crate::core::{Currency, CurrencyList};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/amount/get", get(get_report))
        .route("/amount/set", post(set_amounts))
        .route("/modify", post(modify_amounts))
        .route("/{currency}/get", get(get_currency))
}

/// Balance of a single currency.
#[derive(Debug, Serialize)]
pub struct CurrencyAmount {
    /// Upper-case currency code.
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

const SUCCESS: StatusResponse = StatusResponse { status: "success" };

/// Picks the supported currencies out of a free-form payload.
///
/// Unknown keys are ignored. A supported key with a non-numeric value, two keys
/// naming the same currency, or a payload without any supported key is rejected.
fn recognized_amounts(
    payload: Map<String, Value>,
    currencies: &CurrencyList,
) -> ApiResult<Vec<(Currency, f64)>> {
    let mut amounts = Vec::new();
    for (key, value) in payload {
        let Ok(currency) = currencies.resolve(&key) else {
            debug!(field = %key, "Ignoring unrecognized field");
            continue;
        };
        let amount = value
            .as_f64()
            .ok_or_else(|| ApiError::Validation(format!("Amount for {currency} must be a number")))?;
        if amounts.iter().any(|(seen, _)| *seen == currency) {
            return Err(ApiError::Validation(format!(
                "Duplicate amount for {currency}"
            )));
        }
        amounts.push((currency, amount));
    }

    if amounts.is_empty() {
        return Err(ApiError::Validation(
            "No valid currency values provided".to_string(),
        ));
    }
    Ok(amounts)
}

/// GET `/amount/get` - Plain-text report of balances, cross rates and totals.
async fn get_report(State(state): State<AppState>) -> ApiResult<String> {
    let rates = fetch_with_timeout(state.rates.as_ref(), state.fetch_timeout).await?;
    let balances = state.store.snapshot().await;
    let report = Report::build(&balances, &rates, state.store.currencies());
    Ok(report.to_string())
}

/// GET `/{currency}/get` - Balance of one currency.
async fn get_currency(
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> ApiResult<Json<CurrencyAmount>> {
    let currency = state.store.currencies().resolve(&currency)?;
    let value = state.store.get(&currency).await;
    Ok(Json(CurrencyAmount {
        name: currency.to_upper(),
        value,
    }))
}

/// POST `/amount/set` - Overwrite balances.
async fn set_amounts(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<StatusResponse>> {
    debug!(?payload, "Set request");
    let amounts = recognized_amounts(payload, state.store.currencies())?;
    state
        .store
        .set_many(amounts.iter().map(|(c, amount)| (c, *amount)))
        .await;
    Ok(Json(SUCCESS))
}

/// POST `/modify` - Apply deltas to balances in one step.
async fn modify_amounts(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<StatusResponse>> {
    debug!(?payload, "Modify request");
    let changes = recognized_amounts(payload, state.store.currencies())?;
    state
        .store
        .modify(changes.iter().map(|(c, delta)| (c, *delta)))
        .await;
    Ok(Json(SUCCESS))
}
