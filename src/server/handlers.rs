//! API request handlers

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::inference::CustomerRecord;
use super::error::{Result, ServerError};
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub status: &'static str,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let model = state.model().map(|m| {
        json!({
            "run_id": m.run_id(),
            "classifier": m.kind().to_string(),
            "trained_at": m.header().trained_at.to_rfc3339(),
        })
    });

    Json(json!({
        "status": "online",
        "model_loaded": state.is_model_loaded(),
        "version": env!("CARGO_PKG_VERSION"),
        "model": model,
    }))
}

/// Score one customer.
///
/// Availability is checked before the body, so an unloaded service answers
/// 503 even to malformed requests.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let model = state.model().ok_or(ServerError::ModelNotLoaded)?;
    let Json(record) = payload?;

    let prediction = tokio::task::spawn_blocking(move || model.predict(&record))
        .await
        .map_err(|e| ServerError::Internal(format!("Prediction task failed: {e}")))?
        .map_err(|e| ServerError::Prediction(e.to_string()))?;

    debug!(prediction = %prediction, "Prediction served");
    Ok(Json(PredictResponse {
        prediction,
        status: "success",
    }))
}
