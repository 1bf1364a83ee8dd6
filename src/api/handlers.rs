// src/api/handlers.rs

use crate::api::{types::*, ApiState};
use crate::memory::HistoryLimit;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// POST /ask — Fan the question out to both sources and merge the answers.
pub async fn ask(State(state): State<ApiState>, Json(body): Json<AskRequest>) -> Json<AskResponse> {
    if body.model1.is_some() || body.model2.is_some() || body.use_judge.is_some() {
        tracing::debug!("ignoring per-request model/judge overrides");
    }

    match state.pipeline.aggregate(&body.question).await {
        Ok(report) => Json(AskResponse::from(&report)),
        Err(e) => {
            tracing::warn!("aggregation failed: {e}");
            Json(AskResponse::Error {
                error: e.to_string(),
            })
        }
    }
}

/// GET /stats — Per-model request counts and latencies.
pub async fn stats(State(state): State<ApiState>) -> Result<Json<StatsResponse>, ApiError> {
    let summary = state
        .pipeline
        .history()
        .statistics()
        .await
        .map_err(internal_error)?;
    Ok(Json(StatsResponse::from(&summary)))
}

/// GET /history?limit=N — Most recent records, newest first.
pub async fn history(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let requested = query
        .limit
        .unwrap_or(state.history.default_limit as i64);
    let limit = HistoryLimit::new(requested, state.history.max_limit).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let records = state
        .pipeline
        .history()
        .recent(limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(HistoryResponse {
        history: records.iter().map(HistoryEntry::from).collect(),
    }))
}

/// DELETE /clear — Drop all recorded history.
pub async fn clear(State(state): State<ApiState>) -> Result<Json<ClearResponse>, ApiError> {
    state
        .pipeline
        .history()
        .clear()
        .await
        .map_err(internal_error)?;
    Ok(Json(ClearResponse {
        message: "History was cleared".into(),
    }))
}

/// GET /info — Static service description.
pub async fn info(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(state.info.as_ref().clone())
}

/// GET /health — Simple health check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
