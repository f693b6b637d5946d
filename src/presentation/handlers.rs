// HTTP request handlers for the progress chart and its refresh loop
use crate::presentation::app_state::AppState;
use crate::presentation::chart_view::{chart_to_dto, render_text, status_to_dto, ChartDto, StatusDto};
use crate::presentation::http_response::{text_response, ApiError, ApiResult};
use axum::{extract::State, http::StatusCode, response::Response, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn no_chart(state: &AppState) -> ApiError {
    match state.refresh.status().last_error {
        Some(error) => ApiError::not_found(format!("No chart has been drawn yet: {error}")),
        None => ApiError::not_found("No chart has been drawn yet"),
    }
}

/// Current chart as JSON
pub async fn get_chart(State(state): State<Arc<AppState>>) -> ApiResult<Json<ChartDto>> {
    let drawn = state.board.snapshot().ok_or_else(|| no_chart(&state))?;
    Ok(Json(chart_to_dto(drawn)))
}

/// Current chart as a plain-text bar chart
pub async fn get_chart_text(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let drawn = state.board.snapshot().ok_or_else(|| no_chart(&state))?;
    Ok(text_response(render_text(&drawn.chart)))
}

pub async fn refresh_status(State(state): State<Arc<AppState>>) -> Json<StatusDto> {
    Json(status_to_dto(state.refresh.status(), state.board.draws()))
}

/// The "Refresh" button
pub async fn refresh_now(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    if state.refresh.refresh_now() {
        tracing::info!("Refresh requested over HTTP");
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(ApiError::not_found("Refresh loop has stopped"))
    }
}

/// The "Exit" button: stop the loop, then the server
pub async fn exit(State(state): State<Arc<AppState>>) -> StatusCode {
    tracing::info!("Exit requested");
    state.refresh.exit().await;
    state.shutdown.notify_one();
    StatusCode::ACCEPTED
}
