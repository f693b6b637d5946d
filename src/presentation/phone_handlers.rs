// HTTP request handlers for phone number lookups
use crate::application::phone_lookup::PhoneLookupService;
use crate::domain::phone::PhoneInfo;
use crate::presentation::app_state::AppState;
use crate::presentation::http_response::{text_response, ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use std::sync::Arc;

fn service(state: &AppState) -> ApiResult<&PhoneLookupService> {
    state
        .phone
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Phone lookup"))
}

pub async fn lookup_phone(
    Path(number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PhoneInfo>> {
    let info = service(&state)?.lookup(&number).await?;
    Ok(Json(info))
}

/// Same lookup as a text report ("Error: ..." on failure)
pub async fn lookup_phone_report(
    Path(number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let report = match service(&state)?.lookup(&number).await {
        Ok(info) => info.report(),
        Err(e) => format!("Error: {e}"),
    };
    Ok(text_response(report))
}
