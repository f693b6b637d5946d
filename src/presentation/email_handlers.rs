// HTTP request handlers for the email campaign walk
use crate::application::email_campaign::{CampaignProgress, EmailCampaign, SendOutcome};
use crate::domain::email::{DraftOverrides, EmailDraft};
use crate::presentation::app_state::AppState;
use crate::presentation::http_response::{ApiError, ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct DraftDto {
    pub row: usize,
    pub recipient_name: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressDto {
    pub position: usize,
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct CampaignDto {
    pub finished: bool,
    pub message: Option<String>,
    pub current: Option<DraftDto>,
    pub progress: ProgressDto,
    pub last_send: Option<SendDto>,
}

#[derive(Debug, Serialize)]
pub struct SendDto {
    pub to: String,
    pub sent: bool,
    pub error: Option<String>,
}

/// Body of the send request; every field is optional and edits the draft
#[derive(Debug, Deserialize, Default)]
pub struct SendRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

fn draft_to_dto(draft: EmailDraft) -> DraftDto {
    DraftDto {
        row: draft.row,
        recipient_name: draft.recipient_name,
        to: draft.email.to,
        subject: draft.email.subject,
        body: draft.email.body,
    }
}

fn progress_to_dto(progress: CampaignProgress) -> ProgressDto {
    ProgressDto {
        position: progress.position,
        total: progress.total,
        sent: progress.sent,
        skipped: progress.skipped,
        failed: progress.failed,
    }
}

fn campaign_to_dto(campaign: &EmailCampaign, last_send: Option<SendOutcome>) -> CampaignDto {
    let finished = campaign.is_finished();
    CampaignDto {
        finished,
        message: finished.then(|| "Emails sent successfully!".to_string()),
        current: campaign.current().map(draft_to_dto),
        progress: progress_to_dto(campaign.progress()),
        last_send: last_send.map(|outcome| match outcome {
            SendOutcome::Sent { to } => SendDto {
                to,
                sent: true,
                error: None,
            },
            SendOutcome::Failed { to, error } => SendDto {
                to,
                sent: false,
                error: Some(error),
            },
        }),
    }
}

fn no_campaign() -> ApiError {
    ApiError::not_found("No email campaign has been started")
}

/// The "Send Emails" button: start a walk over the table's recipients
pub async fn start_campaign(State(state): State<Arc<AppState>>) -> ApiResult<Json<CampaignDto>> {
    let table = state
        .table
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Table"))?;
    let snapshot = table.lock().await.table().clone();
    let campaign = EmailCampaign::start(&snapshot, state.campaign_settings.clone())?;
    let dto = campaign_to_dto(&campaign, None);
    *state.campaign.lock().await = Some(campaign);
    Ok(Json(dto))
}

pub async fn current_draft(State(state): State<Arc<AppState>>) -> ApiResult<Json<CampaignDto>> {
    let guard = state.campaign.lock().await;
    let campaign = guard.as_ref().ok_or_else(no_campaign)?;
    Ok(Json(campaign_to_dto(campaign, None)))
}

pub async fn send_current(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SendRequest>>,
) -> ApiResult<Json<CampaignDto>> {
    let mailer = state
        .mailer
        .clone()
        .ok_or_else(|| ApiError::not_configured("Email sender"))?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let mut guard = state.campaign.lock().await;
    let campaign = guard.as_mut().ok_or_else(no_campaign)?;
    let overrides = DraftOverrides {
        to: request.to,
        subject: request.subject,
        body: request.body,
    };
    let outcome = campaign.send_current(mailer.as_ref(), overrides).await?;
    Ok(Json(campaign_to_dto(campaign, Some(outcome))))
}

pub async fn skip_current(State(state): State<Arc<AppState>>) -> ApiResult<Json<CampaignDto>> {
    let mut guard = state.campaign.lock().await;
    let campaign = guard.as_mut().ok_or_else(no_campaign)?;
    campaign.skip()?;
    Ok(Json(campaign_to_dto(campaign, None)))
}
