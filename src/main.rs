// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post, put},
    Router,
};
use anyhow::Context;
use tokio::sync::{Mutex, Notify};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::email_campaign::MailTransport;
use crate::application::phone_lookup::PhoneLookupService;
use crate::application::refresh_loop::{RefreshContext, RefreshLoop};
use crate::application::table_service::TableService;
use crate::infrastructure::chart_board::ChartBoard;
use crate::infrastructure::config::{load_tracker_config, DEFAULT_CONFIG_PATH};
use crate::infrastructure::csv_store::CsvTableStore;
use crate::infrastructure::google_sheets::GoogleSheetsRepository;
use crate::infrastructure::smtp_mailer::SmtpMailer;
use crate::infrastructure::twilio_lookup::TwilioLookup;
use crate::presentation::app_state::AppState;
use crate::presentation::email_handlers::{current_draft, send_current, skip_current, start_campaign};
use crate::presentation::handlers::{exit, get_chart, get_chart_text, health_check, refresh_now, refresh_status};
use crate::presentation::phone_handlers::{lookup_phone, lookup_phone_report};
use crate::presentation::table_handlers::{
    edit_cell, edit_row, save_table, search_report, search_table, view_table,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_tracker_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;
    tracing::info!(
        "Tracking {} sources from {} to {}",
        config.sources.len(),
        config.date_window.start,
        config.date_window.end
    );

    // Create adapters (infrastructure layer)
    let sheets = Arc::new(GoogleSheetsRepository::new(
        config.sheets.api_base.clone(),
        config.sheets.api_key.clone(),
        config.sheets.access_token.clone(),
        config.sheets.timeout(),
    )?);
    let board = Arc::new(ChartBoard::new());

    let table = match &config.table {
        Some(table_cfg) => Some(Mutex::new(TableService::open(
            &table_cfg.path,
            Arc::new(CsvTableStore::new()),
            table_cfg.display_columns.clone(),
        )?)),
        None => None,
    };

    let mailer: Option<Arc<dyn MailTransport>> = match &config.sender {
        Some(credential) => {
            let mailer: Arc<dyn MailTransport> = Arc::new(SmtpMailer::new(credential)?);
            Some(mailer)
        }
        None => {
            tracing::warn!("No sender configured; email sending is disabled");
            None
        }
    };

    let phone = match &config.lookup {
        Some(lookup) => Some(PhoneLookupService::new(
            Arc::new(TwilioLookup::new(
                lookup.base_url.clone(),
                lookup.account_sid.clone(),
                lookup.auth_token.clone(),
                lookup.timeout(),
            )?),
            lookup.default_country_code.clone(),
        )),
        None => None,
    };

    // Start the refresh loop (application layer)
    let (refresh_loop, refresh) =
        RefreshLoop::new(RefreshContext::from_config(&config), sheets, board.clone());
    let loop_task = tokio::spawn(refresh_loop.run());

    // Create application state
    let shutdown = Arc::new(Notify::new());
    let state = Arc::new(AppState {
        board,
        refresh: refresh.clone(),
        shutdown: shutdown.clone(),
        table,
        campaign: Mutex::new(None),
        campaign_settings: config.campaign.clone(),
        mailer,
        phone,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/chart", get(get_chart))
        .route("/chart/text", get(get_chart_text))
        .route("/refresh", post(refresh_now))
        .route("/refresh/status", get(refresh_status))
        .route("/exit", post(exit))
        .route("/table", get(view_table))
        .route("/table/search", get(search_table))
        .route("/table/search/report", get(search_report))
        .route("/table/rows/:row", put(edit_row))
        .route("/table/rows/:row/cells", put(edit_cell))
        .route("/table/save", post(save_table))
        .route("/emails/campaign", post(start_campaign))
        .route("/emails/current", get(current_draft))
        .route("/emails/current/send", post(send_current))
        .route("/emails/current/skip", post(skip_current))
        .route("/phone/:number", get(lookup_phone))
        .route("/phone/:number/report", get(lookup_phone_report))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting sales-progress service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown.notified() => {}
                _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
            }
        })
        .await?;

    refresh.exit().await;
    loop_task.await.context("Refresh loop panicked")?;
    tracing::info!("Stopped");

    Ok(())
}
