// Application state for HTTP handlers
use crate::application::email_campaign::{EmailCampaign, MailTransport};
use crate::application::phone_lookup::PhoneLookupService;
use crate::application::refresh_loop::RefreshHandle;
use crate::application::table_service::TableService;
use crate::infrastructure::chart_board::ChartBoard;
use crate::infrastructure::config::CampaignConfig;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

pub struct AppState {
    pub board: Arc<ChartBoard>,
    pub refresh: RefreshHandle,
    pub shutdown: Arc<Notify>,
    pub table: Option<Mutex<TableService>>,
    pub campaign: Mutex<Option<EmailCampaign>>,
    pub campaign_settings: CampaignConfig,
    pub mailer: Option<Arc<dyn MailTransport>>,
    pub phone: Option<PhoneLookupService>,
}
