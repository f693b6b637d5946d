// Presentation layer - HTTP surface
pub mod app_state;
pub mod chart_view;
pub mod email_handlers;
pub mod handlers;
pub mod http_response;
pub mod phone_handlers;
pub mod table_handlers;
