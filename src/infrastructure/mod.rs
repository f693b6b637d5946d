// Infrastructure layer - External dependencies and adapters
pub mod chart_board;
pub mod config;
pub mod csv_store;
pub mod google_sheets;
pub mod smtp_mailer;
pub mod twilio_lookup;
