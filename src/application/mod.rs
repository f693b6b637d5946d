// Application layer - Use cases and the ports they depend on
pub mod aggregation;
pub mod chart_surface;
pub mod email_campaign;
pub mod phone_lookup;
pub mod refresh_loop;
pub mod sheet_source;
pub mod table_service;
pub mod table_store;
