// Domain layer - Plain data types and the pure rules that act on them
pub mod agent;
pub mod chart;
pub mod email;
pub mod error;
pub mod phone;
pub mod record;
