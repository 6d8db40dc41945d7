// Presentation layer - Local view API
pub mod app_state;
pub mod handlers;
