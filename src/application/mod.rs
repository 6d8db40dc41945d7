// Application layer - Session orchestration and the ports it drives
pub mod connection;
pub mod dashboard_session;
pub mod event_router;
pub mod history_repository;
pub mod notifier;
pub mod transport;

#[cfg(test)]
pub mod testing;
