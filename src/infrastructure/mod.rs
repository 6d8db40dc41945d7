// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod control_client;
pub mod http_history;
pub mod notifier;
pub mod websocket_transport;
