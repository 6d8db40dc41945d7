// Domain layer - Telemetry data model and pure transforms
pub mod cycle;
pub mod device;
pub mod downsample;
pub mod error;
pub mod events;
pub mod history;
pub mod link;
pub mod sample;
pub mod time_axis;
pub mod view;
pub mod window;
