pub mod config;
pub mod error;
pub mod parking;
pub mod telemetry;
