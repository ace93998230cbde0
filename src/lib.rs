pub mod analysis;
pub mod config;
pub mod error;
pub mod monitor;
pub mod report;
pub mod system;
pub mod telemetry;
