pub mod common;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Ports (traits the pipeline depends on) and their production adapters
pub mod app;
pub mod infra;
