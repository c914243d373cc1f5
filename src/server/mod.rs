//! HTTP server receiving webhooks and serving the build history.

pub mod api;
pub mod app;
pub mod errors;
pub mod tracing;
pub mod views;
