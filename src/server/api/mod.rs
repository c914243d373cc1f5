//! This module contains the HTTP endpoints for the server.
pub mod builds;
pub mod routes;
pub mod state;
pub mod webhook;
