//! HTTP API: webhook intake, shared-secret guard and service wiring.

pub mod app;
pub mod config;
pub mod middleware;
