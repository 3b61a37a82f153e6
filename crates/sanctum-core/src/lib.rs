//! Sanctum core library (backend clients, auth flow, data façade, setup, config).

pub mod auth_flow;
pub mod backend;
pub mod config;
pub mod database;
pub mod interrupt;
pub mod logging;
pub mod models;
pub mod session;
pub mod setup;
pub mod validation;
