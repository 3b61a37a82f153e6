//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod data;
pub mod probe;
pub mod tui;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use sanctum_core::auth_flow::AuthFlow;
use sanctum_core::backend::AuthClient;
use sanctum_core::config::{Config, paths};
use sanctum_core::database::DatabaseService;
use sanctum_core::session::{SessionContext, SessionStore};

/// Auth flow and data façade sharing one session context.
pub(crate) fn services(config: &Config) -> (AuthFlow, DatabaseService) {
    let endpoint = config.endpoint();
    let session = SessionContext::new();
    let store = SessionStore::new(paths::session_path());
    let auth = AuthFlow::new(AuthClient::new(endpoint.clone()), session.clone(), store);
    let db = DatabaseService::from_endpoint(endpoint, session);
    (auth, db)
}

/// Reads the passphrase from the first line of stdin.
pub(crate) fn read_passphrase() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read passphrase from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
