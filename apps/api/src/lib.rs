//! League Signup API Library
//!
//! Sports league registration: leagues and divisions, teams and their
//! captains, free agents and team invitations, paid registrations through
//! hosted checkout, and per-league registration forms.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "league_signup_api=info,tower_http=info";

/// Installs the global fmt subscriber; safe to call more than once
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
