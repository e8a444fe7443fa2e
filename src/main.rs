//! Code & Logic Teacher · Backend
//!
//! - Axum HTTP + WebSocket API over a small lesson registry
//! - Runs learner code in a child interpreter process with a timeout
//! - Grades submissions against each lesson's (expression, expected) tests
//! - Static front end fallback (./static/index.html)
//!
//! Submitted code runs with the privileges of this process. Only process
//! separation and a wall-clock timeout stand between it and the machine.
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   TEACHER_CONFIG_PATH : path to TOML config (executor settings + extra lessons)
//!   PYTHON_BIN          : interpreter override (default "python3")
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod config;
mod domain;
mod executor;
mod grader;
mod literal;
mod logic;
mod protocol;
mod routes;
mod seeds;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::executor::UNSAFE_WARNING;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::new());
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([127, 0, 0, 1], port)))
    .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

  let listener = TcpListener::bind(addr).await?;
  warn!(target: "code_teacher", "{}", UNSAFE_WARNING);
  info!(target: "code_teacher", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
