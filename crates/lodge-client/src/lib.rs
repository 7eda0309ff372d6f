pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod nav;
pub mod notify;
pub mod session;
pub mod state;
pub mod views;

use tracing_subscriber::{fmt, EnvFilter};

pub use crate::api::{ApiClient, Outcome};
pub use crate::config::ClientConfig;
pub use crate::error::{ApiError, ClientError};
pub use crate::state::AppState;

/// Install the global tracing subscriber. Logs go to stderr so they never
/// mix with command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lodge_client_lib=info,lodge_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
