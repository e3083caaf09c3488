mod assets;
mod client;
mod client_app;
mod config;
mod shared;
mod time;
mod window;

use crate::client_app::ClientApp;
use crate::config::AppConfig;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Directory holding `assets/`: next to the executable, else the crate root under cargo.
fn resource_root() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_owned));
    match exe_dir {
        Some(dir) if dir.join("assets").is_dir() => dir,
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
    }
}

fn main() -> ExitCode {
    // Initialize game start timestamp.
    lazy_static::initialize(&time::TIMESTAMP);

    init_tracing();

    // Get resource directory.
    static PATH: Lazy<PathBuf> = Lazy::new(resource_root);

    let result = AppConfig::from_env(&PATH)
        .map_err(Into::into)
        .and_then(ClientApp::launch);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fatal");
            ExitCode::FAILURE
        }
    }
}
