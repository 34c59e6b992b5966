use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

/// `logs/` next to the executable, or `target/logs` when that cannot be resolved
fn log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("target").join("logs"))
}

/// Initializes tracing.
///
/// Logs go to:
/// - stdout (with colors)
/// - logs/backend.log next to the executable (without colors)
///
/// `RUST_LOG` overrides the default filter.
pub fn initialize() -> anyhow::Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        anyhow::anyhow!("Cannot create log directory {}: {}", log_dir.display(), e)
    })?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| anyhow::anyhow!("Cannot open log file {}: {}", log_file_path.display(), e))?;

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    tracing::info!(
        "Logging to {} (filter: {})",
        log_file_path.display(),
        log_level
    );
    Ok(())
}
