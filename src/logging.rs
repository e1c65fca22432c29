use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable naming a log file; overrides `logging.file`.
pub const LOG_FILE_ENV: &str = "ENTROPY_CORE_LOG";

/// Initialize tracing.
///
/// The filter comes from `RUST_LOG`, falling back to `config.level`. Output
/// goes to the file named by `ENTROPY_CORE_LOG` or `config.file` when set,
/// stderr otherwise. Calling this more than once is harmless.
///
/// Log files get unique names (`{path}.{timestamp}.{pid}`) so concurrent runs
/// never clobber each other.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_path = std::env::var(LOG_FILE_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| config.file.clone());

    let result = match log_path {
        Some(path) => {
            let path = unique_log_path(&path);
            let file = match std::fs::File::create(&path) {
                Ok(file) => file,
                Err(err) => {
                    eprintln!(
                        "Warning: Failed to create log file {}: {}",
                        path.display(),
                        err
                    );
                    return;
                }
            };
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// `{path}.{timestamp}.{pid}`, with the timestamp in seconds since the epoch.
fn unique_log_path(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", path.display(), timestamp, pid))
}
