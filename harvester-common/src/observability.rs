//! Logging setup for the binary and integration tests.
//!
//! Every run writes into a daily rolling file. The CLI also mirrors events to
//! `stderr`, which keeps diagnostics apart from the listing on `stdout`, and
//! keeps that mirror even when the log directory is unusable.
//! Call [`init_logging`] once near process start; later calls only hand back
//! the log file path resolved by the first one.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

const LOG_DIR_ENV: &str = "HARVESTER_LOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used for the default directory and the file name.
    pub app_name: &'static str,
    /// Explicit log directory. Otherwise `HARVESTER_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to `stderr`.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "harvester",
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Install the global subscriber.
///
/// Returns today's log file path, or `None` when the file sink could not be
/// opened and events only reach `stderr`. Without `emit_stderr` a file sink
/// failure is an error.
pub fn init_logging(config: LogConfig) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = log_dir(config.app_name, config.log_dir.as_deref());
    let file_name = format!("{}.log", config.app_name);
    let file = match open_file_sink(&dir, &file_name) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Ok(writer)
        }
        Err(e) if config.emit_stderr => Err(e),
        Err(e) => return Err(e),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    // At most one file layer is active; the stderr layer follows the same format.
    let json = config.format == LogFormat::Json;
    let stderr = config.emit_stderr;
    let writer = file.as_ref().ok().cloned();
    let file_text = writer
        .clone()
        .filter(|_| !json)
        .map(|w| fmt::layer().with_writer(w).with_ansi(false));
    let file_json = writer.filter(|_| json).map(|w| fmt::layer().json().with_writer(w));
    let stderr_text =
        (stderr && !json).then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));
    let stderr_json = (stderr && json).then(|| fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_text)
        .with(file_json)
        .with(stderr_text)
        .with(stderr_json)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = match file {
        Ok(_) => Some(dir.join(format!("{file_name}.{}", Local::now().format("%Y-%m-%d")))),
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %format!("{e:#}"),
                "file logging disabled"
            );
            None
        }
    };
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn open_file_sink(dir: &Path, file_name: &str) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("failed to open log file in {}", dir.display()))
}

/// Pick the log directory, expanding a leading `~` against `$HOME`.
fn log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    let home = std::env::var_os("HOME").map(PathBuf::from);

    match (chosen, home) {
        (Some(dir), Some(home)) => match dir.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => dir,
        },
        (Some(dir), None) => dir,
        (None, Some(home)) => home.join(".local").join("share").join(app_name),
        (None, None) => PathBuf::from(app_name),
    }
}
