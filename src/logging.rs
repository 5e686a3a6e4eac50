use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directory for diagnostic logs, relative to the working directory.
pub const LOG_DIR: &str = "logs";

/// File name prefix of the daily log files.
pub const LOG_PREFIX: &str = "maika-mux";

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub dir: Utf8PathBuf,
    pub prefix: String,
    /// Use debug level instead of info
    pub debug: bool,
    /// Mirror diagnostics to the console
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from(LOG_DIR),
            prefix: LOG_PREFIX.to_string(),
            debug: false,
            console: false,
        }
    }
}

/// Level filter: `RUST_LOG` wins when set, otherwise info (or debug).
fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

fn ensure_log_dir(dir: &Utf8PathBuf) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir))?;
    }
    Ok(())
}

/// Setup logging with a daily rotating file and optional console output.
///
/// The mux report itself is printed by [`crate::ui::report`]; this log holds
/// diagnostics (commands run, exit codes, file moves).
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(options: &LogOptions) -> Result<WorkerGuard> {
    ensure_log_dir(&options.dir)?;

    let file_appender = rolling::daily(&options.dir, &options.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter(options.debug))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        options.dir,
        options.prefix,
        options.debug,
        options.console
    );

    Ok(guard)
}
