//! Tracing setup for the `tabula` binary
//!
//! Stdout carries command output only; diagnostics go to stderr and to a
//! daily JSON log file. `RUST_LOG` wins over the built-in filters.

use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "tabula.log";
const QUIET_FILTER: &str = "warn,tabula_app=info,tabula_services=info,tabula_registry=info";
const VERBOSE_FILTER: &str = "info,tabula_app=debug,tabula_services=debug,tabula_registry=debug,tabula_table_editor=debug,tabula_settings=debug";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// JSON log files land here; `None` disables file logging
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr
    pub console: bool,
    /// Debug-level tabula targets, span open/close events, source locations
    pub verbose: bool,
}

impl LoggingConfig {
    /// `--verbose` shows events on stderr, otherwise only the log file is written
    pub fn for_cli(verbose: bool) -> Self {
        Self {
            log_dir: Some(log_directory()),
            console: verbose,
            verbose,
        }
    }

    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose { VERBOSE_FILTER } else { QUIET_FILTER })
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.verbose {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let mut layers = Vec::new();

    if config.console {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(config.verbose)
                .with_line_number(config.verbose)
                .with_span_events(config.span_events())
                .pretty()
                .with_filter(config.filter())
                .boxed(),
        );
    }

    if let Some(ref log_dir) = config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));
        // Dropping the guard stops the writer thread
        std::mem::forget(guard);

        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(config.span_events())
                .with_current_span(true)
                .with_filter(config.filter())
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    tracing::debug!(?config, "logging ready");
    Ok(())
}

/// The settings log directory, or `./logs` when no data directory exists
pub fn log_directory() -> PathBuf {
    tabula_settings::log_dir().unwrap_or_else(|_| PathBuf::from("logs"))
}
