//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Two sinks are installed:
//!
//! - the console layer on stderr (pretty, compact or json), filtered by the
//!   CLI verbosity flags or `RUST_LOG`;
//! - the progress log, an append-only file with one `<timestamp>,<message>`
//!   line per event at `info` and above. It is opened once per run and every
//!   line is flushed as it is written.
//!
//! # Log Levels
//!
//! - `error`: stage failures, with file name, table index or column
//! - `warn`: skipped credential lines, declined gates, rollbacks
//! - `info`: stage progress and counts
//! - `debug`: per-table details

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Timestamp layout of progress log lines (`2024-Jan-31-13:05:09`).
pub const PROGRESS_TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Console level when `RUST_LOG` is not consulted.
    pub level_filter: LevelFilter,
    /// Whether `RUST_LOG` may override `level_filter`.
    pub use_env_filter: bool,
    /// Whether to include target (module path) in console output.
    pub with_target: bool,
    /// Whether to use ANSI colors on the console.
    pub with_ansi: bool,
    /// Console output format.
    pub format: LogFormat,
    /// Progress log file; `None` disables it.
    pub progress_file: Option<PathBuf>,
}

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            progress_file: None,
        }
    }
}

impl LogConfig {
    /// Set the console level directly.
    #[must_use]
    pub fn with_level(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    /// Set console output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }

    /// Set the progress log path (disabled when None).
    #[must_use]
    pub fn with_progress_file(mut self, path: Option<PathBuf>) -> Self {
        self.progress_file = path;
        self
    }
}

/// Initialize the global tracing subscriber with the given configuration.
///
/// This should be called once at application startup.
///
/// # Errors
///
/// Returns an error if the progress log cannot be opened or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let progress = match &config.progress_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(SharedFileWriter::new(file))
        }
        None => None,
    };
    let filter = build_env_filter(config);

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(config.with_target)
                    .with_filter(filter),
            )
            .with(progress_layer(progress))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_writer(io::stderr)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .with_filter(filter),
            )
            .with(progress_layer(progress))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .without_time()
                    .with_writer(io::stderr)
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .with_filter(filter),
            )
            .with(progress_layer(progress))
            .try_init(),
    };
    result.map_err(io::Error::other)
}

/// File layer writing progress lines at `info` and above.
fn progress_layer<S>(writer: Option<SharedFileWriter>) -> Option<impl Layer<S>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    writer.map(|writer| {
        fmt::layer()
            .event_format(ProgressFormat)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(LevelFilter::INFO)
    })
}

/// Formats an event as `<timestamp>,<message and fields>`.
pub struct ProgressFormat;

impl<S, N> FormatEvent<S, N> for ProgressFormat
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "{},", Local::now().format(PROGRESS_TIMESTAMP_FORMAT))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write_all(buf)?;
        guard.flush()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Build the console filter, letting `RUST_LOG` override unless disabled.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(config.level_filter.into());
    if config.use_env_filter {
        builder.from_env_lossy()
    } else {
        builder.parse_lossy("")
    }
}
