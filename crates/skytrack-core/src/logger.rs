//! Logging backends for the skytrack tools.
//!
//! The tracking loop reports one status line per frame through `log::info!`
//! and the detectors report candidate counts at `debug`. `init_with_level`
//! installs a stderr logger that shows those lines as
//! `[elapsed LEVEL crate] message` and keeps other crates (image decoders)
//! down to warnings.
//!
//! With the `tracing` feature, `init_tracing` installs a `tracing-subscriber`
//! instead. The detector stages carry `instrument` spans, and their close
//! events give per-stage timings for each frame. `RUST_LOG` overrides the
//! default directives.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const CRATE_PREFIX: &str = "skytrack";

/// Whether a record from `target` at `level` passes a `max` filter.
/// Targets outside the workspace are capped at `Warn`.
fn passes(target: &str, level: Level, max: LevelFilter) -> bool {
    if level > max {
        return false;
    }
    target.starts_with(CRATE_PREFIX) || level <= Level::Warn
}

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        passes(metadata.target(), metadata.level(), self.level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let origin = record.target().split("::").next().unwrap_or_default();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{elapsed:8.3}s {:>5} {origin}] {}",
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| FrameLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Default `EnvFilter` directives: workspace crates at `info` (`debug` when
/// verbose), everything else at `warn`.
#[cfg(feature = "tracing")]
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    ["skytrack", "skytrack_core", "skytrack_detect", "skytrack_kalman"]
        .iter()
        .fold(String::from("warn"), |acc, krate| {
            format!("{acc},{krate}={level}")
        })
}

/// Install a `tracing` subscriber that also receives `log` records.
///
/// `json` switches to one flattened JSON object per event, for piping run
/// logs into other tools. Fails if a global subscriber is already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(verbose: bool, json: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .finish()
            .try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .compact()
            .finish()
            .try_init()
    }
}
