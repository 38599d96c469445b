//! # Logger
//!
//! Log records go to the console and to the session's log file. Both carry
//! the time since the session epoch. The console copy has coloured level tags,
//! the file copy is plain text so it stays readable outside a terminal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Level, Record};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The log level must include `INFO` records, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error opening the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Cannot get the session epoch: {0}")]
    NoEpoch(session::SessionError),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be `Info`, `Debug` or `Trace`. Lifecycle messages are
/// logged at `Info` and a run without them can't be diagnosed.
///
/// Only the first call in a process can succeed, later ones return
/// `FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    session: &Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                RecordLine::new(record, message, level_tag(record.level()))
            ))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                RecordLine::new(record, message, level_str(record.level()).normal())
            ))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!(
        "    Session epoch: {}",
        session::get_epoch().map_err(LoggerInitError::NoEpoch)?
    );
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE
// ---------------------------------------------------------------------------

/// One formatted log line.
///
/// Records below `Info` are per-tick detail and also show the module that
/// emitted them.
struct RecordLine<'a> {
    elapsed_s: f64,
    tag: ColoredString,
    target: Option<&'a str>,
    message: &'a fmt::Arguments<'a>
}

impl<'a> RecordLine<'a> {
    fn new(record: &'a Record, message: &'a fmt::Arguments<'a>, tag: ColoredString) -> Self {
        Self {
            elapsed_s: session::get_elapsed_seconds(),
            tag,
            target: if record.level() > Level::Info { Some(record.target()) } else { None },
            message
        }
    }
}

impl<'a> fmt::Display for RecordLine<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:10.6} {}] ", self.elapsed_s, self.tag)?;

        if let Some(target) = self.target {
            write!(f, "{}: ", target)?;
        }

        write!(f, "{}", self.message)
    }
}

fn level_str(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

/// Coloured console tag for a log level
fn level_tag(level: Level) -> ColoredString {
    let tag = level_str(level);
    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_tags() {
        assert!(level_tag(Level::Warn).to_string().contains("WRN"));
        assert!(level_tag(Level::Error).to_string().contains("ERR"));
    }
}
