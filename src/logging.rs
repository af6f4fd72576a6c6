// logging.rs
// Log backend for the announcer: routes the `log` macros to timestamped lines

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::terminal;

struct TimestampLogger;

static LOGGER: TimestampLogger = TimestampLogger;

fn level_str(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Format a log line with timestamp
pub fn format_line(level: Level, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("{} - {} - {}", timestamp, level_str(level), message)
}

impl Log for TimestampLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        // Errors go to stderr so they survive stdout redirection
        if record.level() == Level::Error {
            terminal::emit_err(&line);
        } else {
            terminal::emit(&line);
        }
    }

    fn flush(&self) {}
}

/// Parse a level name, falling back to `info`
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::Info)
}

/// Install the logger and set the level. Later calls only change the level.
pub fn init(level: &str) {
    // Already installed on repeat calls
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(parse_level(level));
}
