//! Logging setup with indicatif integration
//!
//! In TTY mode log lines are routed through the `MultiProgress` so they
//! never tear an active progress bar; in non-TTY mode a plain
//! `env_logger` with level labels is the only progress indicator.

use indicatif::MultiProgress;

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

/// Map the connector `verbose` knob to a default log filter.
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Logger that prints through an indicatif `MultiProgress`.
struct ProgressLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for ProgressLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let label = level_label(record.level());
            let color = level_color(record.level());
            let line = format!("[{color}{label}\x1b[0m] {}", record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging.
///
/// `RUST_LOG` overrides the verbosity-derived default either way.
pub fn init_logging(verbosity: u8, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let default_level = default_filter(verbosity);

    match multi {
        Some(multi) => {
            let logger = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(default_level),
            )
            .build();
            let max_level = logger.filter();
            let boxed = Box::new(ProgressLogger {
                inner: logger,
                multi: multi.clone(),
            });
            if log::set_boxed_logger(boxed).is_ok() {
                log::set_max_level(max_level);
            }
        }
        None => {
            // non-TTY: no ANSI colors
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(default_level),
            )
            .format(|buf, record| {
                writeln!(buf, "[{}] {}", level_label(record.level()), record.args())
            })
            .try_init();
        }
    }
}
