use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can log messages at various levels.
///
/// Hosts implement it to receive the core's log records. It is exported via `UniFFI`
/// so mobile and web hosts can route records into their own logging.
///
/// # Examples
///
/// ```rust
/// use mintkit_core::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// class MintKitLoggerBridge: MintKit.Logger {
///     static let shared = MintKitLoggerBridge()
///
///     func log(level: MintKit.LogLevel, message: String) {
///         Log.log(level.toCoreLevel(), message)
///     }
/// }
///
/// MintKit.setLogger(logger: MintKitLoggerBridge.shared) // once, at startup
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, extremely detailed messages.
    Trace,
    /// Lower priority debugging information.
    Debug,
    /// Progress of the application.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Failures the application recovers from.
    Error,
}

/// Forwards `log` records to the foreign `Logger`.
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded when they come from `mintkit` itself;
/// dependencies such as `reqwest` are chatty at those levels.
fn should_forward(level: log::Level, module_path: Option<&str>) -> bool {
    let is_from_mintkit = module_path.is_some_and(|path| path.starts_with("mintkit"));
    let is_debug_or_trace = level == log::Level::Debug || level == log::Level::Trace;
    !is_debug_or_trace || is_from_mintkit
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Call it once, before any logging occurs. Later calls keep the first logger and
/// print a notice instead.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        println!("Logger already set");
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingLogger {
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, level: LogLevel, message: String) {
            self.records.lock().unwrap().push((level, message));
        }
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(log::Level::Error), LogLevel::Error);
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Info), LogLevel::Info);
        assert_eq!(log_level(log::Level::Debug), LogLevel::Debug);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_debug_records_from_dependencies_are_dropped() {
        assert!(should_forward(log::Level::Debug, Some("mintkit_core::gate")));
        assert!(!should_forward(log::Level::Debug, Some("reqwest::connect")));
        assert!(!should_forward(log::Level::Trace, None));
        assert!(should_forward(log::Level::Warn, Some("hyper::proto")));
    }

    #[test]
    fn test_set_logger_forwards_records() {
        let logger = Arc::new(CapturingLogger::default());
        set_logger(logger.clone());

        log::warn!("supply refresh failed");

        let records = logger.records.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, message)| *level == LogLevel::Warn
                && message == "supply refresh failed"));
    }
}
