//! Forwarding of `log` crate records to the active engine.
use crate::callsite::CallSite;
use crate::facade;
use crate::types::FacadeLevel;
use crate::Result;

struct LogCrateLogger;
impl log::Log for LogCrateLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let site = CallSite::new(
            record.file_static().unwrap_or(""),
            record.line().unwrap_or(0),
            0,
            record.module_path_static().unwrap_or(""),
            "",
        );
        facade::log_at(level(record.level()), &site, *record.args());
    }

    fn flush(&self) {
        facade::flush();
    }
}

fn level(level: log::Level) -> FacadeLevel {
    match level {
        log::Level::Error => FacadeLevel::Error,
        log::Level::Warn => FacadeLevel::Warn,
        log::Level::Info => FacadeLevel::Info,
        log::Level::Debug => FacadeLevel::Debug,
        log::Level::Trace => FacadeLevel::Trace,
    }
}

/// Makes `log::info!` and friends write to the active engine.
///
/// The maximum `log` level is set to `Trace`; the engine applies its own level.
/// Fails if a `log` logger is already installed.
///
/// # Examples
///
/// ```
/// stdlog_shim::stdlog::init().unwrap();
/// log::info!("forwarded");
/// ```
pub fn init() -> Result<()> {
    static LOGGER: LogCrateLogger = LogCrateLogger;
    track!(log::set_logger(&LOGGER).map_err(crate::Error::from))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
