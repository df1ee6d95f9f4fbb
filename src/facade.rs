//! Standard-library-style logging functions backed by a swappable engine.
//!
//! Every function here forwards to the engine that is active at the time of
//! the call. The engine starts out as the one described by
//! [`DEFAULT_CONFIG`](crate::DEFAULT_CONFIG) and can be replaced at any time.
//!
//! The source location of a record is the location of the call into this
//! module: the functions are `#[track_caller]`, and the `*f!` macros capture
//! their invocation site together with the enclosing function name.
//!
//! ```
//! use stdlog_shim::facade;
//!
//! facade::info(&[&"listening on port ", &8080]);
//! stdlog_shim::warnf!("{} retries left", 3);
//! facade::flush();
//! ```
use crate::build::{Build, Engine, LoggerBuilder, WriterOutputBuilder};
use crate::callsite::CallSite;
use crate::config::{Config, LoggerConfig};
use crate::format;
use crate::types::{FacadeLevel, Severity};
use crate::{ErrorKind, Result};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::fmt::{self, Display};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// The payload of the panics raised by [`panic`], [`panicf`] and [`set_logger_config`].
pub const PANIC_MESSAGE: &str = "stdlog-shim: panic requested, see the last CRITICAL log record";

/// The exit status used by [`fatal`] and [`fatalf`].
pub const FATAL_EXIT_CODE: i32 = 1;

static ACTIVE: Lazy<ArcSwap<Engine>> = Lazy::new(|| {
    Lazy::force(&format::START);
    let engine = LoggerConfig::default().build_logger().unwrap_or_else(|e| {
        eprintln!("stdlog-shim: cannot build the default logger, discarding records: {}", e);
        Engine::discard()
    });
    ArcSwap::from_pointee(engine)
});

/// Logs a record at `level`, attributed to `site`.
#[doc(hidden)]
pub fn log_at(level: FacadeLevel, site: &CallSite, args: fmt::Arguments) {
    ACTIVE.load().log(level.severity(), site, args);
}

/// Logs an ERROR record attributed to `site`, flushes, then exits the process.
#[doc(hidden)]
pub fn fatal_at(site: &CallSite, args: fmt::Arguments) -> ! {
    log_at(FacadeLevel::Fatal, site, args);
    flush();
    std::process::exit(FATAL_EXIT_CODE)
}

/// Logs a CRITICAL record attributed to `site`, flushes, then panics with [`PANIC_MESSAGE`].
#[doc(hidden)]
pub fn panic_at(site: &CallSite, args: fmt::Arguments) -> ! {
    log_at(FacadeLevel::Panic, site, args);
    flush();
    std::panic::panic_any(PANIC_MESSAGE)
}

// Operands written back to back, with no separator.
struct Concat<'a>(&'a [&'a dyn Display]);
impl<'a> Display for Concat<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for part in self.0 {
            part.fmt(f)?;
        }
        Ok(())
    }
}

// Operands separated by single spaces, followed by a newline.
struct Line<'a>(&'a [&'a dyn Display]);
impl<'a> Display for Line<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            part.fmt(f)?;
        }
        f.write_str("\n")
    }
}

macro_rules! leveled {
    ($(#[doc = $doc:expr] $name:ident, $namef:ident => $level:ident;)*) => {
        $(
            #[doc = $doc]
            ///
            /// The operands are written back to back. Unlike Go's `fmt.Sprint`,
            /// no space is inserted between two non-string operands:
            /// `info(&[&1, &2])` logs `12`. Use [`println`] or the formatted
            /// variant to control separators.
            #[track_caller]
            pub fn $name(parts: &[&dyn Display]) {
                log_at(FacadeLevel::$level, &CallSite::caller(), format_args!("{}", Concat(parts)));
            }

            #[doc = $doc]
            #[track_caller]
            pub fn $namef(args: fmt::Arguments) {
                log_at(FacadeLevel::$level, &CallSite::caller(), args);
            }
        )*
    };
}

leveled! {
    /// Logs at TRACE.
    trace, tracef => Trace;
    /// Logs at DEBUG.
    debug, debugf => Debug;
    /// Logs at INFO.
    info, infof => Info;
    /// Logs at WARN.
    warn, warnf => Warn;
    /// Logs at ERROR.
    error, errorf => Error;
    /// Logs at CRITICAL.
    critical, criticalf => Critical;
    /// Logs at INFO.
    print, printf => Print;
}

/// Logs the operands separated by spaces and followed by a newline, at INFO.
#[track_caller]
pub fn println(parts: &[&dyn Display]) {
    log_at(FacadeLevel::Print, &CallSite::caller(), format_args!("{}", Line(parts)));
}

/// Logs at ERROR, flushes the active engine and exits with [`FATAL_EXIT_CODE`].
#[track_caller]
pub fn fatal(parts: &[&dyn Display]) -> ! {
    fatal_at(&CallSite::caller(), format_args!("{}", Concat(parts)))
}

/// Formatted variant of [`fatal`].
#[track_caller]
pub fn fatalf(args: fmt::Arguments) -> ! {
    fatal_at(&CallSite::caller(), args)
}

/// Logs at CRITICAL, flushes the active engine and panics with [`PANIC_MESSAGE`].
///
/// ```should_panic
/// stdlog_shim::facade::panic(&[&"disk is gone"]);
/// ```
#[track_caller]
pub fn panic(parts: &[&dyn Display]) -> ! {
    panic_at(&CallSite::caller(), format_args!("{}", Concat(parts)))
}

/// Formatted variant of [`panic`].
#[track_caller]
pub fn panicf(args: fmt::Arguments) -> ! {
    panic_at(&CallSite::caller(), args)
}

/// Replaces the active engine with one built from a TOML document.
///
/// If the document cannot be parsed or built, a CRITICAL record naming the
/// document and the error is logged to the engine that stays active, and the
/// call panics with [`PANIC_MESSAGE`].
#[track_caller]
pub fn set_logger_config(config: &str) {
    let site = CallSite::caller();
    if let Err(e) = try_set_logger_config(config) {
        panic_at(
            &site,
            format_args!(
                "Can not replace default logger with new config: {}: {}",
                config, e
            ),
        );
    }
}

/// Replaces the active engine with one built from a TOML document, returning
/// the error instead of panicking.
pub fn try_set_logger_config(config: &str) -> Result<()> {
    let engine = track!(logger_from_config_as_string(config))?;
    track!(replace_logger(engine))
}

/// Installs `engine` as the active engine.
///
/// The previous engine is not flushed here; it delivers the rest of its
/// records when the last reference to it is dropped.
pub fn use_logger(engine: Engine) -> Result<()> {
    track_assert!(!engine.is_closed(), ErrorKind::Invalid, "Engine is closed");
    ACTIVE.store(Arc::new(engine));
    Ok(())
}

/// Installs `engine` as the active engine and flushes the previous one.
pub fn replace_logger(engine: Engine) -> Result<()> {
    track_assert!(!engine.is_closed(), ErrorKind::Invalid, "Engine is closed");
    let old = ACTIVE.swap(Arc::new(engine));
    old.flush();
    Ok(())
}

/// Blocks until every record logged so far has reached the outputs of the active engine.
pub fn flush() {
    ACTIVE.load().flush();
}

/// Builds an engine from a TOML document.
pub fn logger_from_config_as_string(config: &str) -> Result<Engine> {
    let config = track!(LoggerConfig::from_toml(config))?;
    track!(config.build_logger())
}

/// Builds an engine from a TOML document given as bytes.
pub fn logger_from_config_as_bytes(config: &[u8]) -> Result<Engine> {
    let config = track!(LoggerConfig::from_toml_bytes(config))?;
    track!(config.build_logger())
}

/// Builds an engine from a TOML file.
pub fn logger_from_config_as_file<P: AsRef<Path>>(path: P) -> Result<Engine> {
    let path = path.as_ref();
    let config = track!(LoggerConfig::from_toml_file(path), "path={:?}", path)?;
    track!(config.build_logger())
}

/// Builds a synchronous engine writing records at or above `level` to
/// `writer`, with the default format.
pub fn logger_from_writer_with_min_level<W>(writer: W, level: Severity) -> Result<Engine>
where
    W: io::Write + Send + 'static,
{
    track!(LoggerBuilder::new()
        .level(level)
        .output(WriterOutputBuilder::new(writer))
        .build())
}

/// Looks up a severity by name (`warn` and `warning` are both accepted).
pub fn log_level_from_string(level: &str) -> Option<Severity> {
    level.parse().ok()
}
