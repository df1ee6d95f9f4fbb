//! Standard-library-style logging calls on top of [slog](https://github.com/slog-rs/slog).
//!
//! The [`facade`] functions (`info`, `printf`, `fatal`, `panic`, ...) forward
//! to a process-wide engine that can be rebuilt from a TOML document at any
//! time. Records are attributed to the line that called the facade.
//!
//! # Examples
//!
//! Logs through the default engine (synchronous, stdout):
//!
//! ```
//! use stdlog_shim::{infof, facade};
//!
//! facade::info(&[&"Hello ", &"World!"]);
//! infof!("{} + {} = {}", 1, 2, 1 + 2);
//! ```
//!
//! Replaces the engine from configuration text (TOML):
//!
//! ```
//! stdlog_shim::set_logger_config(r#"
//! type = "async"
//! level = "debug"
//! formatid = "main"
//!
//! [formats]
//! main = "%Date %Time [%LEV] %File:%Line %Msg"
//!
//! [[outputs]]
//! type = "console"
//! destination = "stderr"
//! "#);
//!
//! stdlog_shim::warn(&[&"disk almost full"]);
//! stdlog_shim::flush();
//! ```
//!
//! Builds an engine in code and installs it:
//!
//! ```
//! use stdlog_shim::{Build, LoggerBuilder};
//! use stdlog_shim::file::FileOutputBuilder;
//! use stdlog_shim::types::Severity;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("app.log");
//! let mut output = FileOutputBuilder::new(&path);
//! output.rotate_size(1024 * 1024).levels(&[Severity::Error, Severity::Critical]);
//!
//! let engine = LoggerBuilder::new().output(output).build().unwrap();
//! stdlog_shim::replace_logger(engine).unwrap();
//! ```
#![warn(missing_docs)]
#[macro_use]
extern crate trackable;

pub use build::{Build, BuildOutput, Engine, LoggerBuilder, OutputBuilder, WriterOutputBuilder};
pub use callsite::CallSite;
pub use config::{Config, LoggerConfig, OutputConfig, DEFAULT_CONFIG};
pub use error::{Error, ErrorKind};
pub use facade::{
    critical, criticalf, debug, debugf, error, errorf, fatal, fatalf, flush, info, infof,
    log_level_from_string, logger_from_config_as_bytes, logger_from_config_as_file,
    logger_from_config_as_string, logger_from_writer_with_min_level, panic, panicf, print,
    printf, println, replace_logger, set_logger_config, trace, tracef, try_set_logger_config,
    use_logger, warn, warnf, FATAL_EXIT_CODE, PANIC_MESSAGE,
};

pub mod callsite;
pub mod facade;
pub mod file;
pub mod format;
pub mod null;
pub mod stdlog;
pub mod terminal;
pub mod types;

mod build;
mod config;
mod dispatch;
mod error;
mod macros;
mod misc;

/// A specialized `Result` type for this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
