//! Commonly used types.
use crate::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use slog::{Drain, Level, LevelFilter};
use std::str::FromStr;

/// The severity of a log record, as understood by the logging engine.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::types::Severity;
///
/// assert_eq!(Severity::default(), Severity::Info);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    Critical,
}
impl Severity {
    /// Converts `Severity` to `Level`.
    pub fn as_level(&self) -> Level {
        match *self {
            Severity::Trace => Level::Trace,
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warning => Level::Warning,
            Severity::Error => Level::Error,
            Severity::Critical => Level::Critical,
        }
    }

    /// Converts `Level` back to `Severity`.
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Trace => Severity::Trace,
            Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Warning => Severity::Warning,
            Level::Error => Severity::Error,
            Level::Critical => Severity::Critical,
        }
    }

    /// Sets `LevelFilter` to `drain`.
    pub fn set_level_filter<D: Drain>(&self, drain: D) -> LevelFilter<D> {
        LevelFilter::new(drain, self.as_level())
    }

    /// Upper-case name (`"ERROR"`).
    pub fn as_upper_str(&self) -> &'static str {
        match *self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Capitalized name (`"Error"`).
    pub fn as_title_str(&self) -> &'static str {
        match *self {
            Severity::Trace => "Trace",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warn",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    /// Three-letter upper-case name (`"ERR"`).
    pub fn as_short_upper_str(&self) -> &'static str {
        match *self {
            Severity::Trace => "TRC",
            Severity::Debug => "DBG",
            Severity::Info => "INF",
            Severity::Warning => "WRN",
            Severity::Error => "ERR",
            Severity::Critical => "CRT",
        }
    }

    /// Three-letter capitalized name (`"Err"`).
    pub fn as_short_title_str(&self) -> &'static str {
        match *self {
            Severity::Trace => "Trc",
            Severity::Debug => "Dbg",
            Severity::Info => "Inf",
            Severity::Warning => "Wrn",
            Severity::Error => "Err",
            Severity::Critical => "Crt",
        }
    }

    /// Single lower-case letter (`'e'`).
    pub fn as_char(&self) -> char {
        match *self {
            Severity::Trace => 't',
            Severity::Debug => 'd',
            Severity::Info => 'i',
            Severity::Warning => 'w',
            Severity::Error => 'e',
            Severity::Critical => 'c',
        }
    }
}
impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}
impl FromStr for Severity {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => track_panic!(ErrorKind::Invalid, "Undefined severity: {:?}", s),
        }
    }
}

/// The levels of the standard-library-style facade.
///
/// Every facade level is forwarded to exactly one engine [`Severity`]:
///
/// | facade | engine |
/// |---|---|
/// | `Print` | `Info` |
/// | `Fatal` | `Error` |
/// | `Panic` | `Critical` |
///
/// The remaining levels pass through unchanged.
///
/// # Examples
///
/// ```
/// use stdlog_shim::types::{FacadeLevel, Severity};
///
/// assert_eq!(FacadeLevel::Print.severity(), Severity::Info);
/// assert_eq!(FacadeLevel::Fatal.severity(), Severity::Error);
/// assert_eq!(FacadeLevel::Panic.severity(), Severity::Critical);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacadeLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
    Print,
    Fatal,
    Panic,
}
impl FacadeLevel {
    /// All facade levels.
    pub const ALL: [FacadeLevel; 9] = [
        FacadeLevel::Trace,
        FacadeLevel::Debug,
        FacadeLevel::Info,
        FacadeLevel::Warn,
        FacadeLevel::Error,
        FacadeLevel::Critical,
        FacadeLevel::Print,
        FacadeLevel::Fatal,
        FacadeLevel::Panic,
    ];

    /// Returns the engine severity this level is logged at.
    pub const fn severity(self) -> Severity {
        match self {
            FacadeLevel::Trace => Severity::Trace,
            FacadeLevel::Debug => Severity::Debug,
            FacadeLevel::Info | FacadeLevel::Print => Severity::Info,
            FacadeLevel::Warn => Severity::Warning,
            FacadeLevel::Error | FacadeLevel::Fatal => Severity::Error,
            FacadeLevel::Critical | FacadeLevel::Panic => Severity::Critical,
        }
    }
}

/// How records travel from the calling thread to the outputs.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::types::DispatchMode;
///
/// assert_eq!(DispatchMode::default(), DispatchMode::Sync);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Records are formatted and written on the calling thread.
    Sync,

    /// Records are handed to a background worker thread.
    Async,
}
impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Sync
    }
}
impl FromStr for DispatchMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "sync" => Ok(DispatchMode::Sync),
            "async" => Ok(DispatchMode::Async),
            _ => track_panic!(ErrorKind::Invalid, "Undefined dispatch mode: {:?}", s),
        }
    }
}

/// Time Zone.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::types::TimeZone;
///
/// assert_eq!(TimeZone::default(), TimeZone::Local);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZone {
    Utc,
    Local,
}
impl Default for TimeZone {
    fn default() -> Self {
        TimeZone::Local
    }
}
impl FromStr for TimeZone {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "utc" => Ok(TimeZone::Utc),
            "local" => Ok(TimeZone::Local),
            _ => track_panic!(ErrorKind::Invalid, "Undefined time zone: {:?}", s),
        }
    }
}

/// Source location appended to records rendered by the `full` and `compact` formats.
///
/// Templates render locations through their own verbs and ignore this setting.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::types::SourceLocation;
///
/// assert_eq!(SourceLocation::default(), SourceLocation::ModuleAndLine);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    None,
    ModuleAndLine,
    FileAndLine,
}
impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::ModuleAndLine
    }
}
impl FromStr for SourceLocation {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "none" => Ok(SourceLocation::None),
            "module_and_line" => Ok(SourceLocation::ModuleAndLine),
            "file_and_line" => Ok(SourceLocation::FileAndLine),
            _ => track_panic!(
                ErrorKind::Invalid,
                "Undefined source code location: {:?}",
                s
            ),
        }
    }
}

/// What an asynchronous logger does when its channel is full.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::types::OverflowStrategy;
///
/// assert_eq!(OverflowStrategy::default(), OverflowStrategy::Block);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Drop the record silently.
    Drop,

    /// Drop the record and report the number of dropped records later.
    DropAndReport,

    /// Block the calling thread until there is room in the channel.
    Block,
}
impl OverflowStrategy {
    pub(crate) fn to_async_type(self) -> slog_async::OverflowStrategy {
        match self {
            OverflowStrategy::Drop => slog_async::OverflowStrategy::Drop,
            OverflowStrategy::DropAndReport => slog_async::OverflowStrategy::DropAndReport,
            OverflowStrategy::Block => slog_async::OverflowStrategy::Block,
        }
    }
}
impl Default for OverflowStrategy {
    fn default() -> Self {
        OverflowStrategy::Block
    }
}
impl FromStr for OverflowStrategy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "drop" => Ok(OverflowStrategy::Drop),
            "drop_and_report" => Ok(OverflowStrategy::DropAndReport),
            "block" => Ok(OverflowStrategy::Block),
            _ => track_panic!(
                ErrorKind::Invalid,
                "Invalid overflow strategy: {:?}",
                s
            ),
        }
    }
}
