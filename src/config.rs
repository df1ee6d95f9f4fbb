use crate::build::{Build, Engine, LoggerBuilder, OutputBuilder};
use crate::file::FileOutputConfig;
use crate::format::DEFAULT_FORMAT;
use crate::null::NullOutputConfig;
use crate::terminal::TerminalOutputConfig;
use crate::types::{DispatchMode, OverflowStrategy, Severity, SourceLocation, TimeZone};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The configuration installed before any other: synchronous console output
/// with one line per record.
pub const DEFAULT_CONFIG: &str = r#"
type = "sync"
formatid = "ccmp"

[[outputs]]
type = "console"

[formats]
ccmp = "%Ns [%LEVEL] (%File:%Func) %Msg"
"#;

/// Configuration of a logger builder.
pub trait Config {
    /// Logger builder.
    type Builder: Build;

    /// Makes a logger builder associated with this configuration.
    fn try_to_builder(&self) -> Result<Self::Builder>;

    /// Builds a logger with this configuration.
    fn build_logger(&self) -> Result<Engine> {
        let builder = track!(self.try_to_builder())?;
        let logger = track!(builder.build())?;
        Ok(logger)
    }
}

/// The configuration of `LoggerBuilder`.
///
/// # Examples
///
/// ```
/// use stdlog_shim::LoggerConfig;
///
/// let config = LoggerConfig::from_toml(r#"
/// type = "async"
/// level = "info"
/// formatid = "main"
///
/// [formats]
/// main = "%Date %Time [%LEV] %File:%Line %Msg"
///
/// [[outputs]]
/// type = "console"
/// destination = "stderr"
///
/// [[outputs]]
/// type = "file"
/// path = "/var/log/app.log"
/// levels = ["error", "critical"]
/// rotate_size = 10485760
/// "#).unwrap();
/// assert_eq!(config.outputs.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct LoggerConfig {
    /// Dispatch mode (`sync` or `async`).
    #[serde(rename = "type", default)]
    pub dispatch: DispatchMode,

    /// Minimum severity.
    #[serde(default = "default_level")]
    pub level: Severity,

    /// Format id used by outputs that do not name one.
    #[serde(default = "default_format_id")]
    pub formatid: String,

    /// Time zone of `%Date`, `%Time` and the slog-term timestamps.
    #[serde(default)]
    pub timezone: TimeZone,

    /// Source location appended by the `full` and `compact` formats.
    #[serde(default)]
    pub source_location: SourceLocation,

    /// Asynchronous channel size.
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,

    /// Whether to drop records when the asynchronous channel is full.
    ///
    /// The possible values are `drop`, `drop_and_report`, or `block`.
    #[serde(default)]
    pub overflow_strategy: OverflowStrategy,

    /// Named format templates.
    #[serde(default)]
    pub formats: BTreeMap<String, String>,

    /// Outputs.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<OutputConfig>,
}
impl LoggerConfig {
    /// Parses a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        track!(serdeconv::from_toml_str(text).map_err(crate::Error::from))
    }

    /// Parses a TOML document given as bytes.
    pub fn from_toml_bytes(bytes: &[u8]) -> Result<Self> {
        track!(serdeconv::from_toml_slice(bytes).map_err(crate::Error::from))
    }

    /// Reads and parses a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        track!(serdeconv::from_toml_file(path).map_err(crate::Error::from))
    }
}
impl Default for LoggerConfig {
    fn default() -> Self {
        let mut formats = BTreeMap::new();
        formats.insert("ccmp".to_owned(), DEFAULT_FORMAT.to_owned());
        LoggerConfig {
            dispatch: DispatchMode::Sync,
            level: default_level(),
            formatid: "ccmp".to_owned(),
            timezone: TimeZone::default(),
            source_location: SourceLocation::default(),
            channel_size: default_channel_size(),
            overflow_strategy: OverflowStrategy::default(),
            formats,
            outputs: default_outputs(),
        }
    }
}
impl Config for LoggerConfig {
    type Builder = LoggerBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = LoggerBuilder::new();
        builder.dispatch(self.dispatch);
        builder.level(self.level);
        builder.format_id(&self.formatid);
        builder.timezone(self.timezone);
        builder.source_location(self.source_location);
        builder.channel_size(self.channel_size);
        builder.overflow_strategy(self.overflow_strategy);
        for (id, template) in &self.formats {
            builder.format(id, template);
        }
        for output in &self.outputs {
            builder.output(output.to_builder());
        }
        Ok(builder)
    }
}

/// The configuration of one output.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputConfig {
    Console(TerminalOutputConfig),
    File(FileOutputConfig),
    Null(NullOutputConfig),
}
impl OutputConfig {
    fn to_builder(&self) -> OutputBuilder {
        match self {
            OutputConfig::Console(c) => OutputBuilder::Terminal(c.to_builder()),
            OutputConfig::File(c) => OutputBuilder::File(c.to_builder()),
            OutputConfig::Null(c) => OutputBuilder::Null(c.to_builder()),
        }
    }
}

fn default_level() -> Severity {
    Severity::Trace
}

fn default_format_id() -> String {
    "default".to_owned()
}

fn default_channel_size() -> usize {
    1024
}

fn default_outputs() -> Vec<OutputConfig> {
    vec![OutputConfig::Console(TerminalOutputConfig::default())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::terminal::Destination;

    #[test]
    fn default_config_text_matches_default_value() {
        let parsed = LoggerConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, LoggerConfig::default());
    }

    #[test]
    fn empty_document_uses_field_defaults() {
        let config = LoggerConfig::from_toml("").unwrap();
        assert_eq!(config.dispatch, DispatchMode::Sync);
        assert_eq!(config.level, Severity::Trace);
        assert_eq!(config.formatid, "default");
        assert_eq!(config.outputs, default_outputs());
        assert!(config.build_logger().is_ok());
    }

    #[test]
    fn outputs_are_tagged_by_type() {
        let config = LoggerConfig::from_toml(
            r#"
type = "async"
channel_size = 16
overflow_strategy = "drop"

[[outputs]]
type = "console"
destination = "stderr"
formatid = "compact"
levels = ["warn", "error"]

[[outputs]]
type = "null"
"#,
        )
        .unwrap();
        assert_eq!(config.dispatch, DispatchMode::Async);
        assert_eq!(config.channel_size, 16);
        assert_eq!(config.overflow_strategy, OverflowStrategy::Drop);
        match &config.outputs[0] {
            OutputConfig::Console(c) => {
                assert_eq!(c.destination, Destination::Stderr);
                assert_eq!(c.formatid.as_deref(), Some("compact"));
                assert_eq!(
                    c.levels.as_deref(),
                    Some(&[Severity::Warning, Severity::Error][..])
                );
            }
            other => panic!("unexpected output: {:?}", other),
        }
        assert_eq!(config.outputs[1], OutputConfig::Null(NullOutputConfig {}));
        assert!(config.build_logger().is_ok());
    }

    #[test]
    fn file_output_defaults() {
        let config = LoggerConfig::from_toml(
            r#"
[[outputs]]
type = "file"
path = "/tmp/app.log"
"#,
        )
        .unwrap();
        assert_eq!(
            config.outputs[0],
            OutputConfig::File(FileOutputConfig::new("/tmp/app.log"))
        );
    }

    #[test]
    fn syntax_errors_are_invalid() {
        let err = LoggerConfig::from_toml("type = ").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Invalid);
        let err = LoggerConfig::from_toml_bytes(b"[[outputs]]\ntype = \"carrier-pigeon\"")
            .unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Invalid);
        let err = LoggerConfig::from_toml("colour = true").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn semantic_errors_surface_at_build() {
        let config = LoggerConfig::from_toml(
            r#"
formatid = "missing"
"#,
        )
        .unwrap();
        let err = config.build_logger().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Invalid);

        let config = LoggerConfig::from_toml("outputs = []").unwrap();
        assert!(config.build_logger().is_err());
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        std::fs::write(&path, DEFAULT_CONFIG).unwrap();
        assert_eq!(
            LoggerConfig::from_toml_file(&path).unwrap(),
            LoggerConfig::default()
        );
        assert!(LoggerConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
