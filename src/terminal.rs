//! Console output.
use crate::build::{BuildOutput, OutputCommon};
use crate::misc::SharedWriter;
use crate::types::Severity;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io;

/// An output builder which writes log records to the terminal.
///
/// # Examples
///
/// ```
/// use stdlog_shim::{Build, LoggerBuilder};
/// use stdlog_shim::terminal::{Destination, TerminalOutputBuilder};
///
/// let mut output = TerminalOutputBuilder::new();
/// output.destination(Destination::Stderr).format_id("compact");
///
/// let engine = LoggerBuilder::new().output(output).build().unwrap();
/// # drop(engine);
/// ```
#[derive(Debug, Default)]
pub struct TerminalOutputBuilder {
    common: OutputCommon,
    destination: Destination,
}
impl TerminalOutputBuilder {
    /// Makes a new `TerminalOutputBuilder` instance.
    pub fn new() -> Self {
        TerminalOutputBuilder::default()
    }

    /// Sets the destination to which log records will be outputted.
    pub fn destination(&mut self, destination: Destination) -> &mut Self {
        self.destination = destination;
        self
    }

    /// Sets the id of the format this output uses.
    pub fn format_id(&mut self, id: &str) -> &mut Self {
        self.common.format_id = Some(id.to_owned());
        self
    }

    /// Restricts this output to the given severities.
    pub fn levels(&mut self, levels: &[Severity]) -> &mut Self {
        self.common.levels = Some(levels.to_vec());
        self
    }
}
impl BuildOutput for TerminalOutputBuilder {
    fn common(&self) -> &OutputCommon {
        &self.common
    }

    fn name(&self) -> String {
        format!("console:{:?}", self.destination).to_lowercase()
    }

    fn open(&self) -> Result<Option<SharedWriter>> {
        let writer = match self.destination {
            Destination::Stdout => SharedWriter::new(io::stdout()),
            Destination::Stderr => SharedWriter::new(io::stderr()),
        };
        Ok(Some(writer))
    }
}

/// The destination to which log records will be outputted.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use stdlog_shim::terminal::Destination;
///
/// assert_eq!(Destination::default(), Destination::Stdout);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Standard output.
    Stdout,

    /// Standard error.
    Stderr,
}
impl Default for Destination {
    fn default() -> Self {
        Destination::Stdout
    }
}

/// The configuration of `TerminalOutputBuilder`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TerminalOutputConfig {
    /// Output destination.
    #[serde(default)]
    pub destination: Destination,

    /// Format id; the document's `formatid` when absent.
    #[serde(default)]
    pub formatid: Option<String>,

    /// Severities this output accepts; all when absent.
    #[serde(default)]
    pub levels: Option<Vec<Severity>>,
}
impl TerminalOutputConfig {
    /// Creates a new `TerminalOutputConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn to_builder(&self) -> TerminalOutputBuilder {
        let mut builder = TerminalOutputBuilder::new();
        builder.destination(self.destination);
        builder.common = OutputCommon::new(self.formatid.clone(), self.levels.clone());
        builder
    }
}
