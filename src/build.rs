use crate::callsite::CallSite;
use crate::dispatch::{Fanout, FlushAck, FlushBarrier, OutputDrain};
use crate::file::FileOutputBuilder;
use crate::format::{Format, Template, BUILTIN_FORMAT_IDS};
use crate::misc::{self, SharedWriter};
use crate::null::NullOutputBuilder;
use crate::terminal::TerminalOutputBuilder;
use crate::types::{DispatchMode, OverflowStrategy, Severity, SourceLocation, TimeZone};
use crate::{ErrorKind, Result};
use slog::{o, BorrowedKV, Discard, Drain, FnValue, Logger, Never, Record, RecordStatic};
use slog::SendSyncRefUnwindSafeDrain;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::panic::UnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// This trait allows to build a logger instance.
pub trait Build {
    /// Builds a logger.
    fn build(&self) -> Result<Engine>;
}

/// Settings shared by every output kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputCommon {
    pub(crate) format_id: Option<String>,
    pub(crate) levels: Option<Vec<Severity>>,
}
impl OutputCommon {
    pub(crate) fn new(format_id: Option<String>, levels: Option<Vec<Severity>>) -> Self {
        OutputCommon { format_id, levels }
    }
}

/// This trait allows to open the sink of an output.
pub trait BuildOutput {
    /// Settings shared by every output kind.
    fn common(&self) -> &OutputCommon;

    /// A short description used in diagnostics.
    fn name(&self) -> String;

    /// Opens the sink; `None` means records are discarded.
    fn open(&self) -> Result<Option<SharedWriter>>;
}

/// An output builder which writes log records to an arbitrary `io::Write`.
///
/// This output cannot be described by a configuration document.
#[derive(Debug)]
pub struct WriterOutputBuilder {
    common: OutputCommon,
    writer: SharedWriter,
}
impl WriterOutputBuilder {
    /// Makes a new `WriterOutputBuilder` instance.
    pub fn new<W: io::Write + Send + 'static>(writer: W) -> Self {
        WriterOutputBuilder {
            common: OutputCommon::default(),
            writer: SharedWriter::new(writer),
        }
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
impl BuildOutput for WriterOutputBuilder {
    fn common(&self) -> &OutputCommon {
        &self.common
    }

    fn name(&self) -> String {
        "writer".to_owned()
    }

    fn open(&self) -> Result<Option<SharedWriter>> {
        Ok(Some(self.writer.clone()))
    }
}

/// Output builders.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum OutputBuilder {
    Terminal(TerminalOutputBuilder),
    File(FileOutputBuilder),
    Null(NullOutputBuilder),
    Writer(WriterOutputBuilder),
}
impl OutputBuilder {
    fn as_build_output(&self) -> &dyn BuildOutput {
        match self {
            OutputBuilder::Terminal(b) => b,
            OutputBuilder::File(b) => b,
            OutputBuilder::Null(b) => b,
            OutputBuilder::Writer(b) => b,
        }
    }
}
impl From<TerminalOutputBuilder> for OutputBuilder {
    fn from(f: TerminalOutputBuilder) -> Self {
        OutputBuilder::Terminal(f)
    }
}
impl From<FileOutputBuilder> for OutputBuilder {
    fn from(f: FileOutputBuilder) -> Self {
        OutputBuilder::File(f)
    }
}
impl From<NullOutputBuilder> for OutputBuilder {
    fn from(f: NullOutputBuilder) -> Self {
        OutputBuilder::Null(f)
    }
}
impl From<WriterOutputBuilder> for OutputBuilder {
    fn from(f: WriterOutputBuilder) -> Self {
        OutputBuilder::Writer(f)
    }
}

/// A logger builder which combines a dispatch mode, a level, named formats and outputs.
///
/// # Examples
///
/// ```
/// use stdlog_shim::{Build, LoggerBuilder};
/// use stdlog_shim::terminal::TerminalOutputBuilder;
/// use stdlog_shim::types::{DispatchMode, Severity};
///
/// let mut output = TerminalOutputBuilder::new();
/// output.format_id("short");
///
/// let engine = LoggerBuilder::new()
///     .dispatch(DispatchMode::Async)
///     .level(Severity::Debug)
///     .format("short", "[%LEV] %Msg")
///     .output(output)
///     .build()
///     .unwrap();
/// engine.flush();
/// ```
#[derive(Debug)]
pub struct LoggerBuilder {
    dispatch: DispatchMode,
    level: Severity,
    format_id: String,
    formats: BTreeMap<String, String>,
    timezone: TimeZone,
    source_location: SourceLocation,
    channel_size: usize,
    overflow_strategy: OverflowStrategy,
    outputs: Vec<OutputBuilder>,
}
impl LoggerBuilder {
    /// Makes a new `LoggerBuilder` instance with no outputs.
    pub fn new() -> Self {
        LoggerBuilder {
            dispatch: DispatchMode::default(),
            level: Severity::Trace,
            format_id: "default".to_owned(),
            formats: BTreeMap::new(),
            timezone: TimeZone::default(),
            source_location: SourceLocation::default(),
            channel_size: 1024,
            overflow_strategy: OverflowStrategy::default(),
            outputs: Vec::new(),
        }
    }

    /// Sets the dispatch mode.
    pub fn dispatch(&mut self, dispatch: DispatchMode) -> &mut Self {
        self.dispatch = dispatch;
        self
    }

    /// Sets the minimum severity.
    pub fn level(&mut self, severity: Severity) -> &mut Self {
        self.level = severity;
        self
    }

    /// Sets the format id used by outputs that do not name one.
    pub fn format_id(&mut self, id: &str) -> &mut Self {
        self.format_id = id.to_owned();
        self
    }

    /// Defines a named format template.
    pub fn format(&mut self, id: &str, template: &str) -> &mut Self {
        self.formats.insert(id.to_owned(), template.to_owned());
        self
    }

    /// Sets the time zone which this logger will use.
    pub fn timezone(&mut self, timezone: TimeZone) -> &mut Self {
        self.timezone = timezone;
        self
    }

    /// Sets the source code location type the `full` and `compact` formats will use.
    pub fn source_location(&mut self, source_location: SourceLocation) -> &mut Self {
        self.source_location = source_location;
        self
    }

    /// Sets the size of the asynchronous channel of this logger.
    pub fn channel_size(&mut self, channel_size: usize) -> &mut Self {
        self.channel_size = channel_size;
        self
    }

    /// Sets the overflow strategy for the asynchronous channel.
    pub fn overflow_strategy(&mut self, overflow_strategy: OverflowStrategy) -> &mut Self {
        self.overflow_strategy = overflow_strategy;
        self
    }

    /// Adds an output.
    pub fn output<O: Into<OutputBuilder>>(&mut self, output: O) -> &mut Self {
        self.outputs.push(output.into());
        self
    }

    fn resolve_formats(&self) -> Result<BTreeMap<String, Format>> {
        let mut formats = BTreeMap::new();
        for id in BUILTIN_FORMAT_IDS.iter() {
            if let Some(format) = Format::builtin(id) {
                formats.insert((*id).to_owned(), format);
            }
        }
        for (id, text) in &self.formats {
            track_assert!(
                !formats.contains_key(id),
                ErrorKind::Invalid,
                "Format id {:?} is reserved",
                id
            );
            let template = track!(text.parse::<Template>(), "format id={:?}", id)?;
            formats.insert(id.clone(), Format::Template(Arc::new(template)));
        }
        Ok(formats)
    }
}
impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for LoggerBuilder {
    fn build(&self) -> Result<Engine> {
        track_assert!(
            !self.outputs.is_empty(),
            ErrorKind::Invalid,
            "At least one output is required"
        );
        track_assert!(
            self.channel_size > 0,
            ErrorKind::Invalid,
            "channel_size must be positive"
        );
        let formats = track!(self.resolve_formats())?;

        let mut drains = Vec::with_capacity(self.outputs.len());
        let mut writers = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            let output = output.as_build_output();
            let common = output.common();
            let format_id = common.format_id.as_ref().unwrap_or(&self.format_id);
            let format = track_assert_some!(
                formats.get(format_id),
                ErrorKind::Invalid,
                "Undefined format id {:?} (output {})",
                format_id,
                output.name()
            );
            let writer = match track!(output.open())? {
                Some(writer) => writer,
                None => continue,
            };
            let drain = format.to_drain(writer.clone(), self.timezone);
            drains.push(OutputDrain::new(
                output.name(),
                common.levels.as_deref(),
                drain,
            ));
            writers.push(writer);
        }
        let fanout = Fanout::new(drains);

        let engine = match self.dispatch {
            DispatchMode::Sync => {
                let drain = self.level.set_level_filter(fanout).ignore_res();
                Engine::new(root_logger(drain, self.source_location), writers, None)
            }
            DispatchMode::Async => {
                let barrier = Arc::new(FlushBarrier::default());
                let drain = slog_async::Async::new(FlushAck::new(fanout, Arc::clone(&barrier)))
                    .chan_size(self.channel_size)
                    .overflow_strategy(self.overflow_strategy.to_async_type())
                    .build();
                let drain = self.level.set_level_filter(drain).ignore_res();
                Engine::new(
                    root_logger(drain, self.source_location),
                    writers,
                    Some(barrier),
                )
            }
        };
        Ok(engine)
    }
}

fn root_logger<D>(drain: D, source_location: SourceLocation) -> Logger
where
    D: SendSyncRefUnwindSafeDrain<Ok = (), Err = Never> + UnwindSafe + 'static,
{
    match source_location {
        SourceLocation::None => Logger::root(drain, o!()),
        SourceLocation::ModuleAndLine => {
            Logger::root(drain, o!("module" => FnValue(misc::module_and_line)))
        }
        SourceLocation::FileAndLine => {
            Logger::root(drain, o!("module" => FnValue(misc::file_and_line)))
        }
    }
}

/// A built logger: the unit the facade installs and swaps.
pub struct Engine {
    logger: Logger,
    writers: Vec<SharedWriter>,
    barrier: Option<Arc<FlushBarrier>>,
    closed: AtomicBool,
}
impl Engine {
    fn new(logger: Logger, writers: Vec<SharedWriter>, barrier: Option<Arc<FlushBarrier>>) -> Self {
        Engine {
            logger,
            writers,
            barrier,
            closed: AtomicBool::new(false),
        }
    }

    /// An engine which discards every record.
    pub fn discard() -> Self {
        Engine::new(Logger::root(Discard, o!()), Vec::new(), None)
    }

    /// Logs a record attributed to `site`.
    pub fn log(&self, severity: Severity, site: &CallSite, args: fmt::Arguments) {
        if self.is_closed() {
            return;
        }
        let location = site.to_record_location();
        let rs = RecordStatic {
            location: &location,
            tag: "",
            level: severity.as_level(),
        };
        self.logger.log(&Record::new(&rs, &args, BorrowedKV(&())));
    }

    /// Blocks until every record logged before the call has reached the outputs.
    pub fn flush(&self) {
        if let Some(barrier) = &self.barrier {
            barrier.wait(&self.logger);
        }
        for writer in &self.writers {
            if let Err(e) = writer.flush_now() {
                eprintln!("stdlog-shim: failed to flush output: {}", e);
            }
        }
    }

    /// Stops accepting records, then flushes the ones already accepted.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.flush();
    }

    /// Returns `true` if `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Engine")
            .field("outputs", &self.writers.len())
            .field("async", &self.barrier.is_some())
            .field("closed", &self.is_closed())
            .finish()
    }
}
