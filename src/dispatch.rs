//! Drains that sit between the logger and the output formats.
use crate::misc;
use crate::types::Severity;
use slog::{
    BorrowedKV, Drain, Key, Level, Logger, Never, OwnedKVList, Record, RecordLocation,
    RecordStatic, SendSyncRefUnwindSafeDrain, Serializer, SingleKV, KV,
};
use std::fmt;
use std::io;
use std::panic::UnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

const FLUSH_TAG: &str = "stdlog-shim::flush";
const FLUSH_TICKET_KEY: &str = "flush_ticket";
const FLUSH_RESEND_INTERVAL: Duration = Duration::from_millis(100);
const FLUSH_MAX_ATTEMPTS: usize = 50;

static FLUSH_LOCATION: RecordLocation = RecordLocation {
    file: file!(),
    line: line!(),
    column: column!(),
    function: "",
    module: module_path!(),
};

/// One output: a format writing to a sink, optionally restricted to a set of severities.
pub(crate) struct OutputDrain {
    name: String,
    levels: Option<Vec<Level>>,
    inner: Box<dyn SendSyncRefUnwindSafeDrain<Ok = (), Err = io::Error> + UnwindSafe>,
}
impl OutputDrain {
    pub fn new(
        name: String,
        levels: Option<&[Severity]>,
        inner: Box<dyn SendSyncRefUnwindSafeDrain<Ok = (), Err = io::Error> + UnwindSafe>,
    ) -> Self {
        OutputDrain {
            name,
            levels: levels.map(|l| l.iter().map(Severity::as_level).collect()),
            inner,
        }
    }
}
impl Drain for OutputDrain {
    type Ok = ();
    type Err = Never;
    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        if let Some(levels) = &self.levels {
            if !levels.contains(&record.level()) {
                return Ok(());
            }
        }
        if let Err(e) = self.inner.log(record, values) {
            eprintln!("stdlog-shim: failed to write to output {:?}: {}", self.name, e);
        }
        Ok(())
    }
}

/// Hands every record to all outputs in order.
pub(crate) struct Fanout {
    outputs: Vec<OutputDrain>,
}
impl Fanout {
    pub fn new(outputs: Vec<OutputDrain>) -> Self {
        Fanout { outputs }
    }
}
impl Drain for Fanout {
    type Ok = ();
    type Err = Never;
    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        for output in &self.outputs {
            output.log(record, values)?;
        }
        Ok(())
    }
}

/// Lets a caller wait until an asynchronous worker has processed everything
/// logged before the wait started.
///
/// The caller takes a ticket and sends a marker record carrying it through the
/// channel. The worker acknowledges markers in channel order, so once the
/// ticket is acknowledged every earlier record has reached the outputs.
#[derive(Debug, Default)]
pub(crate) struct FlushBarrier {
    next_ticket: AtomicU64,
    acked: Mutex<u64>,
    cond: Condvar,
}
impl FlushBarrier {
    pub fn wait(&self, logger: &Logger) {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        for _ in 0..FLUSH_MAX_ATTEMPTS {
            // With a dropping overflow strategy the marker may be discarded; resend it.
            send_marker(logger, ticket);
            let acked = misc::lock(&self.acked);
            let (acked, _) = self
                .cond
                .wait_timeout_while(acked, FLUSH_RESEND_INTERVAL, |acked| *acked < ticket)
                .unwrap_or_else(|e| e.into_inner());
            if *acked >= ticket {
                return;
            }
        }
        eprintln!(
            "stdlog-shim: asynchronous logger did not acknowledge flush #{}",
            ticket
        );
    }

    fn ack(&self, ticket: u64) {
        let mut acked = misc::lock(&self.acked);
        if *acked < ticket {
            *acked = ticket;
            self.cond.notify_all();
        }
    }
}

fn send_marker(logger: &Logger, ticket: u64) {
    let rs = RecordStatic {
        location: &FLUSH_LOCATION,
        tag: FLUSH_TAG,
        level: Level::Critical,
    };
    logger.log(&Record::new(
        &rs,
        &format_args!(""),
        BorrowedKV(&SingleKV(FLUSH_TICKET_KEY, ticket)),
    ));
}

/// Runs on the asynchronous worker thread, in front of the outputs.
pub(crate) struct FlushAck<D> {
    inner: D,
    barrier: std::sync::Arc<FlushBarrier>,
}
impl<D> FlushAck<D> {
    pub fn new(inner: D, barrier: std::sync::Arc<FlushBarrier>) -> Self {
        FlushAck { inner, barrier }
    }
}
impl<D: Drain<Ok = (), Err = Never>> Drain for FlushAck<D> {
    type Ok = ();
    type Err = Never;
    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        if record.tag() != FLUSH_TAG {
            return self.inner.log(record, values);
        }
        let mut ticket = TicketSerializer(None);
        let _ = record.kv().serialize(record, &mut ticket);
        if let Some(ticket) = ticket.0 {
            self.barrier.ack(ticket);
        }
        Ok(())
    }
}

// Values may arrive as strings after crossing the channel.
struct TicketSerializer(Option<u64>);
impl Serializer for TicketSerializer {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        if key == FLUSH_TICKET_KEY {
            self.0 = val.to_string().parse().ok();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::SharedWriter;
    use slog::o;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);
    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            misc::lock(&self.0).extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Lines(SharedWriter);
    impl Drain for Lines {
        type Ok = ();
        type Err = io::Error;
        fn log(&self, record: &Record, _: &OwnedKVList) -> io::Result<()> {
            self.0.write_record(format!("{}\n", record.msg()).as_bytes())
        }
    }

    fn output(buf: &Buffer, levels: Option<&[Severity]>) -> OutputDrain {
        OutputDrain::new(
            "test".to_owned(),
            levels,
            Box::new(Lines(SharedWriter::new(buf.clone()))),
        )
    }

    fn contents(buf: &Buffer) -> String {
        String::from_utf8(misc::lock(&buf.0).clone()).unwrap()
    }

    #[test]
    fn fanout_respects_per_output_levels() {
        let all = Buffer::default();
        let errors = Buffer::default();
        let fanout = Fanout::new(vec![
            output(&all, None),
            output(&errors, Some(&[Severity::Error, Severity::Critical][..])),
        ]);
        let logger = Logger::root(fanout, o!());
        slog::info!(logger, "one");
        slog::error!(logger, "two");
        assert_eq!(contents(&all), "one\ntwo\n");
        assert_eq!(contents(&errors), "two\n");
    }

    #[test]
    fn async_flush_waits_for_queued_records() {
        let buf = Buffer::default();
        let barrier = Arc::new(FlushBarrier::default());
        let fanout = Fanout::new(vec![output(&buf, None)]);
        let drain = slog_async::Async::new(FlushAck::new(fanout, Arc::clone(&barrier)))
            .chan_size(4096)
            .overflow_strategy(slog_async::OverflowStrategy::Block)
            .build();
        let logger = Logger::root(drain.ignore_res(), o!());
        for i in 0..1000 {
            slog::info!(logger, "{}", i);
        }
        barrier.wait(&logger);
        let text = contents(&buf);
        assert_eq!(text.lines().count(), 1000);
        assert_eq!(text.lines().last(), Some("999"));
    }

    #[test]
    fn flush_markers_are_not_written() {
        let buf = Buffer::default();
        let barrier = Arc::new(FlushBarrier::default());
        let fanout = Fanout::new(vec![output(&buf, None)]);
        let logger = Logger::root(FlushAck::new(fanout, Arc::clone(&barrier)), o!());
        barrier.wait(&logger);
        barrier.wait(&logger);
        assert_eq!(contents(&buf), "");
        assert_eq!(*misc::lock(&barrier.acked), 2);
    }
}
