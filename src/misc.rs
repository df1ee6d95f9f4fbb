use crate::types::TimeZone;
use chrono::{DateTime, FixedOffset, Local, Utc};
use slog::Record;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S%.3f";

pub fn file_and_line(record: &Record) -> String {
    format!("{}:{}", record.file(), record.line())
}

pub fn module_and_line(record: &Record) -> String {
    if record.module().is_empty() {
        file_and_line(record)
    } else {
        format!("{}:{}", record.module(), record.line())
    }
}

pub fn timezone_to_timestamp_fn(timezone: TimeZone) -> fn(&mut dyn io::Write) -> io::Result<()> {
    match timezone {
        TimeZone::Utc => timestamp_utc,
        TimeZone::Local => timestamp_local,
    }
}

fn timestamp_local(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", Local::now().format(TIMESTAMP_FORMAT))
}

fn timestamp_utc(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", Utc::now().format(TIMESTAMP_FORMAT))
}

/// Wall-clock time of a record, in the configured time zone.
pub fn now_in(timezone: TimeZone) -> DateTime<FixedOffset> {
    match timezone {
        TimeZone::Utc => Utc::now().into(),
        TimeZone::Local => Local::now().into(),
    }
}

pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An output stream shared between the formatting drain and the flusher.
///
/// Every `write` call holds the lock for its whole duration, so a record
/// written with a single `write_all` is never interleaved with another one.
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<Box<dyn Write + Send>>>);
impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(inner: W) -> Self {
        SharedWriter(Arc::new(Mutex::new(Box::new(inner))))
    }

    /// Writes one fully rendered record.
    pub fn write_record(&self, buf: &[u8]) -> io::Result<()> {
        lock(&self.0).write_all(buf)
    }

    pub fn flush_now(&self) -> io::Result<()> {
        lock(&self.0).flush()
    }
}
impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).write(buf)
    }
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        lock(&self.0).write_all(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        lock(&self.0).flush()
    }
}
impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SharedWriter").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Clone, Default)]
    struct Chunks(Arc<Mutex<Vec<Vec<u8>>>>);
    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            lock(&self.0).push(buf.to_vec());
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_all_is_not_split_between_threads() {
        let chunks = Chunks::default();
        let writer = SharedWriter::new(chunks.clone());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mut w = writer.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        w.write_all(format!("thread-{}\n", i).as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let chunks = lock(&chunks.0);
        assert_eq!(chunks.len(), 400);
        assert!(chunks.iter().all(|c| c.starts_with(b"thread-") && c.ends_with(b"\n")));
    }
}
