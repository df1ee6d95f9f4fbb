use std::collections::HashSet;
use std::io;
use std::panic::catch_unwind;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use stdlog_shim::types::{DispatchMode, Severity};
use stdlog_shim::{Build, LoggerBuilder, WriterOutputBuilder, PANIC_MESSAGE};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);
impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn engine(dispatch: DispatchMode, template: &str) -> (stdlog_shim::Engine, Capture) {
    let buf = Capture::default();
    let mut output = WriterOutputBuilder::new(buf.clone());
    output.format_id("test");
    let engine = LoggerBuilder::new()
        .dispatch(dispatch)
        .format("test", template)
        .output(output)
        .build()
        .unwrap();
    (engine, buf)
}

fn install(template: &str) -> Capture {
    let (engine, buf) = engine(DispatchMode::Sync, template);
    stdlog_shim::use_logger(engine).unwrap();
    buf
}

#[test]
fn print_fatal_and_panic_levels() {
    let _guard = serial();
    let buf = install("%LEVEL %Msg");
    stdlog_shim::print(&[&"p"]);
    stdlog_shim::println(&[&"a", &"b"]);
    let _ = catch_unwind(|| stdlog_shim::panic(&[&"boom"]));
    assert_eq!(buf.text(), "INFO p\nINFO a b\nCRITICAL boom\n");
}

#[test]
fn every_entry_point_reports_the_calling_line() {
    let _guard = serial();
    let buf = install("%File:%Line");
    let first = line!() + 1;
    stdlog_shim::info(&[&1]);
    stdlog_shim::printf(format_args!("{}", 2));
    stdlog_shim::println(&[&3]);
    stdlog_shim::criticalf!("{}", 4);
    let _ = catch_unwind(|| stdlog_shim::panicf(format_args!("{}", 5)));
    stdlog_shim::debug(&[&6]);

    let expected: String = (0..6)
        .map(|i| format!("facade.rs:{}\n", first + i))
        .collect();
    assert_eq!(buf.text(), expected);
}

#[test]
fn panic_payload_is_fixed() {
    let _guard = serial();
    let buf = install("%Msg");
    let err = catch_unwind(|| stdlog_shim::panicf!("user text {}", 1)).unwrap_err();
    let payload = err.downcast_ref::<&str>().copied();
    assert_eq!(payload, Some(PANIC_MESSAGE));
    assert!(!PANIC_MESSAGE.contains("user text"));
    assert_eq!(buf.text(), "user text 1\n");
}

#[test]
fn invalid_config_panics_and_keeps_the_old_engine() {
    let _guard = serial();
    let buf = install("%LEVEL %Msg");
    let result = catch_unwind(|| stdlog_shim::set_logger_config("[[outputs]]\ntype = \"smoke\""));
    assert!(result.is_err());
    assert!(stdlog_shim::try_set_logger_config("formatid = \"nope\"").is_err());

    stdlog_shim::info(&[&"alive"]);
    let text = buf.text();
    assert!(text.starts_with("CRITICAL Can not replace default logger with new config: [[outputs]]"));
    assert!(text.ends_with("INFO alive\n"));
}

#[test]
fn swap_during_concurrent_logging_loses_nothing() {
    const THREADS: usize = 8;
    const RECORDS: usize = 500;

    let _guard = serial();
    let old = install("%Msg");
    let (new_engine, new) = engine(DispatchMode::Async, "%Msg");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..RECORDS {
                    stdlog_shim::infof(format_args!("{}-{}", t, i));
                }
            })
        })
        .collect();
    thread::sleep(std::time::Duration::from_millis(1));
    stdlog_shim::replace_logger(new_engine).unwrap();
    for h in handles {
        h.join().unwrap();
    }
    stdlog_shim::flush();

    let old_text = old.text();
    let new_text = new.text();
    let mut seen = HashSet::new();
    for line in old_text.lines().chain(new_text.lines()) {
        assert!(seen.insert(line.to_owned()), "duplicated record {:?}", line);
    }
    assert_eq!(seen.len(), THREADS * RECORDS);
}

#[test]
fn min_level_writer_engine() {
    let _guard = serial();
    let buf = Capture::default();
    let engine =
        stdlog_shim::logger_from_writer_with_min_level(buf.clone(), Severity::Error).unwrap();
    stdlog_shim::replace_logger(engine).unwrap();
    stdlog_shim::warn(&[&"skipped"]);
    let line = line!() + 1;
    stdlog_shim::error(&[&"kept"]);
    stdlog_shim::flush();

    let text = buf.text();
    assert!(!text.contains("skipped"));
    assert!(
        text.ends_with(&format!(" [ERROR] (facade.rs:{}) kept\n", line)),
        "{}",
        text
    );
}

#[test]
fn config_documents_from_files() {
    let _guard = serial();
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("app.log");
    let config_path = dir.path().join("logging.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
type = "async"
formatid = "plain"

[formats]
plain = "%Lev %Msg"

[[outputs]]
type = "file"
path = '{}'
"#,
            log_path.display()
        ),
    )
    .unwrap();

    let engine = stdlog_shim::logger_from_config_as_file(&config_path).unwrap();
    stdlog_shim::replace_logger(engine).unwrap();
    stdlog_shim::criticalf(format_args!("written {}", 1));
    stdlog_shim::flush();
    assert_eq!(std::fs::read_to_string(&log_path).unwrap(), "Crt written 1\n");
}
