//! Record formats.
//!
//! A format turns a record into bytes for one output. Besides the slog-term
//! `full` and `compact` layouts, outputs can use a template made of verbs:
//!
//! | verb | renders |
//! |---|---|
//! | `%Ns` | nanoseconds elapsed since logging was initialized |
//! | `%Date` / `%Time` | `2024-01-31` / `23:59:59` in the configured time zone |
//! | `%LEVEL` / `%Level` / `%LEV` / `%Lev` / `%l` | `ERROR` / `Error` / `ERR` / `Err` / `e` |
//! | `%File` / `%FullPath` / `%Line` | base file name / file as recorded / line number |
//! | `%Func` | calling function name, or the line number when it is not known |
//! | `%FuncPath` / `%Module` | full function path / module path |
//! | `%Msg` | the message |
//! | `%n` / `%t` / `%%` | newline / tab / percent sign |
//!
//! # Examples
//!
//! ```
//! use stdlog_shim::format::Template;
//!
//! let template: Template = "%Ns [%LEVEL] (%File:%Func) %Msg".parse().unwrap();
//! assert!("%Bogus".parse::<Template>().is_err());
//! # let _ = template;
//! ```
use crate::callsite::short_function_name;
use crate::misc::{self, SharedWriter};
use crate::types::{Severity, TimeZone};
use crate::{Error, ErrorKind};
use once_cell::sync::Lazy;
use slog::{Drain, OwnedKVList, Record, SendSyncRefUnwindSafeDrain};
use slog_term::{CompactFormat, FullFormat, PlainSyncDecorator};
use std::fmt::{self, Write as _};
use std::io;
use std::panic::UnwindSafe;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// The template used by the `default` format.
pub const DEFAULT_FORMAT: &str = "%Ns [%LEVEL] (%File:%Func) %Msg";

/// Format ids that are always defined.
pub const BUILTIN_FORMAT_IDS: [&str; 3] = ["default", "full", "compact"];

pub(crate) static START: Lazy<Instant> = Lazy::new(Instant::now);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Elapsed,
    Date,
    Time,
    LevelUpper,
    LevelTitle,
    LevShortUpper,
    LevShortTitle,
    LevChar,
    File,
    FullPath,
    Line,
    Func,
    FuncPath,
    Module,
    Msg,
}

// Longer names first: `%LEVEL` must win over `%LEV`, `%FuncPath` over `%Func`.
const VERBS: [(&str, Verb); 15] = [
    ("FullPath", Verb::FullPath),
    ("FuncPath", Verb::FuncPath),
    ("Module", Verb::Module),
    ("LEVEL", Verb::LevelUpper),
    ("Level", Verb::LevelTitle),
    ("Date", Verb::Date),
    ("Time", Verb::Time),
    ("File", Verb::File),
    ("Line", Verb::Line),
    ("Func", Verb::Func),
    ("LEV", Verb::LevShortUpper),
    ("Lev", Verb::LevShortTitle),
    ("Msg", Verb::Msg),
    ("Ns", Verb::Elapsed),
    ("l", Verb::LevChar),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Verb(Verb),
}

/// A parsed format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}
impl Template {
    fn uses_clock(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| *t == Token::Verb(Verb::Date) || *t == Token::Verb(Verb::Time))
    }

    /// Renders `record` into `out`, without the trailing newline rule.
    pub fn render(&self, out: &mut String, record: &Record, timezone: TimeZone) -> fmt::Result {
        let severity = Severity::from_level(record.level());
        let now = if self.uses_clock() {
            Some(misc::now_in(timezone))
        } else {
            None
        };
        for token in &self.tokens {
            let verb = match token {
                Token::Literal(s) => {
                    out.push_str(s);
                    continue;
                }
                Token::Verb(v) => *v,
            };
            match verb {
                Verb::Elapsed => write!(out, "{}", START.elapsed().as_nanos())?,
                Verb::Date => {
                    if let Some(now) = now {
                        write!(out, "{}", now.format("%Y-%m-%d"))?;
                    }
                }
                Verb::Time => {
                    if let Some(now) = now {
                        write!(out, "{}", now.format("%H:%M:%S"))?;
                    }
                }
                Verb::LevelUpper => out.push_str(severity.as_upper_str()),
                Verb::LevelTitle => out.push_str(severity.as_title_str()),
                Verb::LevShortUpper => out.push_str(severity.as_short_upper_str()),
                Verb::LevShortTitle => out.push_str(severity.as_short_title_str()),
                Verb::LevChar => out.push(severity.as_char()),
                Verb::File => out.push_str(base_name(record.file())),
                Verb::FullPath => out.push_str(record.file()),
                Verb::Line => write!(out, "{}", record.line())?,
                Verb::Func => {
                    if record.function().is_empty() {
                        write!(out, "{}", record.line())?;
                    } else {
                        out.push_str(short_function_name(record.function()));
                    }
                }
                Verb::FuncPath => out.push_str(record.function()),
                Verb::Module => out.push_str(record.module()),
                Verb::Msg => write!(out, "{}", record.msg())?,
            }
        }
        Ok(())
    }
}
impl FromStr for Template {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = s;
        while let Some(i) = rest.find('%') {
            literal.push_str(&rest[..i]);
            rest = &rest[i + 1..];
            let special = match rest.chars().next() {
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                Some('%') => Some('%'),
                _ => None,
            };
            if let Some(c) = special {
                literal.push(c);
                rest = &rest[1..];
                continue;
            }
            let (name, verb) = track_assert_some!(
                VERBS.iter().find(|(name, _)| rest.starts_with(*name)),
                ErrorKind::Invalid,
                "Unknown format verb at {:?} in template {:?}",
                rest,
                s
            );
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Verb(*verb));
            rest = &rest[name.len()..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Ok(Template { tokens })
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// The format of an output, resolved from its format id.
#[derive(Debug, Clone)]
pub enum Format {
    /// A user or default template.
    Template(Arc<Template>),

    /// slog-term's full format.
    Full,

    /// slog-term's compact format.
    Compact,
}
impl Format {
    /// Resolves a built-in format id.
    pub fn builtin(id: &str) -> Option<Format> {
        match id {
            "default" => DEFAULT_FORMAT.parse().ok().map(|t| Format::Template(Arc::new(t))),
            "full" => Some(Format::Full),
            "compact" => Some(Format::Compact),
            _ => None,
        }
    }

    pub(crate) fn to_drain(
        &self,
        writer: SharedWriter,
        timezone: TimeZone,
    ) -> Box<dyn SendSyncRefUnwindSafeDrain<Ok = (), Err = io::Error> + UnwindSafe> {
        let timestamp = misc::timezone_to_timestamp_fn(timezone);
        match self {
            Format::Template(template) => Box::new(TemplateFormat {
                template: Arc::clone(template),
                timezone,
                writer,
            }),
            Format::Full => {
                let decorator = PlainSyncDecorator::new(writer);
                let format = FullFormat::new(decorator).use_custom_timestamp(timestamp);
                Box::new(Serialized(Mutex::new(format.build())))
            }
            Format::Compact => {
                let decorator = PlainSyncDecorator::new(writer);
                let format = CompactFormat::new(decorator).use_custom_timestamp(timestamp);
                Box::new(Serialized(Mutex::new(format.build())))
            }
        }
    }
}

/// Renders records with a [`Template`] and writes each one with a single call.
struct TemplateFormat {
    template: Arc<Template>,
    timezone: TimeZone,
    writer: SharedWriter,
}
impl Drain for TemplateFormat {
    type Ok = ();
    type Err = io::Error;
    fn log(&self, record: &Record, _: &OwnedKVList) -> io::Result<()> {
        let mut buf = String::with_capacity(128);
        self.template
            .render(&mut buf, record, self.timezone)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to render log record"))?;
        if !buf.ends_with('\n') {
            buf.push('\n');
        }
        self.writer.write_record(buf.as_bytes())
    }
}

/// slog-term formats keep per-record state; one record at a time.
struct Serialized<D>(Mutex<D>);
impl<D: Drain> Drain for Serialized<D> {
    type Ok = D::Ok;
    type Err = D::Err;
    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<D::Ok, D::Err> {
        misc::lock(&self.0).log(record, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallSite;
    use slog::{BorrowedKV, Level, RecordStatic};

    fn render(template: &str, site: CallSite, level: Level, msg: &str) -> String {
        let template: Template = template.parse().unwrap();
        let location = site.to_record_location();
        let rs = RecordStatic {
            location: &location,
            tag: "",
            level,
        };
        let mut out = String::new();
        template
            .render(
                &mut out,
                &Record::new(&rs, &format_args!("{}", msg), BorrowedKV(&())),
                TimeZone::Utc,
            )
            .unwrap();
        out
    }

    fn site() -> CallSite {
        CallSite::new("src/worker/run.rs", 42, 5, "app::worker", "app::worker::run")
    }

    #[test]
    fn default_template_renders_level_file_and_function() {
        let out = render(DEFAULT_FORMAT, site(), Level::Info, "hello");
        let (elapsed, rest) = out.split_at(out.find(' ').unwrap());
        assert!(elapsed.parse::<u128>().is_ok());
        assert_eq!(rest, " [INFO] (run.rs:run) hello");
    }

    #[test]
    fn unknown_function_falls_back_to_line() {
        let site = CallSite::new("src/main.rs", 7, 1, "", "");
        let out = render("(%File:%Func)", site, Level::Error, "x");
        assert_eq!(out, "(main.rs:7)");
    }

    #[test]
    fn level_verbs() {
        let out = render("%LEVEL %Level %LEV %Lev %l", site(), Level::Critical, "");
        assert_eq!(out, "CRITICAL Critical CRT Crt c");
        let out = render("%LEVEL", site(), Level::Warning, "");
        assert_eq!(out, "WARN");
    }

    #[test]
    fn location_verbs() {
        let out = render(
            "%FullPath|%File|%Line|%FuncPath|%Module",
            site(),
            Level::Info,
            "",
        );
        assert_eq!(out, "src/worker/run.rs|run.rs|42|app::worker::run|app::worker");
    }

    #[test]
    fn escapes() {
        let out = render("100%% %Msg%t!%n", site(), Level::Info, "done");
        assert_eq!(out, "100% done\t!\n");
    }

    #[test]
    fn newline_escape_and_elapsed_verb_are_distinct() {
        let out = render("%ns|%Ns", site(), Level::Info, "");
        let (escape, elapsed) = out.split_at(out.find('|').unwrap());
        assert_eq!(escape, "\ns");
        assert!(elapsed[1..].chars().all(|c| c.is_ascii_digit()), "{:?}", out);
        assert!(elapsed.len() > 1);
    }

    #[test]
    fn date_and_time_have_fixed_shapes() {
        let out = render("%Date %Time", site(), Level::Info, "");
        assert_eq!(out.len(), "2024-01-31 23:59:59".len());
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[13..14], ":");
    }

    #[test]
    fn unknown_verbs_are_rejected() {
        assert!("%Bogus".parse::<Template>().is_err());
        assert!("trailing %".parse::<Template>().is_err());
    }

    #[test]
    fn builtin_ids_resolve() {
        for id in BUILTIN_FORMAT_IDS.iter() {
            assert!(Format::builtin(id).is_some());
        }
        assert!(Format::builtin("ccmp").is_none());
    }
}
