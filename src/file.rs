//! File output.
use crate::build::{BuildOutput, OutputCommon};
use crate::misc::SharedWriter;
use crate::types::Severity;
use crate::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An output builder which writes log records to a file.
///
/// When `rotate_size` is set, the file is rolled once it grows past that many
/// bytes: `app.log` becomes `app.log.1` (`app.log.1.gz` when compressed), older
/// rolls shift up by one, and at most `rotate_keep` rolled files are kept.
///
/// # Examples
///
/// ```
/// use stdlog_shim::{Build, LoggerBuilder};
/// use stdlog_shim::file::FileOutputBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut output = FileOutputBuilder::new(dir.path().join("app.log"));
/// output.truncate().rotate_size(1024 * 1024).rotate_keep(4);
///
/// let engine = LoggerBuilder::new().output(output).build().unwrap();
/// # drop(engine);
/// ```
#[derive(Debug)]
pub struct FileOutputBuilder {
    common: OutputCommon,
    path: PathBuf,
    truncate: bool,
    restrict_permissions: bool,
    rotate_size: Option<u64>,
    rotate_keep: usize,
    rotate_compress: bool,
}
impl FileOutputBuilder {
    /// Makes a new `FileOutputBuilder` instance.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileOutputBuilder {
            common: OutputCommon::default(),
            path: path.as_ref().to_path_buf(),
            truncate: false,
            restrict_permissions: false,
            rotate_size: None,
            rotate_keep: default_rotate_keep(),
            rotate_compress: false,
        }
    }

    /// Truncates the file when the output is built, instead of appending to it.
    pub fn truncate(&mut self) -> &mut Self {
        self.truncate = true;
        self
    }

    /// Makes the file readable and writable by its owner only (unix).
    pub fn restrict_permissions(&mut self) -> &mut Self {
        self.restrict_permissions = true;
        self
    }

    /// Rolls the file once it exceeds `bytes`.
    pub fn rotate_size(&mut self, bytes: u64) -> &mut Self {
        self.rotate_size = Some(bytes);
        self
    }

    /// Sets how many rolled files are kept.
    pub fn rotate_keep(&mut self, count: usize) -> &mut Self {
        self.rotate_keep = count;
        self
    }

    /// Gzips rolled files.
    pub fn rotate_compress(&mut self, compress: bool) -> &mut Self {
        self.rotate_compress = compress;
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
impl BuildOutput for FileOutputBuilder {
    fn common(&self) -> &OutputCommon {
        &self.common
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn open(&self) -> Result<Option<SharedWriter>> {
        track_assert!(
            self.rotate_keep > 0,
            ErrorKind::Invalid,
            "rotate_keep must be positive: path={:?}",
            self.path
        );
        track_assert!(
            !self.rotate_compress || cfg!(feature = "libflate"),
            ErrorKind::Invalid,
            "Compressing rolled files requires the `libflate` feature"
        );
        let mut appender = FileAppender {
            path: self.path.clone(),
            file: None,
            truncate: self.truncate,
            restrict_permissions: self.restrict_permissions,
            written: 0,
            rotate_size: self.rotate_size,
            rotate_keep: self.rotate_keep,
            rotate_compress: self.rotate_compress,
        };
        track!(
            appender.reopen_if_needed().map_err(crate::Error::from),
            "path={:?}",
            self.path
        )?;
        Ok(Some(SharedWriter::new(appender)))
    }
}

#[derive(Debug)]
struct FileAppender {
    path: PathBuf,
    file: Option<File>,
    truncate: bool,
    restrict_permissions: bool,
    written: u64,
    rotate_size: Option<u64>,
    rotate_keep: usize,
    rotate_compress: bool,
}
impl FileAppender {
    fn reopen_if_needed(&mut self) -> io::Result<()> {
        if self.file.is_none() || !self.path.exists() {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(!self.truncate)
                .truncate(self.truncate)
                .open(&self.path)?;
            if self.restrict_permissions {
                restrict_file_permissions(&file)?;
            }
            self.written = file.metadata()?.len();
            self.file = Some(file);
            // Only the first open truncates; reopening after a rotation or
            // an external removal appends.
            self.truncate = false;
        }
        Ok(())
    }

    fn rolled_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", index));
        if self.rotate_compress {
            name.push(".gz");
        }
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        let oldest = self.rolled_path(self.rotate_keep);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for i in (1..self.rotate_keep).rev() {
            let from = self.rolled_path(i);
            if from.exists() {
                fs::rename(&from, self.rolled_path(i + 1))?;
            }
        }
        if self.rotate_compress {
            let mut staged = OsString::from(self.path.as_os_str());
            staged.push(".rotating");
            let staged = PathBuf::from(staged);
            fs::rename(&self.path, &staged)?;
            compress(&staged, &self.rolled_path(1))?;
            fs::remove_file(&staged)?;
        } else {
            fs::rename(&self.path, self.rolled_path(1))?;
        }
        self.written = 0;
        Ok(())
    }
}
impl Write for FileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.reopen_if_needed()?;
        if let Some(limit) = self.rotate_size {
            if self.written > 0 && self.written + buf.len() as u64 > limit {
                self.rotate()?;
                self.reopen_if_needed()?;
            }
        }
        match self.file {
            Some(ref mut f) => {
                let n = f.write(buf)?;
                self.written += n as u64;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Cannot open file: {:?}", self.path),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(ref mut f) = self.file {
            f.flush()?;
        }
        Ok(())
    }
}

#[cfg(feature = "libflate")]
fn compress(from: &Path, to: &Path) -> io::Result<()> {
    let mut input = File::open(from)?;
    let output = File::create(to)?;
    let mut encoder = libflate::gzip::Encoder::new(output)?;
    io::copy(&mut input, &mut encoder)?;
    encoder.finish().into_result()?;
    Ok(())
}

#[cfg(not(feature = "libflate"))]
fn compress(_: &Path, _: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Other,
        "compression is not supported without the `libflate` feature",
    ))
}

/// Sets the mode of the log file to `600` so it is not world-readable.
#[cfg(unix)]
fn restrict_file_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = file.metadata()?.permissions();
    perm.set_mode(0o600);
    file.set_permissions(perm)
}

#[cfg(not(unix))]
fn restrict_file_permissions(_: &File) -> io::Result<()> {
    Ok(())
}

/// The configuration of `FileOutputBuilder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct FileOutputConfig {
    /// Log file path.
    pub path: PathBuf,

    /// Truncate the file when the logger is built.
    #[serde(default)]
    pub truncate: bool,

    /// Make the file readable by its owner only (unix).
    #[serde(default)]
    pub restrict_permissions: bool,

    /// Roll the file once it exceeds this many bytes.
    #[serde(default)]
    pub rotate_size: Option<u64>,

    /// Number of rolled files kept.
    #[serde(default = "default_rotate_keep")]
    pub rotate_keep: usize,

    /// Gzip rolled files.
    #[serde(default)]
    pub rotate_compress: bool,

    /// Format id; the document's `formatid` when absent.
    #[serde(default)]
    pub formatid: Option<String>,

    /// Severities this output accepts; all when absent.
    #[serde(default)]
    pub levels: Option<Vec<Severity>>,
}
impl FileOutputConfig {
    /// Creates a new `FileOutputConfig` writing to `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileOutputConfig {
            path: path.as_ref().to_path_buf(),
            truncate: false,
            restrict_permissions: false,
            rotate_size: None,
            rotate_keep: default_rotate_keep(),
            rotate_compress: false,
            formatid: None,
            levels: None,
        }
    }

    pub(crate) fn to_builder(&self) -> FileOutputBuilder {
        let mut builder = FileOutputBuilder::new(&self.path);
        if self.truncate {
            builder.truncate();
        }
        if self.restrict_permissions {
            builder.restrict_permissions();
        }
        if let Some(size) = self.rotate_size {
            builder.rotate_size(size);
        }
        builder.rotate_keep(self.rotate_keep);
        builder.rotate_compress(self.rotate_compress);
        builder.common = OutputCommon::new(self.formatid.clone(), self.levels.clone());
        builder
    }
}

fn default_rotate_keep() -> usize {
    8
}
