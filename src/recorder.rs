//! The output primitive handed to a wrapped test body.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::warn;

use crate::GoldenError;

/// Where echoed lines go.
pub(crate) enum EchoTarget {
    Stdout,
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Screen-echo setting of a suite. Switching echo off keeps the target, so a
/// redirected suite can be silenced and re-enabled.
pub(crate) struct Echo {
    pub(crate) enabled: bool,
    pub(crate) target: EchoTarget,
}

impl Echo {
    pub(crate) fn off() -> Self {
        Self {
            enabled: false,
            target: EchoTarget::Stdout,
        }
    }

    fn line(&self, text: &str) {
        if !self.enabled {
            return;
        }
        match &self.target {
            EchoTarget::Stdout => println!("{}", text),
            EchoTarget::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(writer, "{}", text) {
                    warn!("echo of recorded line failed: {}", e);
                }
            }
        }
    }
}

impl fmt::Debug for Echo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.target {
            EchoTarget::Stdout => "Stdout",
            EchoTarget::Writer(_) => "Writer(..)",
        };
        f.debug_struct("Echo")
            .field("enabled", &self.enabled)
            .field("target", &target)
            .finish()
    }
}

/// Open scratch stream of one test invocation.
///
/// A `Recorder` only exists while a wrapped test body runs. Write failures do
/// not interrupt the body: the first one is kept and reported when the stream
/// is closed.
pub struct Recorder<'a> {
    path: PathBuf,
    out: BufWriter<File>,
    echo: &'a Echo,
    error: Option<io::Error>,
    partial: String,
    lines: usize,
}

impl<'a> Recorder<'a> {
    pub(crate) fn create(path: &Path, echo: &'a Echo) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            echo,
            error: None,
            partial: String::new(),
            lines: 0,
        })
    }

    /// Records one line of output. A single `\n` terminator is appended.
    ///
    /// An unterminated fragment left by `write!` is recorded as its own line
    /// first, so lines land in call order.
    pub fn output(&mut self, line: impl AsRef<str>) {
        self.flush_partial();
        self.emit(line.as_ref());
    }

    fn flush_partial(&mut self) {
        if !self.partial.is_empty() {
            let rest = std::mem::take(&mut self.partial);
            self.emit(&rest);
        }
    }

    fn emit(&mut self, line: &str) {
        if self.error.is_none() {
            if let Err(e) = self
                .out
                .write_all(line.as_bytes())
                .and_then(|_| self.out.write_all(b"\n"))
            {
                self.error = Some(e);
            }
        }
        self.lines += 1;
        self.echo.line(line);
    }

    /// Number of lines recorded so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Path of the scratch file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and releases the scratch file.
    pub(crate) fn close(mut self) -> Result<(), GoldenError> {
        self.flush_partial();
        let flushed = self.out.flush();
        let error = self.error.take().or(flushed.err());
        match error {
            Some(source) => Err(GoldenError::Write {
                path: self.path,
                source,
            }),
            None => Ok(()),
        }
    }
}

/// `write!`/`writeln!` support. Text is split on `\n` and every complete line
/// is recorded like [`Recorder::output`]. A trailing fragment waits for the
/// next write, for the next `output` call or for the stream to close.
impl fmt::Write for Recorder<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.partial.push_str(s);
        while let Some(idx) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=idx).collect();
            self.emit(&line[..idx]);
        }
        Ok(())
    }
}

impl fmt::Debug for Recorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("path", &self.path)
            .field("lines", &self.lines)
            .field("echo", self.echo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;

    #[test]
    fn output_appends_exactly_one_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.A.x.new");
        let echo = Echo::off();
        let mut rec = Recorder::create(&path, &echo).unwrap();
        rec.output("hello");
        rec.output("");
        rec.output("world");
        assert_eq!(rec.lines(), 3);
        rec.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n\nworld\n");
    }

    #[test]
    fn writeln_goes_through_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.A.fmt.new");
        let echo = Echo::off();
        let mut rec = Recorder::create(&path, &echo).unwrap();
        writeln!(rec, "a = {}", 1).unwrap();
        write!(rec, "b = ").unwrap();
        write!(rec, "{}\nc", 2).unwrap();
        rec.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\nb = 2\nc\n");
    }

    #[test]
    fn output_after_unterminated_write_keeps_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.A.order.new");
        let echo = Echo::off();
        let mut rec = Recorder::create(&path, &echo).unwrap();
        write!(rec, "a: ").unwrap();
        rec.output("b");
        writeln!(rec, "c").unwrap();
        assert_eq!(rec.lines(), 3);
        rec.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: \nb\nc\n");
    }
}
