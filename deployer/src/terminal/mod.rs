//! User facing progress output.
//!
//! The deploy pipeline writes its progress protocol ("Uploading 1 files...",
//! "OK", "Process finished.") through a [`Terminal`], which wraps any writer.
//! The binary hands it stdout; tests hand it a [`SharedBuffer`].

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use colored::Colorize;

use crate::errors::DeployError;

/// Output sink for progress lines
pub struct Terminal {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Terminal {
    /// Create a terminal writing to `out`
    pub fn new(out: impl Write + Send + 'static, color: bool) -> Self {
        Self {
            out: Box::new(out),
            color,
        }
    }

    /// Terminal on stdout, colored when stdout is a tty
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(io::stdout(), color)
    }

    /// Terminal capturing everything into a shared buffer
    pub fn captured() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(buffer.clone(), false), buffer)
    }

    /// Print a plain line
    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", line.as_ref())?;
        self.out.flush()
    }

    /// Print the success marker
    pub fn ok(&mut self) -> io::Result<()> {
        if self.color {
            let marker = "OK".green().bold().to_string();
            self.say(marker)
        } else {
            self.say("OK")
        }
    }

    /// Print a warning line
    pub fn warn(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        if self.color {
            let line = line.as_ref().yellow().to_string();
            self.say(line)
        } else {
            self.say(line)
        }
    }

    /// Print an error, highlighting its first line
    pub fn failure(&mut self, err: &DeployError) -> io::Result<()> {
        let message = err.to_string();
        let mut lines = message.lines();
        if let Some(first) = lines.next() {
            if self.color {
                let first = first.red().bold().to_string();
                self.say(first)?;
            } else {
                self.say(first)?;
            }
        }
        for line in lines {
            self.say(line)?;
        }
        Ok(())
    }
}

/// Cloneable in-memory writer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
