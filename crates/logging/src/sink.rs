use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable, thread-safe handle to the writer diagnostics are rendered into.
///
/// Every clone writes to the same underlying target. Lines are written while
/// holding the lock so concurrent events never interleave mid-line.
#[derive(Clone)]
pub struct DiagnosticSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DiagnosticSink {
    /// Wraps `writer` in a shareable sink.
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes `line` followed by a newline and flushes the writer.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::SharedBuffer;

    #[test]
    fn clones_share_one_writer() {
        let buffer = SharedBuffer::default();
        let sink = DiagnosticSink::new(buffer.clone());
        let other = sink.clone();

        sink.write_line("first").expect("write first");
        other.write_line("second").expect("write second");

        assert_eq!(buffer.contents(), "first\nsecond\n");
    }
}
