use std::io::BufRead;

use crate::error::SnapshotError;
use crate::header::Header;
use crate::record::Record;

/// One record line together with its original bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineEntry {
    /// Decoded record.
    pub record: Record,
    /// Line content without the trailing newline.
    pub raw: Vec<u8>,
}

/// Streams the records of a snapshot after validating its header.
///
/// Empty lines are skipped. Schema version support is not checked here; call
/// [`Header::ensure_supported`] on [`header`](Self::header) before acting on
/// the records.
#[derive(Debug)]
pub struct SnapshotReader<R> {
    reader: R,
    header: Header,
    line: usize,
    buffer: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> SnapshotReader<R> {
    /// Reads and parses the two header lines.
    pub fn new(mut reader: R) -> Result<Self, SnapshotError> {
        let mut buffer = Vec::new();
        let schema = read_header_line(&mut reader, &mut buffer, 1)?;
        let fields = read_header_line(&mut reader, &mut buffer, 2)?;
        let header = Header::parse(&schema, &fields)?;
        Ok(Self {
            reader,
            header,
            line: 2,
            buffer,
            failed: false,
        })
    }

    /// Header of the snapshot being read.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Consumes the reader and returns every record, stopping at the first error.
    pub fn into_records(self) -> Result<Vec<Record>, SnapshotError> {
        self.map(|entry| entry.map(|entry| entry.record)).collect()
    }

    fn next_entry(&mut self) -> Result<Option<LineEntry>, SnapshotError> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let content = trim_newline(&self.buffer);
            if content.is_empty() {
                continue;
            }
            let record = Record::decode(content, self.header.fields(), self.line)?;
            return Ok(Some(LineEntry {
                record,
                raw: content.to_vec(),
            }));
        }
    }
}

impl<R: BufRead> Iterator for SnapshotReader<R> {
    type Item = Result<LineEntry, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_entry() {
            Ok(entry) => entry.map(Ok),
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

fn read_header_line<R: BufRead>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    number: usize,
) -> Result<String, SnapshotError> {
    buffer.clear();
    if reader.read_until(b'\n', buffer)? == 0 {
        return Err(SnapshotError::malformed(number, "missing header"));
    }
    let content = trim_newline(buffer);
    String::from_utf8(content.to_vec())
        .map_err(|_| SnapshotError::malformed(number, "header is not valid UTF-8"))
}

fn trim_newline(bytes: &[u8]) -> &[u8] {
    bytes.strip_suffix(b"\n").unwrap_or(bytes)
}
