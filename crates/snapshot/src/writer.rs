use std::io::Write;

use crate::error::SnapshotError;
use crate::field::FieldList;
use crate::header::Header;
use crate::record::Record;

/// Writes a header followed by record lines.
#[derive(Debug)]
pub struct SnapshotWriter<W: Write> {
    writer: W,
    fields: FieldList,
    records: usize,
}

impl<W: Write> SnapshotWriter<W> {
    /// Emits `header` and prepares to write records in its column layout.
    pub fn new(mut writer: W, header: &Header) -> Result<Self, SnapshotError> {
        header.write_to(&mut writer)?;
        Ok(Self {
            writer,
            fields: header.fields().clone(),
            records: 0,
        })
    }

    /// Encodes and writes one record.
    pub fn write_record(&mut self, record: &Record) -> Result<(), SnapshotError> {
        let line = record.encode(&self.fields)?;
        self.write_raw(&line)
    }

    /// Writes an already encoded line verbatim, adding the newline.
    pub fn write_raw(&mut self, line: &[u8]) -> Result<(), SnapshotError> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// Number of record lines written so far.
    pub const fn records_written(&self) -> usize {
        self.records
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, SnapshotError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::RepoPath;
    use crate::reader::SnapshotReader;
    use metadata::FileKind;
    use std::io::Cursor;

    #[test]
    fn written_snapshot_reads_back() {
        let fields = FieldList::parse_selection("mtime,uid,user").expect("fields");
        let header = Header::new(fields);
        let record = Record {
            path: RepoPath::from("bin/tool"),
            kind: FileKind::File,
            mtime: Some(86_400),
            atime: None,
            mode: None,
            uid: Some(0),
            gid: None,
            user: None,
            group: None,
        };

        let mut writer = SnapshotWriter::new(Vec::new(), &header).expect("header");
        writer.write_record(&record).expect("record");
        writer.write_raw(b"docs\td\t\t\t").expect("raw");
        assert_eq!(writer.records_written(), 2);
        let bytes = writer.finish().expect("finish");

        let text = String::from_utf8(bytes.clone()).expect("utf-8");
        assert!(text.ends_with("bin/tool\tf\t1970-01-02T00:00:00Z\t0\t\ndocs\td\t\t\t\n"));

        let reader = SnapshotReader::new(Cursor::new(bytes)).expect("header");
        assert_eq!(reader.header(), &header);
        let records = reader.into_records().expect("records");
        assert_eq!(records[0], record);
        assert_eq!(records[1].kind, FileKind::Directory);
    }
}
