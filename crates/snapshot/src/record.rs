use metadata::{EntryMetadata, FileKind};

use crate::error::SnapshotError;
use crate::field::{Field, FieldList};
use crate::path::RepoPath;
use crate::timestamp::{format_timestamp, parse_timestamp};

/// Metadata of one path as held in a snapshot.
///
/// Optional columns are `None` when the snapshot does not carry them or the
/// value was empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// Repository-relative path.
    pub path: RepoPath,
    /// Object type.
    pub kind: FileKind,
    /// Modification time in epoch seconds.
    pub mtime: Option<i64>,
    /// Access time in epoch seconds.
    pub atime: Option<i64>,
    /// Permission bits, lower twelve bits only.
    pub mode: Option<u32>,
    /// Numeric owner.
    pub uid: Option<u32>,
    /// Numeric group.
    pub gid: Option<u32>,
    /// Owner name.
    pub user: Option<String>,
    /// Group name.
    pub group: Option<String>,
}

impl Record {
    /// Captures every attribute of a freshly read path.
    #[must_use]
    pub fn from_metadata(path: RepoPath, entry: &EntryMetadata) -> Self {
        Self {
            path,
            kind: entry.kind,
            mtime: Some(entry.mtime),
            atime: Some(entry.atime),
            mode: Some(entry.mode & 0o7777),
            uid: Some(entry.uid),
            gid: Some(entry.gid),
            user: entry.user.clone(),
            group: entry.group.clone(),
        }
    }

    /// Renders the record as one line (without the trailing newline) using
    /// the columns of `fields`.
    pub fn encode(&self, fields: &FieldList) -> Result<Vec<u8>, SnapshotError> {
        let mut line = Vec::new();
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                line.push(b'\t');
            }
            match field {
                Field::File => escape_into(self.path.as_bytes(), &mut line),
                Field::Type => line.push(type_code(self.kind)),
                Field::Mtime => push_time(self.mtime, &mut line)?,
                Field::Atime => push_time(self.atime, &mut line)?,
                Field::Mode => {
                    if let Some(mode) = self.mode {
                        line.extend_from_slice(format!("{:04o}", mode & 0o7777).as_bytes());
                    }
                }
                Field::Uid => push_number(self.uid, &mut line),
                Field::Gid => push_number(self.gid, &mut line),
                Field::User => push_text(self.user.as_deref(), &mut line),
                Field::Group => push_text(self.group.as_deref(), &mut line),
            }
        }
        Ok(line)
    }

    /// Parses one snapshot line (without its newline) laid out as `fields`.
    ///
    /// `line_number` is only used for error reporting.
    pub fn decode(bytes: &[u8], fields: &FieldList, line_number: usize) -> Result<Self, SnapshotError> {
        let columns: Vec<&[u8]> = bytes.split(|&byte| byte == b'\t').collect();
        if columns.len() != fields.len() {
            return Err(SnapshotError::malformed(
                line_number,
                format!("expected {} columns, found {}", fields.len(), columns.len()),
            ));
        }

        let malformed = |reason: String| SnapshotError::malformed(line_number, reason);
        let mut path = None;
        let mut kind = None;
        let mut record = PartialRecord::default();

        for (field, column) in fields.iter().zip(columns) {
            match field {
                Field::File => {
                    if column.is_empty() {
                        return Err(malformed("empty path".to_owned()));
                    }
                    path = Some(RepoPath::from_bytes(unescape(column).map_err(malformed)?));
                }
                Field::Type => {
                    kind = Some(match column {
                        b"f" => FileKind::File,
                        b"d" => FileKind::Directory,
                        b"l" => FileKind::Symlink,
                        other => {
                            return Err(malformed(format!(
                                "unknown type `{}'",
                                String::from_utf8_lossy(other)
                            )));
                        }
                    });
                }
                Field::Mtime => record.mtime = parse_time(field, column).map_err(malformed)?,
                Field::Atime => record.atime = parse_time(field, column).map_err(malformed)?,
                Field::Mode => {
                    record.mode = parse_column(field, column, |text| {
                        u32::from_str_radix(text, 8).ok().filter(|mode| *mode <= 0o7777)
                    })
                    .map_err(malformed)?;
                }
                Field::Uid => {
                    record.uid = parse_column(field, column, |text| text.parse().ok()).map_err(malformed)?;
                }
                Field::Gid => {
                    record.gid = parse_column(field, column, |text| text.parse().ok()).map_err(malformed)?;
                }
                Field::User => record.user = parse_name(field, column).map_err(malformed)?,
                Field::Group => record.group = parse_name(field, column).map_err(malformed)?,
            }
        }

        // `FieldList` always holds both required columns.
        let (Some(path), Some(kind)) = (path, kind) else {
            return Err(malformed("missing path or type column".to_owned()));
        };
        Ok(Self {
            path,
            kind,
            mtime: record.mtime,
            atime: record.atime,
            mode: record.mode,
            uid: record.uid,
            gid: record.gid,
            user: record.user,
            group: record.group,
        })
    }
}

#[derive(Default)]
struct PartialRecord {
    mtime: Option<i64>,
    atime: Option<i64>,
    mode: Option<u32>,
    uid: Option<u32>,
    gid: Option<u32>,
    user: Option<String>,
    group: Option<String>,
}

const fn type_code(kind: FileKind) -> u8 {
    match kind {
        FileKind::File => b'f',
        FileKind::Directory => b'd',
        FileKind::Symlink => b'l',
    }
}

fn push_time(value: Option<i64>, line: &mut Vec<u8>) -> Result<(), SnapshotError> {
    if let Some(seconds) = value {
        line.extend_from_slice(format_timestamp(seconds)?.as_bytes());
    }
    Ok(())
}

fn push_number(value: Option<u32>, line: &mut Vec<u8>) {
    if let Some(number) = value {
        line.extend_from_slice(number.to_string().as_bytes());
    }
}

fn push_text(value: Option<&str>, line: &mut Vec<u8>) {
    if let Some(text) = value {
        escape_into(text.as_bytes(), line);
    }
}

fn parse_column<T>(
    field: Field,
    column: &[u8],
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    if column.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(column)
        .ok()
        .and_then(parse)
        .map(Some)
        .ok_or_else(|| format!("invalid {field} `{}'", String::from_utf8_lossy(column)))
}

fn parse_time(field: Field, column: &[u8]) -> Result<Option<i64>, String> {
    parse_column(field, column, parse_timestamp)
}

fn parse_name(field: Field, column: &[u8]) -> Result<Option<String>, String> {
    if column.is_empty() {
        return Ok(None);
    }
    let bytes = unescape(column)?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| format!("{field} name is not valid UTF-8"))
}

fn escape_into(bytes: &[u8], out: &mut Vec<u8>) {
    for &byte in bytes {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b'\n' => out.extend_from_slice(b"\\n"),
            other => out.push(other),
        }
    }
}

fn unescape(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&byte) = iter.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        match iter.next() {
            Some(b'\\') => out.push(b'\\'),
            Some(b't') => out.push(b'\t'),
            Some(b'n') => out.push(b'\n'),
            Some(&other) => return Err(format!("unknown escape `\\{}'", char::from(other))),
            None => return Err("dangling escape at end of column".to_owned()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Record {
        Record {
            path: RepoPath::from("src/main.rs"),
            kind: FileKind::File,
            mtime: Some(1_700_000_000),
            atime: Some(1_700_000_100),
            mode: Some(0o644),
            uid: Some(1000),
            gid: Some(100),
            user: Some("alice".to_owned()),
            group: Some("users".to_owned()),
        }
    }

    #[test]
    fn encodes_all_columns() {
        let line = sample().encode(&FieldList::all()).expect("encode");
        assert_eq!(
            line,
            b"src/main.rs\tf\t2023-11-14T22:13:20Z\t2023-11-14T22:15:00Z\t0644\t1000\t100\talice\tusers"
        );
    }

    #[test]
    fn encodes_absent_values_as_empty_columns() {
        let mut record = sample();
        record.user = None;
        record.group = None;
        let fields = FieldList::parse_selection("mode,user,group").expect("fields");
        let line = record.encode(&fields).expect("encode");
        assert_eq!(line, b"src/main.rs\tf\t0644\t\t");

        let decoded = Record::decode(&line, &fields, 3).expect("decode");
        assert_eq!(decoded.user, None);
        assert_eq!(decoded.mode, Some(0o644));
        assert_eq!(decoded.mtime, None);
    }

    #[test]
    fn mode_keeps_special_bits_only_within_twelve() {
        let mut record = sample();
        record.mode = Some(0o104_755);
        let fields = FieldList::parse_selection("mode").expect("fields");
        assert_eq!(record.encode(&fields).expect("encode"), b"src/main.rs\tf\t4755");
    }

    #[test]
    fn decodes_in_header_order() {
        let fields = FieldList::from_ordered(vec![Field::Type, Field::Mode, Field::File]).expect("fields");
        let record = Record::decode(b"d\t0755\tdocs", &fields, 3).expect("decode");
        assert_eq!(record.path, RepoPath::from("docs"));
        assert_eq!(record.kind, FileKind::Directory);
        assert_eq!(record.mode, Some(0o755));
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let error = Record::decode(b"a\tf\textra", &FieldList::canonical([]), 7).expect_err("count");
        assert!(matches!(error, SnapshotError::Malformed { line: 7, .. }));
    }

    #[test]
    fn bad_values_are_malformed() {
        let fields = FieldList::all();
        for line in [
            &b"a\tx\t\t\t\t\t\t\t"[..],
            b"a\tf\tnot-a-time\t\t\t\t\t\t",
            b"a\tf\t\t\t0999\t\t\t\t",
            b"a\tf\t\t\t\t-1\t\t\t",
            b"\tf\t\t\t\t\t\t\t",
            b"a\\q\tf\t\t\t\t\t\t\t",
        ] {
            assert!(
                matches!(Record::decode(line, &fields, 4), Err(SnapshotError::Malformed { line: 4, .. })),
                "{:?} should be rejected",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn special_characters_in_paths_are_escaped() {
        let mut record = sample();
        record.path = RepoPath::from("odd\tname\\with\nbreaks");
        let fields = FieldList::canonical([]);
        let line = record.encode(&fields).expect("encode");
        assert_eq!(line, b"odd\\tname\\\\with\\nbreaks\tf");
        assert!(!line.contains(&b'\n'));
    }

    proptest! {
        #[test]
        fn escaped_paths_decode_to_the_original_bytes(
            bytes in proptest::collection::vec(any::<u8>(), 1..64)
        ) {
            let mut escaped = Vec::new();
            escape_into(&bytes, &mut escaped);
            prop_assert!(!escaped.contains(&b'\t'));
            prop_assert!(!escaped.contains(&b'\n'));
            prop_assert_eq!(unescape(&escaped).expect("unescape"), bytes);
        }
    }
}
