//! Loading an existing snapshot.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use snapshot::{FieldList, Header, LineEntry, SnapshotReader};

use crate::error::EngineError;

/// Parsed snapshot with every record line kept.
#[derive(Debug)]
pub(crate) struct Baseline {
    pub(crate) header: Header,
    pub(crate) entries: Vec<LineEntry>,
}

/// Opens `path` and validates its header and schema version.
///
/// A missing file is `Ok(None)`.
pub(crate) fn open(path: &Path) -> Result<Option<SnapshotReader<BufReader<File>>>, EngineError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(EngineError::io("open", path, error)),
    };
    let reader =
        SnapshotReader::new(BufReader::new(file)).map_err(|error| EngineError::snapshot(path, error))?;
    reader
        .header()
        .ensure_supported()
        .map_err(|error| EngineError::snapshot(path, error))?;
    Ok(Some(reader))
}

/// Opens and fully decodes `path`; any malformed line fails the load.
pub(crate) fn load(path: &Path) -> Result<Option<Baseline>, EngineError> {
    let Some(reader) = open(path)? else {
        return Ok(None);
    };
    let header = reader.header().clone();
    let entries = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| EngineError::snapshot(path, error))?;
    Ok(Some(Baseline { header, entries }))
}

/// Fields of a readable existing snapshot, used as the default selection.
///
/// An unreadable snapshot is reported and ignored.
pub(crate) fn recorded_fields(path: &Path) -> Option<FieldList> {
    match open(path) {
        Ok(reader) => reader.map(|reader| reader.header().fields().clone()),
        Err(error) => {
            tracing::warn!(
                target: logging::targets::STORE,
                "ignoring existing snapshot: {error}"
            );
            None
        }
    }
}
