use metadata::MetadataAccessor;
use snapshot::{FieldList, Header, Record};
use vcs::{Repository, directories_of};

use crate::baseline;
use crate::error::EngineError;
use crate::options::EngineOptions;
use crate::staging::write_snapshot;

/// Outcome of a [`store`] run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreSummary {
    /// Records written.
    pub records: usize,
    /// Columns of the new snapshot.
    pub fields: FieldList,
    /// Whether the snapshot was left untouched.
    pub dry_run: bool,
}

/// Records every tracked path into a new snapshot.
///
/// Without an explicit selection the fields of the existing snapshot are
/// kept, or every field when there is none. Paths that vanished or are not
/// files, directories, or symlinks are skipped; any other read failure
/// aborts the run before the snapshot is replaced.
pub fn store<R>(repo: &R, options: &EngineOptions) -> Result<StoreSummary, EngineError>
where
    R: Repository + ?Sized,
{
    let snapshot_file = options.snapshot_file();
    let fields = options
        .fields()
        .cloned()
        .or_else(|| baseline::recorded_fields(&snapshot_file))
        .unwrap_or_else(FieldList::all);

    let mut paths = repo.tracked_files()?;
    if options.directories() {
        let directories = directories_of(&paths);
        paths.extend(directories);
    }
    paths.sort();
    paths.dedup();

    let accessor = MetadataAccessor::new();
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        match accessor.read(&options.resolve(&path))? {
            Some(entry) => records.push(Record::from_metadata(path, &entry)),
            None => tracing::debug!(
                target: logging::targets::STORE,
                "skipping `{path}': missing or unsupported type"
            ),
        }
    }

    let header = Header::new(fields.clone());
    let written = write_snapshot(&snapshot_file, &header, !options.dry_run(), |writer| {
        for record in &records {
            writer
                .write_record(record)
                .map_err(|error| EngineError::snapshot(&snapshot_file, error))?;
        }
        Ok(())
    })?;

    logging::trace_store!(
        "{} {written} entries to '{}'",
        if options.dry_run() { "would store" } else { "stored" },
        snapshot_file.display()
    );
    Ok(StoreSummary {
        records: written,
        fields,
        dry_run: options.dry_run(),
    })
}
