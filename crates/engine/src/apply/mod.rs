mod fields;

use std::io;
use std::path::Path;

use metadata::{FileKind, IdLookup, MetadataWriter, probe_kind, rebuild_symlink};
use snapshot::{Field, FieldList, Record};

use crate::baseline;
use crate::error::EngineError;
use crate::options::EngineOptions;

use fields::{FieldApplier, Target};

/// Outcome of an [`apply`] run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplySummary {
    /// Records read from the snapshot.
    pub records: usize,
    /// Records skipped: absent, mismatched type, or a directory without
    /// directory restoration.
    pub skipped: usize,
    /// Link stand-ins converted back into symbolic links.
    pub rebuilt: usize,
    /// Field values restored.
    pub applied: usize,
    /// Field values that could not be restored.
    pub failed: usize,
    /// The snapshot file did not exist.
    pub snapshot_missing: bool,
    /// Whether the working tree was left untouched.
    pub dry_run: bool,
}

/// Restores recorded metadata onto the working tree.
///
/// The snapshot is validated completely before anything is changed. Records
/// are processed in reverse path order so a directory's own times are set
/// after its children were touched.
pub fn apply(options: &EngineOptions) -> Result<ApplySummary, EngineError> {
    let snapshot_file = options.snapshot_file();
    let mut summary = ApplySummary {
        dry_run: options.dry_run(),
        ..ApplySummary::default()
    };

    let Some(reader) = baseline::open(&snapshot_file)? else {
        tracing::info!(
            target: logging::targets::APPLY,
            "'{}' does not exist, nothing to apply",
            snapshot_file.display()
        );
        summary.snapshot_missing = true;
        return Ok(summary);
    };
    let header = reader.header().clone();
    let records = reader
        .into_records()
        .map_err(|error| EngineError::snapshot(&snapshot_file, error))?;

    let fields = effective_fields(options.fields(), header.fields(), &snapshot_file);
    let ids = IdLookup::new();
    let writer = MetadataWriter::new(!options.dry_run());
    let applier = FieldApplier::new(writer, &ids, &fields);

    for record in records.iter().rev() {
        summary.records += 1;
        let path = options.resolve(&record.path);
        let Some(is_link) = prepare(record, &path, options, &mut summary) else {
            summary.skipped += 1;
            continue;
        };
        let tally = applier.apply(record, &Target { path: &path, is_link });
        summary.applied += tally.applied;
        summary.failed += tally.failed;
    }

    tracing::info!(
        target: logging::targets::APPLY,
        "{} {} values from '{}' ({} failed, {} records skipped)",
        if options.dry_run() { "would apply" } else { "applied" },
        summary.applied,
        snapshot_file.display(),
        summary.failed,
        summary.skipped
    );
    Ok(summary)
}

/// Intersects the requested fields with those the snapshot records.
fn effective_fields(requested: Option<&FieldList>, recorded: &FieldList, snapshot: &Path) -> FieldList {
    let Some(requested) = requested else {
        return recorded.clone();
    };
    for field in requested.iter().filter(|field| !field.is_required()) {
        if !recorded.contains(field) {
            tracing::warn!(
                target: logging::targets::APPLY,
                "`{field}' is not recorded in '{}', ignoring it",
                snapshot.display()
            );
        }
    }
    FieldList::canonical(requested.iter().filter(|field: &Field| recorded.contains(*field)))
}

/// Checks that `path` can take the record's metadata.
///
/// Returns whether the target is a symbolic link, or `None` when the record
/// must be skipped.
fn prepare(
    record: &Record,
    path: &Path,
    options: &EngineOptions,
    summary: &mut ApplySummary,
) -> Option<bool> {
    if record.kind == FileKind::Directory && !options.directories() {
        tracing::debug!(
            target: logging::targets::APPLY,
            "`{}' is a directory, skip applying metadata",
            record.path
        );
        return None;
    }

    let actual = match probe_kind(path) {
        Ok(actual) => actual,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                target: logging::targets::APPLY,
                "`{}' does not exist, skip applying metadata",
                record.path
            );
            return None;
        }
        Err(error) => {
            tracing::warn!(
                target: logging::targets::APPLY,
                "`{}' cannot be inspected ({error}), skip applying metadata",
                record.path
            );
            return None;
        }
    };

    match actual {
        Some(kind) if kind == record.kind => Some(kind == FileKind::Symlink),
        Some(FileKind::File) if record.kind == FileKind::Symlink => {
            match rebuild_symlink(path, !options.dry_run()) {
                Ok(target) => {
                    logging::trace_apply!(
                        "`{}' {} as a symlink to `{}'",
                        record.path,
                        if options.dry_run() { "would be rebuilt" } else { "rebuilt" },
                        target.display()
                    );
                    summary.rebuilt += 1;
                    Some(true)
                }
                Err(error) => {
                    tracing::warn!(
                        target: logging::targets::APPLY,
                        "`{}' cannot be rebuilt as a symlink ({error}), skip applying metadata",
                        record.path
                    );
                    None
                }
            }
        }
        other => {
            tracing::warn!(
                target: logging::targets::APPLY,
                "`{}' is recorded as a {} but is {}, skip applying metadata",
                record.path,
                record.kind.describe(),
                other.map_or("an unsupported type", |kind| match kind {
                    FileKind::File => "a file",
                    FileKind::Directory => "a directory",
                    FileKind::Symlink => "a symlink",
                })
            );
            None
        }
    }
}
