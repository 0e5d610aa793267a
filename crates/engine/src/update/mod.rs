mod merge;

use std::collections::BTreeSet;

use metadata::MetadataAccessor;
use snapshot::{FieldList, Header, Record, RepoPath};
use vcs::{ChangeKind, Repository};

use crate::baseline;
use crate::error::EngineError;
use crate::options::EngineOptions;
use crate::staging::write_snapshot;

use merge::{MergeEntry, Resolution, resolve};

/// Outcome of an [`update`] run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateSummary {
    /// Baseline lines carried over unchanged.
    pub kept: usize,
    /// Records re-read from the working tree.
    pub refreshed: usize,
    /// Baseline records no longer present.
    pub removed: usize,
    /// Whether the snapshot was left untouched.
    pub dry_run: bool,
}

/// Refreshes the snapshot from the staged change list.
///
/// The baseline's field list is kept. Only staged paths (and, with
/// directories enabled, their ancestors) are re-read; every other line is
/// copied byte for byte.
pub fn update<R>(repo: &R, options: &EngineOptions) -> Result<UpdateSummary, EngineError>
where
    R: Repository + ?Sized,
{
    let snapshot_file = options.snapshot_file();
    let baseline = baseline::load(&snapshot_file)?.ok_or_else(|| EngineError::MissingBaseline {
        path: snapshot_file.to_path_buf(),
    })?;
    let fields = baseline.header.fields().clone();
    if let Some(requested) = options.fields() {
        ensure_same_fields(requested, &fields)?;
    }

    let mut entries = pending_entries(repo, options)?;
    let baseline_paths: BTreeSet<RepoPath> = baseline
        .entries
        .iter()
        .map(|line| line.record.path.clone())
        .collect();
    entries.extend(baseline.entries.into_iter().map(|line| MergeEntry::Baseline {
        path: line.record.path,
        raw: line.raw,
    }));
    let resolved = resolve(entries);

    let accessor = MetadataAccessor::new();
    let mut summary = UpdateSummary {
        dry_run: options.dry_run(),
        ..UpdateSummary::default()
    };
    let mut retained = 0;
    let header = Header::new(fields);
    write_snapshot(&snapshot_file, &header, !options.dry_run(), |writer| {
        for resolution in resolved {
            match resolution {
                Resolution::Keep(raw) => {
                    writer
                        .write_raw(&raw)
                        .map_err(|error| EngineError::snapshot(&snapshot_file, error))?;
                    summary.kept += 1;
                    retained += 1;
                }
                Resolution::Refresh(path) => {
                    let Some(entry) = accessor.read(&options.resolve(&path))? else {
                        tracing::debug!(
                            target: logging::targets::UPDATE,
                            "dropping `{path}': missing or unsupported type"
                        );
                        continue;
                    };
                    writer
                        .write_record(&Record::from_metadata(path.clone(), &entry))
                        .map_err(|error| EngineError::snapshot(&snapshot_file, error))?;
                    logging::trace_update!("refreshed `{path}'");
                    summary.refreshed += 1;
                    if baseline_paths.contains(&path) {
                        retained += 1;
                    }
                }
            }
        }
        Ok(())
    })?;

    summary.removed = baseline_paths.len().saturating_sub(retained);
    logging::trace_update!(
        "{} '{}': {} kept, {} refreshed",
        if options.dry_run() { "would update" } else { "updated" },
        snapshot_file.display(),
        summary.kept,
        summary.refreshed
    );
    Ok(summary)
}

fn ensure_same_fields(requested: &FieldList, recorded: &FieldList) -> Result<(), EngineError> {
    let requested_set = FieldList::canonical(requested.iter());
    let recorded_set = FieldList::canonical(recorded.iter());
    if requested_set == recorded_set {
        Ok(())
    } else {
        Err(EngineError::FieldMismatch {
            requested: requested_set.to_selection(),
            recorded: recorded_set.to_selection(),
        })
    }
}

fn pending_entries<R>(repo: &R, options: &EngineOptions) -> Result<Vec<MergeEntry>, EngineError>
where
    R: Repository + ?Sized,
{
    let mut entries = Vec::new();
    for change in repo.staged_changes()? {
        if options.directories() {
            for ancestor in change.path.ancestors() {
                entries.push(pending(change.kind, ancestor));
            }
        }
        entries.push(pending(change.kind, change.path));
    }

    if options.directories() {
        entries.extend(
            repo.tracked_directories()?
                .into_iter()
                .map(MergeEntry::Placeholder),
        );
    }

    if let Some(snapshot_path) = options.snapshot_repo_path()
        && repo.is_tracked(options.snapshot_path())?
    {
        entries.push(MergeEntry::Modified(snapshot_path));
    }
    Ok(entries)
}

fn pending(kind: ChangeKind, path: RepoPath) -> MergeEntry {
    match kind {
        ChangeKind::Modified => MergeEntry::Modified(path),
        ChangeKind::Deleted => MergeEntry::Deleted(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_comparison_ignores_column_order() {
        let recorded = FieldList::parse_selection("mode,mtime").expect("fields");
        let requested = FieldList::parse_selection("mtime,mode").expect("fields");
        ensure_same_fields(&requested, &recorded).expect("same set");

        let narrower = FieldList::parse_selection("mtime").expect("fields");
        let error = ensure_same_fields(&narrower, &recorded).expect_err("mismatch");
        assert!(matches!(
            error,
            EngineError::FieldMismatch { ref requested, ref recorded }
                if requested == "file,type,mtime" && recorded == "file,type,mtime,mode"
        ));
    }
}
