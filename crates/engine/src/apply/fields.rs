//! Per-field restoration of one record.

use std::path::Path;

use metadata::{IdLookup, MetadataError, MetadataWriter};
use snapshot::{Field, FieldList, Record, format_timestamp};

/// Result of restoring one field.
#[derive(Debug, Eq, PartialEq)]
enum Outcome {
    /// The field was set; the text describes the new value.
    Applied(String),
    /// The record has no value for the field, or it does not apply.
    Skipped,
    /// Setting the field failed.
    Failed(String),
}

type ApplyFn = fn(&FieldApplier<'_>, &Record, &Target<'_>) -> Outcome;

struct Descriptor {
    field: Field,
    /// Numeric field tried when the named one fails.
    fallback: Option<Field>,
    apply: ApplyFn,
}

/// Fields in the order they are restored.
static DESCRIPTORS: [Descriptor; 7] = [
    Descriptor {
        field: Field::User,
        fallback: Some(Field::Uid),
        apply: apply_user,
    },
    Descriptor {
        field: Field::Uid,
        fallback: None,
        apply: apply_uid,
    },
    Descriptor {
        field: Field::Group,
        fallback: Some(Field::Gid),
        apply: apply_group,
    },
    Descriptor {
        field: Field::Gid,
        fallback: None,
        apply: apply_gid,
    },
    Descriptor {
        field: Field::Mode,
        fallback: None,
        apply: apply_mode,
    },
    Descriptor {
        field: Field::Mtime,
        fallback: None,
        apply: apply_mtime,
    },
    Descriptor {
        field: Field::Atime,
        fallback: None,
        apply: apply_atime,
    },
];

fn descriptor_for(field: Field) -> Option<&'static Descriptor> {
    DESCRIPTORS.iter().find(|descriptor| descriptor.field == field)
}

/// Filesystem object a record is restored onto.
pub(crate) struct Target<'a> {
    /// Absolute path.
    pub(crate) path: &'a Path,
    /// Whether the object is a symbolic link and must not be followed.
    pub(crate) is_link: bool,
}

/// Counts of field outcomes for one or more records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct FieldTally {
    pub(crate) applied: usize,
    pub(crate) failed: usize,
}

/// Restores the selected fields of records.
pub(crate) struct FieldApplier<'a> {
    writer: MetadataWriter,
    ids: &'a IdLookup,
    fields: &'a FieldList,
}

impl<'a> FieldApplier<'a> {
    pub(crate) const fn new(writer: MetadataWriter, ids: &'a IdLookup, fields: &'a FieldList) -> Self {
        Self {
            writer,
            ids,
            fields,
        }
    }

    /// Restores every selected field of `record` onto `target`.
    ///
    /// Failures are logged and counted; they never stop the remaining fields.
    pub(crate) fn apply(&self, record: &Record, target: &Target<'_>) -> FieldTally {
        let mut tally = FieldTally::default();
        let mut handled: Vec<Field> = Vec::new();

        for descriptor in &DESCRIPTORS {
            if !self.fields.contains(descriptor.field) || handled.contains(&descriptor.field) {
                continue;
            }
            match (descriptor.apply)(self, record, target) {
                Outcome::Skipped => {}
                Outcome::Applied(what) => {
                    self.report_applied(record, &what);
                    tally.applied += 1;
                    handled.extend(descriptor.fallback);
                }
                Outcome::Failed(reason) => {
                    let fallback = descriptor
                        .fallback
                        .filter(|fallback| self.fields.contains(*fallback))
                        .and_then(descriptor_for);
                    let Some(fallback) = fallback else {
                        report_failed(record, descriptor.field, &reason);
                        tally.failed += 1;
                        continue;
                    };
                    tracing::warn!(
                        target: logging::targets::APPLY,
                        "`{}' cannot set {}: {reason}; falling back to {}",
                        record.path,
                        descriptor.field,
                        fallback.field
                    );
                    handled.push(fallback.field);
                    match (fallback.apply)(self, record, target) {
                        Outcome::Applied(what) => {
                            self.report_applied(record, &what);
                            tally.applied += 1;
                        }
                        Outcome::Failed(reason) => {
                            report_failed(record, fallback.field, &reason);
                            tally.failed += 1;
                        }
                        Outcome::Skipped => tally.failed += 1,
                    }
                }
            }
        }
        tally
    }

    fn report_applied(&self, record: &Record, what: &str) {
        let verb = if self.writer.is_dry_run() { "would set" } else { "set" };
        logging::trace_apply!("`{}' {verb} {what}", record.path);
    }

    fn owner(&self, target: &Target<'_>, uid: Option<u32>, gid: Option<u32>) -> Result<(), String> {
        self.writer
            .set_owner(target.path, uid, gid, !target.is_link)
            .map_err(describe)
    }

    fn times(&self, target: &Target<'_>, mtime: Option<i64>, atime: Option<i64>) -> Result<(), String> {
        self.writer
            .set_times(target.path, mtime, atime, !target.is_link)
            .map_err(describe)
    }
}

fn report_failed(record: &Record, field: Field, reason: &str) {
    tracing::warn!(
        target: logging::targets::APPLY,
        "`{}' cannot set {field}: {reason}",
        record.path
    );
}

fn describe(error: MetadataError) -> String {
    error.source_error().to_string()
}

fn outcome(result: Result<(), String>, what: impl FnOnce() -> String) -> Outcome {
    match result {
        Ok(()) => Outcome::Applied(what()),
        Err(reason) => Outcome::Failed(reason),
    }
}

fn apply_user(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(name) = record.user.as_deref() else {
        return Outcome::Skipped;
    };
    let Some(uid) = applier.ids.uid_for_name(name) else {
        return Outcome::Failed(format!("unknown user `{name}'"));
    };
    outcome(applier.owner(target, Some(uid), None), || format!("user to `{name}'"))
}

fn apply_uid(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(uid) = record.uid else {
        return Outcome::Skipped;
    };
    outcome(applier.owner(target, Some(uid), None), || format!("uid to {uid}"))
}

fn apply_group(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(name) = record.group.as_deref() else {
        return Outcome::Skipped;
    };
    let Some(gid) = applier.ids.gid_for_name(name) else {
        return Outcome::Failed(format!("unknown group `{name}'"));
    };
    outcome(applier.owner(target, None, Some(gid)), || format!("group to `{name}'"))
}

fn apply_gid(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(gid) = record.gid else {
        return Outcome::Skipped;
    };
    outcome(applier.owner(target, None, Some(gid)), || format!("gid to {gid}"))
}

fn apply_mode(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(mode) = record.mode else {
        return Outcome::Skipped;
    };
    if target.is_link {
        return Outcome::Skipped;
    }
    outcome(
        applier.writer.set_mode(target.path, mode).map_err(describe),
        || format!("mode to {mode:04o}"),
    )
}

fn apply_mtime(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(mtime) = record.mtime else {
        return Outcome::Skipped;
    };
    outcome(applier.times(target, Some(mtime), None), || {
        format!("mtime to {}", render_time(mtime))
    })
}

fn apply_atime(applier: &FieldApplier<'_>, record: &Record, target: &Target<'_>) -> Outcome {
    let Some(atime) = record.atime else {
        return Outcome::Skipped;
    };
    outcome(applier.times(target, None, Some(atime)), || {
        format!("atime to {}", render_time(atime))
    })
}

fn render_time(seconds: i64) -> String {
    format_timestamp(seconds).unwrap_or_else(|_| seconds.to_string())
}
