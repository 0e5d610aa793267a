use std::io::{self, Write};

use crate::error::SnapshotError;
use crate::field::{Field, FieldList};

/// First token of the schema line.
pub const MARKER: &str = "# generated by";
/// Application identity recorded in the schema line.
pub const APP_NAME: &str = "git-store-meta";
/// Schema version written by this build.
pub const CURRENT_VERSION: &str = "1.0.0";

/// The two header lines of a snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    version: String,
    fields: FieldList,
}

impl Header {
    /// Header for a snapshot written now with the given columns.
    #[must_use]
    pub fn new(fields: FieldList) -> Self {
        Self {
            version: CURRENT_VERSION.to_owned(),
            fields,
        }
    }

    /// Parses the schema line and the field line.
    ///
    /// The version is kept verbatim; use [`ensure_supported`](Self::ensure_supported)
    /// to check it.
    pub fn parse(schema_line: &str, field_line: &str) -> Result<Self, SnapshotError> {
        let mut parts = schema_line.split('\t');
        let (Some(marker), Some(app), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SnapshotError::malformed(1, "schema line must have three columns"));
        };
        if marker != MARKER || app != APP_NAME {
            return Err(SnapshotError::malformed(
                1,
                format!("not a {APP_NAME} snapshot"),
            ));
        }
        if version.is_empty() {
            return Err(SnapshotError::malformed(1, "schema version is empty"));
        }

        let mut fields = Vec::new();
        for token in field_line.split('\t') {
            let name = token
                .strip_prefix('<')
                .and_then(|rest| rest.strip_suffix('>'))
                .ok_or_else(|| {
                    SnapshotError::malformed(2, format!("field token `{token}' is not bracketed"))
                })?;
            let field = name
                .parse::<Field>()
                .map_err(|error| SnapshotError::malformed(2, error.to_string()))?;
            fields.push(field);
        }
        let fields = FieldList::from_ordered(fields).map_err(|reason| SnapshotError::malformed(2, reason))?;

        Ok(Self {
            version: version.to_owned(),
            fields,
        })
    }

    /// Accepts only `1.0.x` schema versions.
    pub fn ensure_supported(&self) -> Result<(), SnapshotError> {
        let supported = self
            .version
            .strip_prefix("1.0.")
            .is_some_and(|patch| !patch.is_empty() && patch.bytes().all(|b| b.is_ascii_digit()));
        if supported {
            Ok(())
        } else {
            Err(SnapshotError::UnsupportedSchema {
                app: APP_NAME.to_owned(),
                version: self.version.clone(),
            })
        }
    }

    /// Columns declared by the field line.
    #[must_use]
    pub const fn fields(&self) -> &FieldList {
        &self.fields
    }

    /// Writes both header lines, each terminated by a newline.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{MARKER}\t{APP_NAME}\t{}", self.version)?;
        let tokens: Vec<String> = self.fields.iter().map(|field| format!("<{field}>")).collect();
        writeln!(writer, "{}", tokens.join("\t"))
    }
}
