use std::fmt;
use std::str::FromStr;

use crate::error::UnknownFieldError;

/// One column of a snapshot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Field {
    /// Repository-relative path; always present.
    File,
    /// Object type code; always present.
    Type,
    /// Modification time.
    Mtime,
    /// Access time.
    Atime,
    /// Permission bits as four octal digits.
    Mode,
    /// Numeric owner.
    Uid,
    /// Numeric group.
    Gid,
    /// Owner name.
    User,
    /// Group name.
    Group,
}

impl Field {
    /// Every field in canonical column order.
    pub const ALL: [Self; 9] = [
        Self::File,
        Self::Type,
        Self::Mtime,
        Self::Atime,
        Self::Mode,
        Self::Uid,
        Self::Gid,
        Self::User,
        Self::Group,
    ];

    /// Name used in field selections and (bracketed) in the header.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Type => "type",
            Self::Mtime => "mtime",
            Self::Atime => "atime",
            Self::Mode => "mode",
            Self::Uid => "uid",
            Self::Gid => "gid",
            Self::User => "user",
            Self::Group => "group",
        }
    }

    /// Reports whether every snapshot must carry this field.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::File | Self::Type)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == value)
            .ok_or_else(|| UnknownFieldError(value.to_owned()))
    }
}

/// Ordered, duplicate-free set of snapshot columns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    /// Every field, in canonical order.
    #[must_use]
    pub fn all() -> Self {
        Self {
            fields: Field::ALL.to_vec(),
        }
    }

    /// Builds a list in canonical order from any selection.
    ///
    /// The required `file` and `type` columns are always included.
    #[must_use]
    pub fn canonical<I>(selection: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let selected: Vec<Field> = selection.into_iter().collect();
        let fields = Field::ALL
            .into_iter()
            .filter(|field| field.is_required() || selected.contains(field))
            .collect();
        Self { fields }
    }

    /// Parses a comma-separated selection such as `mtime,mode,user`.
    ///
    /// Blank items are ignored; the result is in canonical order.
    pub fn parse_selection(value: &str) -> Result<Self, UnknownFieldError> {
        let mut selected = Vec::new();
        for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            selected.push(item.parse::<Field>()?);
        }
        Ok(Self::canonical(selected))
    }

    /// Builds a list preserving the given order, rejecting duplicates.
    pub(crate) fn from_ordered(fields: Vec<Field>) -> Result<Self, String> {
        for (index, field) in fields.iter().enumerate() {
            if fields[..index].contains(field) {
                return Err(format!("field `{field}' is declared twice"));
            }
        }
        for required in [Field::File, Field::Type] {
            if !fields.contains(&required) {
                return Err(format!("required field `{required}' is missing"));
            }
        }
        Ok(Self { fields })
    }

    /// Reports whether `field` is one of the columns.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Iterates the columns in order.
    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; a valid list carries at least `file` and `type`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Comma-separated rendering, accepted back by [`parse_selection`](Self::parse_selection).
    #[must_use]
    pub fn to_selection(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_reordered_canonically() {
        let list = FieldList::parse_selection("group, mtime,mode").expect("valid selection");
        let names: Vec<_> = list.iter().map(Field::name).collect();
        assert_eq!(names, ["file", "type", "mtime", "mode", "group"]);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let error = FieldList::parse_selection("mtime,ctime").expect_err("ctime is unknown");
        assert_eq!(error, UnknownFieldError("ctime".to_owned()));
    }

    #[test]
    fn required_fields_are_implied() {
        let list = FieldList::parse_selection("").expect("empty selection");
        assert_eq!(list.to_selection(), "file,type");
    }

    #[test]
    fn ordered_list_rejects_duplicates_and_missing_type() {
        assert!(FieldList::from_ordered(vec![Field::File, Field::Type, Field::File]).is_err());
        assert!(FieldList::from_ordered(vec![Field::File, Field::Mtime]).is_err());
        let list = FieldList::from_ordered(vec![Field::Type, Field::File]).expect("any order");
        assert_eq!(list.to_selection(), "type,file");
    }
}
