use snapshot::RepoPath;

/// How a staged path differs from the committed tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeKind {
    /// Added, modified, type-changed, or unmerged.
    Modified,
    /// Removed from the index.
    Deleted,
}

/// One entry of the staged change list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagedChange {
    /// Path relative to the work tree.
    pub path: RepoPath,
    /// Kind of change.
    pub kind: ChangeKind,
}

/// Parses `git diff --name-status -z` output.
///
/// Status letters other than `A`, `M`, `T`, `U` and `D` are skipped, as are
/// the status and path of any such entry.
pub fn parse_name_status(output: &[u8]) -> Vec<StagedChange> {
    let mut tokens = output.split(|&byte| byte == 0).filter(|token| !token.is_empty());
    let mut changes = Vec::new();
    while let (Some(status), Some(path)) = (tokens.next(), tokens.next()) {
        let kind = match status.first() {
            Some(b'A' | b'M' | b'T' | b'U') => ChangeKind::Modified,
            Some(b'D') => ChangeKind::Deleted,
            _ => {
                logging::trace_git!(
                    "ignoring status `{}' for `{}'",
                    String::from_utf8_lossy(status),
                    String::from_utf8_lossy(path)
                );
                continue;
            }
        };
        changes.push(StagedChange {
            path: RepoPath::from_bytes(path.to_vec()),
            kind,
        });
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_letters() {
        let output = b"A\0new.txt\0M\0dir/changed\0D\0gone\0T\0link\0U\0conflict\0";
        let changes = parse_name_status(output);
        let rendered: Vec<(String, ChangeKind)> = changes
            .into_iter()
            .map(|change| (change.path.to_string(), change.kind))
            .collect();
        assert_eq!(
            rendered,
            [
                ("new.txt".to_owned(), ChangeKind::Modified),
                ("dir/changed".to_owned(), ChangeKind::Modified),
                ("gone".to_owned(), ChangeKind::Deleted),
                ("link".to_owned(), ChangeKind::Modified),
                ("conflict".to_owned(), ChangeKind::Modified),
            ]
        );
    }

    #[test]
    fn unknown_status_is_skipped() {
        let changes = parse_name_status(b"X\0odd\0M\0kept\0");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, RepoPath::from("kept"));
    }

    #[test]
    fn paths_keep_raw_bytes() {
        let changes = parse_name_status(b"M\0tab\there\0");
        assert_eq!(changes[0].path.as_bytes(), b"tab\there");
    }

    #[test]
    fn empty_output_has_no_changes() {
        assert!(parse_name_status(b"").is_empty());
    }
}
