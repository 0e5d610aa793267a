#![allow(unsafe_code)]

use std::io;
use std::path::Path;

use rustix::fs::{AtFlags, CWD, chownat};
use rustix::process::{RawGid, RawUid};

pub(crate) fn uid_from_raw(raw: RawUid) -> rustix::fs::Uid {
    rustix::fs::Uid::from_raw(raw)
}

pub(crate) fn gid_from_raw(raw: RawGid) -> rustix::fs::Gid {
    rustix::fs::Gid::from_raw(raw)
}

/// Changes owner and/or group, leaving an unspecified id untouched.
///
/// With `follow_symlinks == false` the link itself is changed (`lchown`).
pub(crate) fn change_owner(
    path: &Path,
    uid: Option<u32>,
    gid: Option<u32>,
    follow_symlinks: bool,
) -> io::Result<()> {
    let flags = if follow_symlinks {
        AtFlags::empty()
    } else {
        AtFlags::SYMLINK_NOFOLLOW
    };
    chownat(
        CWD,
        path,
        uid.map(uid_from_raw),
        gid.map(gid_from_raw),
        flags,
    )
    .map_err(io::Error::from)
}
