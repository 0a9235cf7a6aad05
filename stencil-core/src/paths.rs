//! Lexical path normalisation.
//!
//! [`clean`] never touches the filesystem: `.` segments are dropped, `..`
//! folds into the preceding normal segment, leading `..` survives on relative
//! paths, `..` directly under the root is dropped, and an empty result is `.`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Lexically normalise `path`.
pub fn clean(path: &Path) -> PathBuf {
    let mut prefix: Option<&OsStr> = None;
    let mut rooted = false;
    let mut parts: Vec<&OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix = Some(p.as_os_str()),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(last) if *last != OsStr::new("..") => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(OsStr::new("..")),
            },
            Component::Normal(name) => parts.push(name),
        }
    }

    let mut out = PathBuf::new();
    if let Some(prefix) = prefix {
        out.push(prefix);
    }
    if rooted {
        out.push(Component::RootDir.as_os_str());
    }
    for part in parts {
        out.push(part);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Append `rel` under `base` (a leading root on `rel` is ignored) and clean
/// the result.
pub fn join_clean(base: &Path, rel: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    clean(&joined)
}
