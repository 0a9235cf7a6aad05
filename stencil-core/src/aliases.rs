//! Auxiliary template aliases.
//!
//! Each `--template` argument is `path` or `alias=path`. Files register under
//! their alias (or their own path); directories contribute each file one level
//! deep as `<prefix>/<file name>`, where the prefix is the alias when given and
//! the directory argument otherwise. Later arguments overwrite earlier ones
//! that produce the same key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::paths::clean;

/// Alias → template source path.
pub type AliasMap = HashMap<String, PathBuf>;

/// Resolve every argument into one [`AliasMap`]. The first unresolvable
/// argument fails the whole call.
pub fn resolve_aliases(args: &[String]) -> Result<AliasMap, SourceError> {
    let mut aliases = AliasMap::new();
    for arg in args {
        resolve_alias(arg, &mut aliases)?;
    }
    Ok(aliases)
}

fn resolve_alias(arg: &str, aliases: &mut AliasMap) -> Result<(), SourceError> {
    let (alias, path) = match arg.split_once('=') {
        Some((alias, path)) if !alias.is_empty() => (Some(alias), path),
        Some((_, path)) => (None, path),
        None => (None, arg),
    };

    let meta = std::fs::metadata(path).map_err(|source| SourceError::NotFound {
        arg: arg.to_string(),
        source,
    })?;

    if meta.is_dir() {
        let dir = Path::new(path);
        let list_err = |source| SourceError::ListDir {
            path: dir.to_path_buf(),
            source,
        };
        let prefix = Path::new(alias.unwrap_or(path));
        for entry in std::fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let file_type = entry.file_type().map_err(list_err)?;
            // one level only
            if file_type.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = clean(&prefix.join(&name)).to_string_lossy().into_owned();
            aliases.insert(key, dir.join(&name));
        }
    } else {
        let key = alias.unwrap_or(path);
        aliases.insert(key.to_string(), PathBuf::from(path));
    }
    Ok(())
}
