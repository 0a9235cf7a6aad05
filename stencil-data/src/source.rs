//! Data-source declarations and HTTP header arguments.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DataError;

/// Where a source's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Environment variable name.
    Env(String),
    Stdin,
    /// Full `http://` or `https://` URL.
    Http(String),
}

impl Location {
    fn parse(url: &str) -> Self {
        if url.starts_with("http://") || url.starts_with("https://") {
            Location::Http(url.to_string())
        } else if let Some(path) = url.strip_prefix("file://") {
            Location::File(PathBuf::from(path))
        } else if let Some(name) = url.strip_prefix("env:") {
            Location::Env(name.trim_start_matches('/').to_string())
        } else if url.starts_with("stdin:") {
            Location::Stdin
        } else {
            Location::File(PathBuf::from(url))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "file {}", path.display()),
            Location::Env(name) => write!(f, "env var {name}"),
            Location::Stdin => f.write_str("stdin"),
            Location::Http(url) => f.write_str(url),
        }
    }
}

/// One declared data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDecl {
    pub alias: String,
    pub location: Location,
}

/// Parse `alias=URL`, or a bare file name in the working directory whose
/// alias is the name up to its first `.` (`config.yaml` → `config`).
pub fn parse_declaration(arg: &str) -> Result<SourceDecl, DataError> {
    if let Some((alias, url)) = arg.split_once('=') {
        if alias.is_empty() || url.is_empty() {
            return Err(DataError::InvalidDeclaration(arg.to_string()));
        }
        return Ok(SourceDecl {
            alias: alias.to_string(),
            location: Location::parse(url),
        });
    }

    let is_bare_file = Path::new(arg).file_name().map(|n| n == arg).unwrap_or(false);
    if !is_bare_file {
        return Err(DataError::InvalidDeclaration(arg.to_string()));
    }
    let alias = arg.split('.').next().unwrap_or(arg);
    if alias.is_empty() {
        return Err(DataError::InvalidDeclaration(arg.to_string()));
    }
    Ok(SourceDecl {
        alias: alias.to_string(),
        location: Location::File(PathBuf::from(arg)),
    })
}

/// Parse `alias=Name: value` into `(alias, name, value)`.
pub fn parse_header(arg: &str) -> Result<(String, String, String), DataError> {
    let invalid = || DataError::InvalidHeader(arg.to_string());
    let (alias, header) = arg.split_once('=').ok_or_else(invalid)?;
    let (name, value) = header.split_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if alias.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    Ok((alias.to_string(), name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cfg=config.json", "cfg", Location::File(PathBuf::from("config.json")))]
    #[case("cfg=file:///etc/cfg.yaml", "cfg", Location::File(PathBuf::from("/etc/cfg.yaml")))]
    #[case("home=env:HOME", "home", Location::Env("HOME".into()))]
    #[case("home=env:///HOME", "home", Location::Env("HOME".into()))]
    #[case("in=stdin:", "in", Location::Stdin)]
    #[case("api=https://example.com/x?a=b", "api", Location::Http("https://example.com/x?a=b".into()))]
    #[case("config.yaml", "config", Location::File(PathBuf::from("config.yaml")))]
    fn declarations_parse(#[case] arg: &str, #[case] alias: &str, #[case] location: Location) {
        let decl = parse_declaration(arg).expect("valid declaration");
        assert_eq!(decl.alias, alias);
        assert_eq!(decl.location, location);
    }

    #[rstest]
    #[case("dir/config.yaml")]
    #[case("=config.yaml")]
    #[case("cfg=")]
    fn bad_declarations_are_rejected(#[case] arg: &str) {
        let err = parse_declaration(arg).unwrap_err();
        assert!(matches!(err, DataError::InvalidDeclaration(_)), "got: {err}");
    }

    #[test]
    fn header_splits_alias_name_and_value() {
        let (alias, name, value) = parse_header("api=Authorization: Bearer abc").unwrap();
        assert_eq!(alias, "api");
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer abc");
    }

    #[test]
    fn header_without_colon_is_rejected() {
        assert!(matches!(
            parse_header("api=Authorization"),
            Err(DataError::InvalidHeader(_))
        ));
    }
}
