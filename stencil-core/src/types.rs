//! Units of work passed from template gathering to execution.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::STDIO_ARG;

/// Where a rendered template goes.
///
/// Whether the destination is released after rendering is a property of the
/// variant, fixed at construction: files are closed, stdout never is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    File(PathBuf),
}

impl Target {
    /// `-` is stdout; anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIO_ARG {
            Target::Stdout
        } else {
            Target::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Target::Stdout)
    }

    /// `true` when the destination must be closed once rendering finishes.
    pub fn closes_after_render(&self) -> bool {
        !self.is_stdout()
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Target::Stdout => None,
            Target::File(path) => Some(path),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stdout => f.write_str("<stdout>"),
            Target::File(path) => path.display().fmt(f),
        }
    }
}

/// One template to render: its name in the template namespace, its source
/// text, and its already-resolved destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub name: String,
    pub contents: String,
    pub target: Target,
}

impl TemplateDescriptor {
    pub fn new(name: impl Into<String>, contents: impl Into<String>, target: Target) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            target,
        }
    }
}
