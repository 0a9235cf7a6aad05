//! Output sinks for rendered templates.
//!
//! File targets are rendered into memory and committed with [`atomic_write`]
//! (write `<path>.stencil.tmp`, then rename over the final path), so a
//! template that fails halfway leaves its destination untouched. Stdout is
//! streamed directly and only flushed, never closed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stencil_core::Target;

use crate::error::{io_err, RunError};

/// Atomically replace `path` with `content`, creating parent directories.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), RunError> {
    let tmp = PathBuf::from(format!("{}.stencil.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote: {}", path.display());
    Ok(())
}

/// Writable handle for one [`Target`].
///
/// Stdout is written through; a file target is buffered and only committed,
/// and closed, by [`finish`](Self::finish).
pub struct TargetWriter {
    target: Target,
    buffer: Vec<u8>,
}

impl TargetWriter {
    pub fn open(target: &Target) -> Self {
        TargetWriter {
            target: target.clone(),
            buffer: Vec::new(),
        }
    }

    /// Release the sink: commit and close a file, flush stdout.
    pub fn finish(self) -> Result<(), RunError> {
        match self.target.path() {
            Some(path) if self.target.closes_after_render() => atomic_write(path, &self.buffer),
            _ => io::stdout().flush().map_err(|e| io_err("<stdout>", e)),
        }
    }
}

impl Write for TargetWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.target.is_stdout() {
            io::stdout().write(buf)
        } else {
            self.buffer.write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.target.is_stdout() {
            io::stdout().flush()
        } else {
            Ok(())
        }
    }
}
