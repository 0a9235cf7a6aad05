//! Error types for stencil-core.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or contradictory run configuration. Always detected before any
/// template is gathered or rendered.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--in and --file may not be used together")]
    InputWithFiles,

    #[error("must provide same number of --out ({outputs}) as --file ({files}) options")]
    OutputCountMismatch { files: usize, outputs: usize },

    #[error("--input-dir can not be used together with --in or --file")]
    InputDirWithInputs,

    #[error("--output-dir can not be used together with --out")]
    OutputDirWithOut,

    #[error("--input-dir must be set when --output-dir is set")]
    OutputDirWithoutInputDir,

    #[error("--output-map can not be used together with --out or --output-dir")]
    OutputMapConflict,

    #[error("--input-dir must be set when --output-map is set")]
    OutputMapWithoutInputDir,

    #[error("--out can not be used together with --input-dir")]
    OutWithInputDir,

    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`crate::Config`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A `--template` argument could not be resolved against the filesystem.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The path named by the argument does not exist (or cannot be stat'ed).
    #[error("template source not found for '{arg}': {source}")]
    NotFound {
        arg: String,
        #[source]
        source: std::io::Error,
    },

    /// Listing an aliased template directory failed.
    #[error("failed to list template directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
