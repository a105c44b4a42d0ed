//! Error types for module resolution.

use std::path::PathBuf;

use crate::module::ModuleKind;
use crate::source::SourceKind;

/// Errors surfaced by a source reader.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The path does not follow the local-path convention.
    #[error("source is not valid: {path}")]
    InvalidSource { path: String },

    /// The path is local-shaped but nothing exists there.
    #[error("local module doesn't exist at {path}")]
    SourceNotFound { path: String },

    /// No reader strategy handles this kind of source.
    #[error("no source reader for {kind} source: {path}")]
    Unsupported { path: String, kind: SourceKind },

    /// The reader registry has nothing for this module kind.
    #[error("no metadata reader registered for {kind} modules")]
    NoReader { kind: ModuleKind },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Copy(#[from] CopyError),
}

/// Errors from the kind-specific metadata parsers.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("module path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to read module directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read module file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {pattern} files found in {}", .path.display())]
    NoModuleFiles { path: PathBuf, pattern: &'static str },

    #[error("failed to parse {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },
}

/// Errors from the directory-copy primitive.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("copy source is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("copy destination exists and is not a directory: {}", .path.display())]
    DestinationNotADirectory { path: PathBuf },

    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy destination {} is inside source {}", .dst.display(), .src.display())]
    DestinationInsideSource { src: PathBuf, dst: PathBuf },

    #[error("unsupported filesystem entry type at {}", .path.display())]
    UnsupportedEntry { path: PathBuf },

    #[error("could not allocate a staging directory next to {}", .path.display())]
    Staging { path: PathBuf },
}

impl CopyError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Errors loading `modkit.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Unknown module kind tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module kind: {0} (expected 'terraform' or 'packer')")]
pub struct UnknownKind(pub String);
