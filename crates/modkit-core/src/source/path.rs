//! Lexical classification of module source strings.
//!
//! Nothing here touches the filesystem; a source is classified purely by
//! its shape.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// The kind of reference a module source string denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A filesystem path (`./x`, `../x`, `/abs/x`)
    Local,
    /// A path into the tool's bundled module library (`modules/...`)
    Embedded,
    /// A git reference (`github.com/...`, `git::...`)
    Git,
    /// Any other URL with a host
    Remote,
    Unknown,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Embedded => "embedded",
            SourceKind::Git => "git",
            SourceKind::Remote => "remote",
            SourceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `source` is a local filesystem module reference.
pub fn is_local_path(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../") || Path::new(source).is_absolute()
}

/// True when `source` points into the bundled module library.
pub fn is_embedded_path(source: &str) -> bool {
    source.starts_with("modules/") || source.starts_with("community/modules/")
}

/// True when `source` is a git reference.
pub fn is_git_path(source: &str) -> bool {
    source.starts_with("github.com") || source.starts_with("git@github.com") || source.starts_with("git::")
}

fn is_remote_url(source: &str) -> bool {
    matches!(Url::parse(source), Ok(url) if url.scheme() != "file" && url.has_host())
}

/// Classify a source string. Local paths win over every other shape.
pub fn classify_source(source: &str) -> SourceKind {
    if is_local_path(source) {
        SourceKind::Local
    } else if is_embedded_path(source) {
        SourceKind::Embedded
    } else if is_git_path(source) {
        SourceKind::Git
    } else if is_remote_url(source) {
        SourceKind::Remote
    } else {
        SourceKind::Unknown
    }
}
