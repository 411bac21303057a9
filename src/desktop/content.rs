//! Where blog and auxiliary documents come from.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FetchError;

include!(concat!(env!("OUT_DIR"), "/embedded_content.rs"));

/// A named-document store. Fetches run on worker threads, so sources must be
/// shareable.
pub trait ContentSource: Send + Sync {
    fn fetch(&self, name: &str) -> Result<String, FetchError>;
}

/// Documents read from files directly under one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirSource {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        let plain = Path::new(name)
            .file_name()
            .is_some_and(|file| file == name);
        if !plain {
            return Err(FetchError::InvalidName(name.to_string()));
        }
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
    }
}

/// The demo documents compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl ContentSource for EmbeddedSource {
    fn fetch(&self, name: &str) -> Result<String, FetchError> {
        EMBEDDED_CONTENT
            .iter()
            .find(|(doc, _)| *doc == name)
            .map(|(_, body)| body.to_string())
            .ok_or_else(|| FetchError::Missing(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_reads_plain_names_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Tree.md"), "- [a](#a)\n").unwrap();
        let source = DirSource::new(dir.path());
        assert_eq!(source.fetch("Tree.md").unwrap(), "- [a](#a)\n");
        assert!(matches!(
            source.fetch("../Tree.md"),
            Err(FetchError::InvalidName(_))
        ));
        assert!(matches!(
            source.fetch("Missing.md"),
            Err(FetchError::Io { .. })
        ));
    }

    #[test]
    fn embedded_source_serves_demo_documents() {
        let tree = EmbeddedSource.fetch("Random_Thought_Tree.md").unwrap();
        assert!(tree.contains("#entry42"));
        assert!(matches!(
            EmbeddedSource.fetch("nope.md"),
            Err(FetchError::Missing(_))
        ));
    }
}
