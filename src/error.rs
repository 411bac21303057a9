//! Error types for the window core and the content loaders.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WmError {
    #[error("window geometry overflowed")]
    GeometryOverflow,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document `{0}` is not available")]
    Missing(String),
    #[error("document name `{0}` escapes the content root")]
    InvalidName(String),
}
