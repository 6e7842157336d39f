use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while describing a folder of media files
#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read directory '{}': {}", path.display(), source)]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("exiftool failed: {0}")]
    ExifTool(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DescribeError>;
