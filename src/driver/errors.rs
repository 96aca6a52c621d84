use std::path::PathBuf;

use thiserror::Error;

use crate::linking::LinkError;

use super::LinkState;

pub type ResolveResult<T> = Result<T, InputResolutionError>;

#[derive(Debug, Error)]
pub enum InputResolutionError {
    #[error("Input error: I/O error reading {path:?}, {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Input error: {path:?} is not a readable archive, {source}")]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("Input error: cannot walk directory {path:?}, {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Internal error: input resolution was interrupted, {0}")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    InputResolution(#[from] InputResolutionError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("Internal error: cannot start async runtime, {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Internal error: linking already started, orchestrator is {0:?}")]
    AlreadyStarted(LinkState),
}
