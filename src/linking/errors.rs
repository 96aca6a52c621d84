use std::path::PathBuf;

use thiserror::Error;

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link error: I/O error on {path:?}, {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Link error: cannot read {file}, {source}")]
    UnreadableIrFile {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Link error: {file} is not a valid IR file, {reason}")]
    InvalidIrFile { file: String, reason: String },
    #[error(
        "Link error: {file} was compiled with IR version {found}, this linker supports up to {supported}"
    )]
    IrVersionMismatch {
        file: String,
        found: String,
        supported: String,
    },
    #[error("Link error: duplicate definition of class {name} in {file}. First defined in {first_file}")]
    DuplicateClass {
        name: String,
        file: String,
        first_file: String,
    },
    #[error("Link error: referring to non-existent class {0}. Is the standard library on the classpath?")]
    MissingCoreClass(String),
    #[error("Link error: cannot find module initializer {owner}.{method}, class {owner} is not defined")]
    UnresolvedModuleInitializer { owner: String, method: String },
    #[error("Link error: cannot serialize output, {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Internal error: linking task was interrupted, {0}")]
    Interrupted(String),
}
