use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{warn, Dispatch};

use crate::ir::IrFile;

pub mod emitter;
pub mod errors;
pub mod initializer;
pub mod module_kind;
pub mod semantics;

pub use emitter::StandardLinker;
pub use errors::{LinkError, LinkResult};
pub use initializer::{ModuleInitializer, ModuleInitializerError};
pub use module_kind::{ModuleKind, ModuleKindError};
pub use semantics::{CheckedBehavior, EsFeatures, Semantics};

/// The backend that turns IR into JavaScript.
#[async_trait]
pub trait Linker: Send + Sync {
    async fn link(
        &self,
        ir_files: Vec<IrFile>,
        module_initializers: &[ModuleInitializer],
        output: &OutputSink,
        logger: &Dispatch,
    ) -> LinkResult<()>;
}

/// Where the linked program goes. The source map, if any, is placed next to
/// it with a `.map` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSink {
    path: PathBuf,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OutputSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_map_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".map");
        PathBuf::from(name)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Writes every artifact to a temporary file beside its destination and
    /// only moves them into place once all of them were written.
    ///
    /// The first artifact is the primary output and is moved last. If any
    /// move fails, the artifacts already moved by this call are removed.
    pub fn write_all(&self, artifacts: &[(PathBuf, &[u8])]) -> LinkResult<()> {
        let mut staged = Vec::with_capacity(artifacts.len());

        for (path, contents) in artifacts {
            let io_error = |source| LinkError::IoError {
                path: path.clone(),
                source,
            };

            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };

            let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
            file.write_all(contents).map_err(io_error)?;
            file.flush().map_err(io_error)?;

            staged.push((path, file));
        }

        let mut persisted: Vec<&PathBuf> = Vec::with_capacity(staged.len());

        for (path, file) in staged.into_iter().rev() {
            if let Err(e) = file.persist(path) {
                for done in persisted {
                    if let Err(remove_error) = std::fs::remove_file(done) {
                        warn!("Cannot remove {}: {}", done.display(), remove_error);
                    }
                }

                return Err(LinkError::IoError {
                    path: path.clone(),
                    source: e.error,
                });
            }

            persisted.push(path);
        }

        Ok(())
    }
}
