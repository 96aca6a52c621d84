use std::panic;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::debug;
use walkdir::WalkDir;

use super::errors::{InputResolutionError, ResolveResult};
use super::IrContainerSource;
use crate::config::Classpath;
use crate::ir::{IrContainer, IrFile, IR_FILE_EXTENSION};

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

/// Resolves classpath entries against the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemContainers;

impl FileSystemContainers {
    pub fn new() -> Self {
        FileSystemContainers
    }

    pub fn container_for(path: PathBuf) -> ResolveResult<IrContainer> {
        let metadata = std::fs::metadata(&path).map_err(|source| InputResolutionError::Io {
            path: path.clone(),
            source,
        })?;

        if metadata.is_dir() {
            return Ok(IrContainer::Directory(path));
        }

        if is_archive(&path) {
            // Opening the archive here rejects corrupt jars before any linking
            let file = std::fs::File::open(&path).map_err(|source| InputResolutionError::Io {
                path: path.clone(),
                source,
            })?;
            zip::ZipArchive::new(file).map_err(|source| InputResolutionError::CorruptArchive {
                path: path.clone(),
                source,
            })?;

            return Ok(IrContainer::Archive(path));
        }

        Ok(IrContainer::SingleFile(path))
    }

    pub fn ir_files(container: IrContainer) -> ResolveResult<Vec<IrFile>> {
        let mut files = match container {
            IrContainer::Directory(root) => {
                let mut files = Vec::new();

                for entry in WalkDir::new(&root).follow_links(true) {
                    let entry = entry.map_err(|source| InputResolutionError::Walk {
                        path: root.clone(),
                        source,
                    })?;

                    if entry.file_type().is_file() && is_ir_file(entry.path()) {
                        let relative = entry
                            .path()
                            .strip_prefix(&root)
                            .unwrap_or(entry.path())
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");

                        files.push(IrFile::from_file(entry.path(), relative));
                    }
                }

                files
            }
            IrContainer::Archive(path) => {
                let file = std::fs::File::open(&path).map_err(|source| InputResolutionError::Io {
                    path: path.clone(),
                    source,
                })?;
                let archive = zip::ZipArchive::new(file).map_err(|source| {
                    InputResolutionError::CorruptArchive {
                        path: path.clone(),
                        source,
                    }
                })?;

                archive
                    .file_names()
                    .filter(|name| !name.ends_with('/') && is_ir_file(Path::new(name)))
                    .map(|name| IrFile::from_archive(&path, name))
                    .collect()
            }
            IrContainer::SingleFile(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();

                vec![IrFile::from_file(path, name)]
            }
        };

        files.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));

        Ok(files)
    }
}

#[async_trait]
impl IrContainerSource for FileSystemContainers {
    async fn discover(&self, classpath: &Classpath) -> ResolveResult<Vec<IrContainer>> {
        let tasks = classpath.iter().map(|entry| {
            let entry = entry.to_path_buf();
            join_task(tokio::task::spawn_blocking(move || {
                FileSystemContainers::container_for(entry)
            }))
        });

        let containers = try_join_all(tasks).await?;

        for container in containers.iter() {
            debug!("Classpath entry {:?} resolved to {:?}", container.path(), container);
        }

        Ok(containers)
    }

    async fn enumerate(&self, container: &IrContainer) -> ResolveResult<Vec<IrFile>> {
        let container = container.clone();
        let path = container.path().to_path_buf();

        let files = join_task(tokio::task::spawn_blocking(move || {
            FileSystemContainers::ir_files(container)
        }))
        .await?;

        debug!("Found {} IR files in {:?}", files.len(), path);

        Ok(files)
    }
}

async fn join_task<T>(handle: JoinHandle<ResolveResult<T>>) -> ResolveResult<T> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => panic::resume_unwind(e.into_panic()),
        Err(e) => Err(InputResolutionError::Interrupted(e.to_string())),
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext))
}

fn is_ir_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == IR_FILE_EXTENSION)
}
