//! Create-if-absent cache for files in the sandbox scratch directory.
//!
//! A file is written only when it does not exist yet, and existing files are
//! never refreshed. There is no lock: two invocations sharing one sandbox can
//! both see a file as missing and both write it, in which case the last writer
//! wins. Lambda runs one invocation per execution environment at a time, so the
//! race is accepted rather than guarded.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::RouterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Existing,
    Created,
}

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `relative` with the output of `produce` unless the file already exists.
    ///
    /// `produce` is not called for existing files, so it may perform network I/O.
    /// The contents go to a sibling temp file that is renamed into place once complete.
    pub async fn ensure_file<F, Fut>(
        &self,
        relative: &str,
        produce: F,
    ) -> Result<FileState, RouterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, RouterError>>,
    {
        self.ensure_file_with_mode(relative, SHARED_MODE, produce).await
    }

    /// Like [`ScratchDir::ensure_file`], readable by the owner only.
    pub async fn ensure_private_file<F, Fut>(
        &self,
        relative: &str,
        produce: F,
    ) -> Result<FileState, RouterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, RouterError>>,
    {
        self.ensure_file_with_mode(relative, PRIVATE_MODE, produce).await
    }

    async fn ensure_file_with_mode<F, Fut>(
        &self,
        relative: &str,
        mode: u32,
        produce: F,
    ) -> Result<FileState, RouterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, RouterError>>,
    {
        let path = self.path(relative);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| scratch_error(&path, source))?;
        if exists {
            tracing::debug!(
                component = "scratch",
                event = "file_cached",
                path = %path.display()
            );
            return Ok(FileState::Existing);
        }

        let contents = produce().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| scratch_error(parent, source))?;
        }

        let temp = temp_path(&path);
        let written = match write_file(&temp, contents.as_bytes(), mode).await {
            Ok(()) => tokio::fs::rename(&temp, &path).await,
            Err(error) => Err(error),
        };
        if let Err(source) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                tracing::warn!(
                    component = "scratch",
                    event = "temp_file_left",
                    path = %temp.display(),
                    error = %cleanup
                );
            }
            return Err(scratch_error(&path, source));
        }

        tracing::info!(
            component = "scratch",
            event = "file_created",
            path = %path.display()
        );
        Ok(FileState::Created)
    }
}

const SHARED_MODE: u32 = 0o644;
const PRIVATE_MODE: u32 = 0o600;

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp-{}", std::process::id()))
}

async fn write_file(path: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).await?;
    // A stale temp file from an earlier run keeps its old mode through `open`.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(mode)).await?;
    }
    file.write_all(contents).await?;
    file.sync_all().await
}

fn scratch_error(path: &Path, source: std::io::Error) -> RouterError {
    RouterError::Scratch {
        path: path.display().to_string(),
        source,
    }
}
