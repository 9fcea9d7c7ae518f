use godot_delivery_core::prelude::*;

use std::path::{Path, PathBuf};
use tracing::warn;

/// An emptied directory holding one fetched project.
///
/// [`Workspace::cleanup`] removes it without blocking the runtime. Dropping a workspace that was
/// not cleaned up removes it synchronously.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Clears `path` of any leftovers and recreates it empty.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let path = path.into();
        let workspace_error = |source| BuildError::Workspace {
            path: path.clone(),
            source,
        };

        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(workspace_error(err)),
        }
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(workspace_error)?;

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    pub async fn cleanup(mut self) {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => self.removed = true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => self.removed = true,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unable to remove workspace");
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(err) = std::fs::remove_dir_all(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %err, "unable to remove workspace");
            }
        }
    }
}
