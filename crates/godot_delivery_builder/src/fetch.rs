use crate::process;

use godot_delivery_core::prelude::*;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Clones repositories with the `git` command line.
#[derive(Clone, Debug)]
pub struct GitFetcher {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
            timeout: Duration::from_secs(600),
        }
    }
}

impl GitFetcher {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), BuildError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("clone")
            .arg("--quiet")
            .arg("--")
            .arg(url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0");

        process::run(command, "git clone", self.timeout).await?;
        Ok(())
    }
}
