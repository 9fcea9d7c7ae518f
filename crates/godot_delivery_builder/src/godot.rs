use crate::process;

use godot_delivery_core::prelude::*;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Which command line dialect the engine binary speaks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineFlavor {
    /// 3.x, windowless via `--no-window`.
    #[default]
    Godot3,
    /// 4.x, windowless via `--headless`.
    Godot4,
}

impl EngineFlavor {
    fn windowless_flag(self) -> &'static str {
        match self {
            Self::Godot3 => "--no-window",
            Self::Godot4 => "--headless",
        }
    }
}

/// Drives the engine's command line.
#[derive(Clone, Debug)]
pub struct GodotCli {
    binary: PathBuf,
    flavor: EngineFlavor,
    timeout: Duration,
}

impl GodotCli {
    pub fn new(binary: impl Into<PathBuf>, flavor: EngineFlavor, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            flavor,
            timeout,
        }
    }

    fn command(&self, project_dir: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg(self.flavor.windowless_flag())
            .arg("--path")
            .arg(project_dir)
            .current_dir(project_dir);
        command
    }
}

impl EngineToolchain for GodotCli {
    async fn build_solutions(&self, project_dir: &Path) -> Result<(), BuildError> {
        let mut command = self.command(project_dir);
        command.arg("--build-solutions").arg("--quit");

        let output = process::run(command, "godot --build-solutions", self.timeout).await?;
        debug!(%output, "solutions built");
        Ok(())
    }

    async fn export_pack(
        &self,
        project_dir: &Path,
        preset: &str,
        output: &Path,
    ) -> Result<(), BuildError> {
        let mut command = self.command(project_dir);
        command.arg("--export-pack").arg(preset).arg(output);

        let label = format!("godot --export-pack {preset}");
        let log = process::run(command, &label, self.timeout).await?;
        debug!(%preset, output = %log, "pack exported");
        Ok(())
    }
}
