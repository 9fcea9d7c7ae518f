use crate::build::BuildOutput;
use crate::error::*;

use std::path::Path;

/// Obtains a full working copy of a repository.
pub trait RepositoryFetcher: Send + Sync + 'static {
    /// Clones `url` into `dest`, which exists and is empty.
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<(), BuildError>> + Send;
}

/// A trait for injecting the engine's command line into the export pipeline.
pub trait EngineToolchain: Send + Sync + 'static {
    /// Builds the managed (C#) solutions of the project in `project_dir`.
    fn build_solutions(
        &self,
        project_dir: &Path,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;

    /// Exports the preset named `preset` as a pack file to `output`.
    fn export_pack(
        &self,
        project_dir: &Path,
        preset: &str,
        output: &Path,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;
}

/// Turns a repository URL into stored packages.
pub trait PackageBuilder: Send + Sync + 'static {
    fn build(&self, repository: &str) -> impl Future<Output = Result<BuildOutput, BuildError>> + Send;
}
