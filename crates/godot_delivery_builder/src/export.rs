use crate::project::{ExportPreset, Project};
use crate::workspace::Workspace;

use godot_delivery_core::prelude::*;
use godot_delivery_fs::PackageStorage;

use std::path::PathBuf;
use tracing::{error, info, warn};

/// The repository -> packages pipeline: fetch, introspect, export every preset, store.
///
/// All builds share one workspace directory, callers must not run two builds at once.
#[derive(Clone, Debug)]
pub struct ExportBuilder<F, T> {
    fetcher: F,
    toolchain: T,
    storage: PackageStorage,
    workspace: PathBuf,
}

impl<F, T> ExportBuilder<F, T>
where
    F: RepositoryFetcher,
    T: EngineToolchain,
{
    pub fn new(
        fetcher: F,
        toolchain: T,
        storage: PackageStorage,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            toolchain,
            storage,
            workspace: workspace.into(),
        }
    }
}

impl<F, T> PackageBuilder for ExportBuilder<F, T>
where
    F: RepositoryFetcher,
    T: EngineToolchain,
{
    async fn build(&self, repository: &str) -> Result<BuildOutput, BuildError> {
        let workspace = Workspace::create(&self.workspace).await?;
        let result = self.build_in(&workspace, repository).await;
        workspace.cleanup().await;
        result
    }
}

impl<F, T> ExportBuilder<F, T>
where
    F: RepositoryFetcher,
    T: EngineToolchain,
{
    async fn build_in(
        &self,
        workspace: &Workspace,
        repository: &str,
    ) -> Result<BuildOutput, BuildError> {
        if let Err(err) = self.fetcher.fetch(repository, workspace.path()).await {
            if err.is_retryable() {
                return Err(err);
            }
            error!(%repository, error = %err, "unable to clone repository");
            return Ok(BuildOutput::Skipped(SkipReason::FetchFailed));
        }

        let project = Project::new(workspace.path());

        if project.has_managed_project().await {
            info!("found csproj, building solutions");
            if let Err(err) = self.toolchain.build_solutions(project.root()).await {
                warn!(error = %err, "solution build failed, exporting anyway");
            }
        }

        let exports = resolve_platforms(project.export_presets().await);
        if exports.is_empty() {
            error!(%repository, "no export preset found");
            return Ok(BuildOutput::Skipped(SkipReason::NoPresets));
        }

        let Some(game) = project.game_info().await else {
            return Ok(BuildOutput::Skipped(SkipReason::MissingGameName));
        };

        let artifact = workspace.join(files::EXPORT_ARTIFACT);
        let mut packages = Vec::with_capacity(exports.len());

        for (preset, platform) in exports {
            self.toolchain
                .export_pack(project.root(), &preset.name, &artifact)
                .await?;

            let filename = package_filename(repository, &platform);
            let target = self
                .storage
                .store_package(&artifact, &filename)
                .await
                .map_err(|source| BuildError::Storage {
                    filename: filename.clone(),
                    source,
                })?;
            info!(preset = %preset.name, target_path = %target.display(), "built pck");

            packages.push(PckMetadata {
                filename,
                platform,
                origin_repository: repository.to_string(),
                gamename: game.name.clone(),
                main_scene: game.main_scene.clone(),
            });
        }

        Ok(BuildOutput::Packages(packages))
    }
}

/// Pairs every preset with its platform slug, one preset per platform.
///
/// Presets whose platform label has no slug are dropped. When several presets share a slug the
/// last one replaces the earlier ones, keeping the position of the first.
fn resolve_platforms(presets: Vec<ExportPreset>) -> Vec<(ExportPreset, Platform)> {
    let mut exports: Vec<(ExportPreset, Platform)> = Vec::with_capacity(presets.len());

    for preset in presets {
        let platform = Platform::from_label(&preset.platform);
        if platform.is_empty() {
            warn!(preset = %preset.name, label = %preset.platform, "preset platform has no usable name, skipping");
            continue;
        }

        match exports.iter_mut().find(|(_, existing)| *existing == platform) {
            Some(slot) => {
                warn!(
                    replaced = %slot.0.name,
                    preset = %preset.name,
                    %platform,
                    "several presets export to the same platform, keeping the last"
                );
                slot.0 = preset;
            }
            None => exports.push((preset, platform)),
        }
    }

    exports
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const PRESETS: &str = "[preset.0]\nname=\"Linux Export\"\nplatform=\"Linux/X11\"\n\n[preset.1]\nname=\"Win Export\"\nplatform=\"Windows Desktop\"\n";
    const PROJECT: &str =
        "config_version=4\n\n[application]\nconfig/name=\"Foo\"\nrun/main_scene=\"res://main.tscn\"\n";

    /// Writes a fixed set of project files instead of cloning.
    #[derive(Clone, Default)]
    struct FakeFetcher {
        files: Vec<(&'static str, &'static str)>,
        error: Option<fn() -> BuildError>,
    }

    impl RepositoryFetcher for FakeFetcher {
        async fn fetch(&self, _url: &str, dest: &Path) -> Result<(), BuildError> {
            if let Some(error) = self.error {
                return Err(error());
            }
            for (name, content) in &self.files {
                tokio::fs::write(dest.join(name), content).await.unwrap();
            }
            Ok(())
        }
    }

    /// Writes the preset name as pack content, failing for `fail_preset`.
    /// With `no_artifact` every export succeeds without writing anything.
    #[derive(Clone, Default)]
    struct FakeEngine {
        fail_preset: Option<&'static str>,
        fail_solutions: bool,
        no_artifact: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl EngineToolchain for FakeEngine {
        async fn build_solutions(&self, _project_dir: &Path) -> Result<(), BuildError> {
            self.calls.lock().unwrap().push("build-solutions".into());
            if self.fail_solutions {
                return Err(BuildError::CommandFailed {
                    command: "godot --build-solutions".into(),
                    status: "exit status: 1".into(),
                    output: "msbuild missing".into(),
                });
            }
            Ok(())
        }

        async fn export_pack(
            &self,
            _project_dir: &Path,
            preset: &str,
            output: &Path,
        ) -> Result<(), BuildError> {
            self.calls.lock().unwrap().push(format!("export {preset}"));
            if self.fail_preset == Some(preset) {
                return Err(BuildError::CommandFailed {
                    command: format!("godot --export-pack {preset}"),
                    status: "exit status: 1".into(),
                    output: "ERROR: Export template not found".into(),
                });
            }
            if !self.no_artifact {
                tokio::fs::write(output, preset).await.unwrap();
            }
            Ok(())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        storage: PackageStorage,
        workspace: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        Fixture {
            storage: PackageStorage::new(dir.path().join("storage")),
            workspace: dir.path().join("workspace"),
            _dir: dir,
        }
    }

    fn godot_project() -> FakeFetcher {
        FakeFetcher {
            files: vec![("project.godot", PROJECT), ("export_presets.cfg", PRESETS)],
            error: None,
        }
    }

    const URL: &str = "https://example.com/foo.git";

    #[tokio::test]
    async fn exports_every_preset_in_order() {
        let fx = fixture();
        let engine = FakeEngine::default();
        let builder = ExportBuilder::new(
            godot_project(),
            engine.clone(),
            fx.storage.clone(),
            &fx.workspace,
        );

        let output = builder.build(URL).await.unwrap();

        let packages = output.packages();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].filename, "foo-linuxx11.pck");
        assert_eq!(packages[0].platform.as_str(), "linuxx11");
        assert_eq!(packages[1].filename, "foo-windowsdesktop.pck");
        assert_eq!(packages[1].platform.as_str(), "windowsdesktop");
        for package in packages {
            assert_eq!(package.gamename, "Foo");
            assert_eq!(package.main_scene, "res://main.tscn");
            assert_eq!(package.origin_repository, URL);
        }

        assert_eq!(
            std::fs::read_to_string(fx.storage.package_path("foo-linuxx11.pck")).unwrap(),
            "Linux Export"
        );
        assert_eq!(
            std::fs::read_to_string(fx.storage.package_path("foo-windowsdesktop.pck")).unwrap(),
            "Win Export"
        );
        assert_eq!(
            *engine.calls.lock().unwrap(),
            ["export Linux Export", "export Win Export"]
        );
        assert!(!fx.workspace.exists());
    }

    #[tokio::test]
    async fn clone_failure_skips_cleanly() {
        let fx = fixture();
        let fetcher = FakeFetcher {
            error: Some(|| BuildError::CommandFailed {
                command: "git clone".into(),
                status: "exit status: 128".into(),
                output: "repository not found".into(),
            }),
            ..Default::default()
        };
        let builder = ExportBuilder::new(fetcher, FakeEngine::default(), fx.storage.clone(), &fx.workspace);

        let output = builder.build(URL).await.unwrap();

        assert_eq!(output, BuildOutput::Skipped(SkipReason::FetchFailed));
        assert!(!fx.workspace.exists());
    }

    #[tokio::test]
    async fn clone_timeout_is_reported() {
        let fx = fixture();
        let fetcher = FakeFetcher {
            error: Some(|| BuildError::Timeout {
                command: "git clone".into(),
                timeout: Duration::from_secs(1),
            }),
            ..Default::default()
        };
        let builder = ExportBuilder::new(fetcher, FakeEngine::default(), fx.storage.clone(), &fx.workspace);

        let err = builder.build(URL).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(!fx.workspace.exists());
    }

    #[tokio::test]
    async fn missing_presets_skip() {
        let fx = fixture();
        let fetcher = FakeFetcher {
            files: vec![("project.godot", PROJECT)],
            error: None,
        };
        let builder = ExportBuilder::new(fetcher, FakeEngine::default(), fx.storage.clone(), &fx.workspace);

        assert_eq!(
            builder.build(URL).await.unwrap(),
            BuildOutput::Skipped(SkipReason::NoPresets)
        );
    }

    #[tokio::test]
    async fn missing_game_name_skips_before_exporting() {
        let fx = fixture();
        let engine = FakeEngine::default();
        let fetcher = FakeFetcher {
            files: vec![
                ("project.godot", "[application]\nconfig/name=\"\"\n"),
                ("export_presets.cfg", PRESETS),
            ],
            error: None,
        };
        let builder = ExportBuilder::new(fetcher, engine.clone(), fx.storage.clone(), &fx.workspace);

        assert_eq!(
            builder.build(URL).await.unwrap(),
            BuildOutput::Skipped(SkipReason::MissingGameName)
        );
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_failure_aborts_the_whole_build() {
        let fx = fixture();
        let engine = FakeEngine {
            fail_preset: Some("Win Export"),
            ..Default::default()
        };
        let builder = ExportBuilder::new(godot_project(), engine, fx.storage.clone(), &fx.workspace);

        let err = builder.build(URL).await.unwrap_err();

        assert!(matches!(err, BuildError::CommandFailed { .. }));
        assert!(err.to_string().contains("Export template not found"));
        assert!(!err.is_retryable());
        assert!(!fx.workspace.exists());
    }

    #[tokio::test]
    async fn solution_build_failure_is_ignored() {
        let fx = fixture();
        let engine = FakeEngine {
            fail_solutions: true,
            ..Default::default()
        };
        let mut fetcher = godot_project();
        fetcher.files.push(("Foo.csproj", "<Project Sdk=\"Godot.NET.Sdk\" />"));
        let builder = ExportBuilder::new(fetcher, engine.clone(), fx.storage.clone(), &fx.workspace);

        let output = builder.build(URL).await.unwrap();

        assert_eq!(output.packages().len(), 2);
        assert_eq!(engine.calls.lock().unwrap()[0], "build-solutions");
    }

    #[tokio::test]
    async fn presets_sharing_a_platform_keep_the_last() {
        let fx = fixture();
        let engine = FakeEngine::default();
        let fetcher = FakeFetcher {
            files: vec![
                ("project.godot", PROJECT),
                (
                    "export_presets.cfg",
                    "[preset.0]\nname=\"Linux Debug\"\nplatform=\"Linux/X11\"\n\n\
                     [preset.1]\nname=\"Win Export\"\nplatform=\"Windows Desktop\"\n\n\
                     [preset.2]\nname=\"Linux Release\"\nplatform=\"Linux/X11\"\n",
                ),
            ],
            error: None,
        };
        let builder = ExportBuilder::new(fetcher, engine.clone(), fx.storage.clone(), &fx.workspace);

        let output = builder.build(URL).await.unwrap();

        let packages = output.packages();
        let filenames: Vec<_> = packages.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(filenames, ["foo-linuxx11.pck", "foo-windowsdesktop.pck"]);
        assert_eq!(
            std::fs::read_to_string(fx.storage.package_path("foo-linuxx11.pck")).unwrap(),
            "Linux Release"
        );
        assert_eq!(
            *engine.calls.lock().unwrap(),
            ["export Linux Release", "export Win Export"]
        );

        // another game on the same platform is reachable from Foo and back
        let linux = Platform::from_label("Linux/X11");
        let mut rotation: Vec<PckMetadata> = packages
            .iter()
            .filter(|p| p.platform == linux)
            .cloned()
            .collect();
        rotation.push(PckMetadata {
            filename: "bar-linuxx11.pck".into(),
            platform: linux.clone(),
            origin_repository: "https://example.com/bar.git".into(),
            gamename: "Bar".into(),
            main_scene: String::new(),
        });
        assert_eq!(next_package(&rotation, Some("Foo")).unwrap().gamename, "Bar");
        assert_eq!(next_package(&rotation, Some("Bar")).unwrap().gamename, "Foo");
    }

    #[tokio::test]
    async fn presets_without_a_platform_slug_are_skipped() {
        let fx = fixture();
        let engine = FakeEngine::default();
        let fetcher = FakeFetcher {
            files: vec![
                ("project.godot", PROJECT),
                (
                    "export_presets.cfg",
                    "[preset.0]\nname=\"Odd\"\nplatform=\"///\"\n\n\
                     [preset.1]\nname=\"Linux Export\"\nplatform=\"Linux/X11\"\n",
                ),
            ],
            error: None,
        };
        let builder = ExportBuilder::new(fetcher, engine.clone(), fx.storage.clone(), &fx.workspace);

        let output = builder.build(URL).await.unwrap();

        let packages = output.packages();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].filename, "foo-linuxx11.pck");
        assert!(packages.iter().all(|p| !p.platform.is_empty()));
        assert_eq!(*engine.calls.lock().unwrap(), ["export Linux Export"]);
    }

    #[tokio::test]
    async fn only_unusable_platforms_means_nothing_to_export() {
        let fx = fixture();
        let engine = FakeEngine::default();
        let fetcher = FakeFetcher {
            files: vec![
                ("project.godot", PROJECT),
                ("export_presets.cfg", "[preset.0]\nname=\"Odd\"\nplatform=\"--\"\n"),
            ],
            error: None,
        };
        let builder = ExportBuilder::new(fetcher, engine.clone(), fx.storage.clone(), &fx.workspace);

        assert_eq!(
            builder.build(URL).await.unwrap(),
            BuildOutput::Skipped(SkipReason::NoPresets)
        );
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_artifact_fails_the_build() {
        let fx = fixture();
        let engine = FakeEngine {
            no_artifact: true,
            ..Default::default()
        };
        let builder = ExportBuilder::new(godot_project(), engine, fx.storage.clone(), &fx.workspace);

        let err = builder.build(URL).await.unwrap_err();

        assert!(
            matches!(&err, BuildError::Storage { filename, .. } if filename == "foo-linuxx11.pck")
        );
        assert!(!err.is_retryable());
        assert!(!fx.storage.package_path("foo-linuxx11.pck").exists());
        assert!(!fx.workspace.exists());
    }
}
