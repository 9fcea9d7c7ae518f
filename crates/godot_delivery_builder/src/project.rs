use crate::cfg::ConfigFile;

use godot_delivery_core::prelude::*;

use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// An export preset, in the order of `export_presets.cfg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPreset {
    pub name: String,
    /// The engine's platform label, e.g. `Linux/X11`.
    pub platform: String,
}

/// Name and entry scene declared in `project.godot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub name: String,
    pub main_scene: String,
}

/// A fetched engine project.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a managed (C#) project file sits at the project root.
    pub async fn has_managed_project(&self) -> bool {
        let Ok(mut dir) = tokio::fs::read_dir(&self.root).await else {
            return false;
        };

        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == files::MANAGED_PROJECT_EXTENSION)
            {
                return true;
            }
        }

        false
    }

    /// Presets `preset.0`, `preset.1`, ... up to the first missing section or incomplete preset.
    ///
    /// Empty when `export_presets.cfg` is absent.
    pub async fn export_presets(&self) -> Vec<ExportPreset> {
        let path = self.root.join(files::EXPORT_PRESETS_FILE);
        let cfg = match ConfigFile::load(&path).await {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unable to read export presets");
                return Vec::new();
            }
        };

        read_presets(&cfg)
    }

    /// Game name and main scene, [`None`] without `project.godot` or a non-empty name.
    pub async fn game_info(&self) -> Option<GameInfo> {
        let path = self.root.join(files::PROJECT_FILE);
        let cfg = match ConfigFile::load(&path).await {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(path = %path.display(), error = %err, "unable to read project settings");
                return None;
            }
        };

        read_game_info(&cfg)
    }
}

fn read_presets(cfg: &ConfigFile) -> Vec<ExportPreset> {
    let mut presets = Vec::new();

    for index in 0.. {
        let section = format!("preset.{index}");
        let preset = cfg.get_string(&section, "name").and_then(|name| {
            cfg.get_string(&section, "platform")
                .map(|platform| ExportPreset { name, platform })
        });

        match preset {
            Ok(preset) => presets.push(preset),
            Err(_) => break,
        }
    }

    presets
}

fn read_game_info(cfg: &ConfigFile) -> Option<GameInfo> {
    let name = match cfg.get_string("application", "config/name") {
        Ok(name) if !name.trim().is_empty() => name,
        Ok(_) => {
            error!("empty game name");
            return None;
        }
        Err(err) => {
            error!(error = %err, "unable to get game name");
            return None;
        }
    };

    let main_scene = cfg
        .get_string("application", "run/main_scene")
        .unwrap_or_else(|err| {
            warn!(error = %err, "unable to get main scene");
            String::new()
        });

    Some(GameInfo { name, main_scene })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: &str = r#"[preset.0]

name="Linux Export"
platform="Linux/X11"
runnable=true
export_path=""

[preset.0.options]

texture_format/s3tc=true

[preset.1]

name="Win Export"
platform="Windows Desktop"
runnable=true

[preset.1.options]

binary_format/64_bits=true
"#;

    #[test]
    fn presets_in_declaration_order() {
        let presets = read_presets(&ConfigFile::parse(PRESETS));

        assert_eq!(
            presets,
            vec![
                ExportPreset {
                    name: "Linux Export".into(),
                    platform: "Linux/X11".into()
                },
                ExportPreset {
                    name: "Win Export".into(),
                    platform: "Windows Desktop".into()
                },
            ]
        );
    }

    #[test]
    fn presets_stop_at_first_incomplete_entry() {
        let cfg = ConfigFile::parse(
            "[preset.0]\nname=\"A\"\nplatform=\"HTML5\"\n[preset.1]\nname=\"B\"\n[preset.2]\nname=\"C\"\nplatform=\"Android\"\n",
        );
        let presets = read_presets(&cfg);

        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].platform, "HTML5");

        assert!(read_presets(&ConfigFile::parse("[preset.0]\nplatform=\"HTML5\"\n")).is_empty());
    }

    #[test]
    fn game_info_requires_a_name() {
        let cfg = ConfigFile::parse(
            "[application]\nconfig/name=\"Foo\"\nrun/main_scene=\"res://main.tscn\"\n",
        );
        assert_eq!(
            read_game_info(&cfg),
            Some(GameInfo {
                name: "Foo".into(),
                main_scene: "res://main.tscn".into()
            })
        );

        let no_scene = ConfigFile::parse("[application]\nconfig/name=\"Foo\"\n");
        assert_eq!(read_game_info(&no_scene).unwrap().main_scene, "");

        assert!(read_game_info(&ConfigFile::parse("[application]\nconfig/name=\"\"\n")).is_none());
        assert!(read_game_info(&ConfigFile::parse("[rendering]\n")).is_none());
    }

    #[tokio::test]
    async fn missing_files_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::new(dir.path());

        assert!(project.export_presets().await.is_empty());
        assert!(project.game_info().await.is_none());
        assert!(!project.has_managed_project().await);
    }

    #[tokio::test]
    async fn detects_managed_project_marker() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("Foo.csproj"), b"<Project />")
            .await
            .unwrap();

        assert!(Project::new(dir.path()).has_managed_project().await);
    }
}
