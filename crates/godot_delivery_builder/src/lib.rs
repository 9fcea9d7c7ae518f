//! # Godot Delivery Builder
//!
//! Turns a repository URL into exported pack files.
//!
//! 1. [`GitFetcher`] clones the repository into a fresh [`Workspace`].
//! 2. [`Project`] reads the export presets and the game's name and main scene.
//! 3. [`GodotCli`] exports every preset, [`ExportBuilder`] moves each pack into storage as
//!    `<repo>-<platform>.pck` and emits its [`PckMetadata`](godot_delivery_core::package::PckMetadata).
//!
//! Every external command runs with a timeout and is killed when it expires.
//!
//! ## Usage
//!
//! ```no_run
//! use godot_delivery_builder::*;
//! use godot_delivery_core::prelude::*;
//! use godot_delivery_fs::PackageStorage;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), BuildError> {
//! let builder = ExportBuilder::new(
//!     GitFetcher::default(),
//!     GodotCli::new("godot", EngineFlavor::Godot3, Duration::from_secs(900)),
//!     PackageStorage::new("./delivery_data"),
//!     "/tmp/godot-delivery",
//! );
//!
//! let output = builder.build("https://example.com/foo.git").await?;
//! # Ok(())
//! # }
//! ```

pub mod cfg;
mod export;
mod fetch;
mod godot;
mod process;
mod project;
mod workspace;

pub use export::ExportBuilder;
pub use fetch::GitFetcher;
pub use godot::{EngineFlavor, GodotCli};
pub use project::{ExportPreset, GameInfo, Project};
pub use workspace::Workspace;
