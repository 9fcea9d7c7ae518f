//! # Godot Delivery Server
//!
//! An Axum-based server that builds pack files from submitted repositories and hands them out
//! to clients in rotation.
//!
//! Provides the [`DeliveryServer`] builder, which ties together a [`PackageBuilder`](godot_delivery_core::traits::PackageBuilder)
//! and a [`MetadataCache`](godot_delivery_cache::MetadataCache).
//!
//! ## Routes
//!
//! * **`POST /godot-delivery/add-repository`**: manager only (basic auth), body `{"repository": "<url>"}`.
//! * **`GET /godot-delivery/next-game?platform=<label>&gamename=<last>`**: the package after `<last>`.
//! * **`GET /godot-delivery/download/<filename>`**: raw package download.
//! * **`GET /health`**
//!
//! ## Example
//!
//! ```no_run
//! use godot_delivery_server::prelude::*;
//! use godot_delivery_builder::{ExportBuilder, GitFetcher, GodotCli, EngineFlavor};
//! use godot_delivery_cache::MetadataCache;
//! use godot_delivery_fs::PackageStorage;
//! use std::time::Duration;
//!
//! # async fn run() {
//! let storage = PackageStorage::new("./delivery_data");
//! let cache = MetadataCache::restore(storage.cache_file()).await;
//! let builder = ExportBuilder::new(
//!     GitFetcher::default(),
//!     GodotCli::new("godot", EngineFlavor::Godot3, Duration::from_secs(900)),
//!     storage.clone(),
//!     "/tmp/godot-delivery",
//! );
//!
//! let config = DeliveryServerConfig::new("secret", "https://games.example.com", storage.pcks_dir());
//! let app = DeliveryServer::new(config).build(builder, cache);
//! # }
//! ```

mod api;
mod queue;
mod server;

pub mod auth;
pub mod state;

pub use api::{AddRepositoryRequest, NextGameResponse};
pub use queue::BuildQueue;
pub use server::{DeliveryServer, DeliveryServerConfig};

pub mod prelude {
    pub use crate::auth::*;
    pub use crate::queue::BuildQueue;
    pub use crate::state::*;
    pub use crate::{DeliveryServer, DeliveryServerConfig};
}
