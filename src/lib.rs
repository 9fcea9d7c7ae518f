//! # Godot Delivery
//!
//! Builds godot projects straight from their git repositories and hands the exported pack files
//! to clients, one game after another per platform.
//!
//! This crate serves as an entry point, re-exporting the core types and
//! optionally including the server and the export pipeline via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`server`** | Includes the Axum-based server implementation (`godot_delivery_server`). |
//! | **`builder`** | Includes the git + engine export pipeline (`godot_delivery_builder`). |
//!
//! The metadata cache (`godot_delivery_cache`) and storage layout (`godot_delivery_fs`) are always included.
//!
//! ## Example: Custom Server
//!
//! ```rust,no_run
//! use godot_delivery::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = PackageStorage::new("./delivery_data");
//!     let cache = MetadataCache::restore(storage.cache_file()).await;
//!
//!     let builder = ExportBuilder::new(
//!         GitFetcher::default(),
//!         GodotCli::new("godot", EngineFlavor::Godot4, Duration::from_secs(900)),
//!         storage.clone(),
//!         "/tmp/godot-delivery",
//!     );
//!
//!     // Build
//!     let config = DeliveryServerConfig::new("manager-password", "https://games.example.com", storage.pcks_dir());
//!     let app = DeliveryServer::new(config).build(builder, cache);
//!
//!     // Serve
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub use godot_delivery_core::*;

pub mod fs {
    pub use godot_delivery_fs::*;
}

pub mod cache {
    pub use godot_delivery_cache::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use godot_delivery_server::*;
}

#[cfg(feature = "builder")]
pub mod builder {
    pub use godot_delivery_builder::*;
}

pub mod prelude {
    pub use godot_delivery_core::prelude::*;

    pub use godot_delivery_cache::MetadataCache;
    pub use godot_delivery_fs::PackageStorage;

    #[cfg(feature = "server")]
    pub use godot_delivery_server::prelude::*;

    #[cfg(feature = "builder")]
    pub use godot_delivery_builder::{EngineFlavor, ExportBuilder, GitFetcher, GodotCli};
}
