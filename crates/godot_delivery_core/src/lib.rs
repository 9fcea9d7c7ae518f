//! # Godot Delivery Core
//!
//! Types and traits shared by the delivery server crates.
//!
//! - **[`PckMetadata`](package::PckMetadata)**: Metadata of one exported package, keyed by its [`Platform`](package::Platform) slug.
//! - **[`next_index`](rotation::next_index)**: Round-robin selection over a platform's packages.
//! - **[`PackageBuilder`](traits::PackageBuilder)**: Trait for the repository -> packages pipeline.
//! - **[`RepositoryFetcher`](traits::RepositoryFetcher)** and **[`EngineToolchain`](traits::EngineToolchain)**: Seams to git and the engine CLI.

pub mod build;
pub mod constants;
pub mod error;
pub mod package;
pub mod rotation;
pub mod traits;

pub mod prelude {
    pub use super::build::*;
    pub use super::constants::*;
    pub use super::error::*;
    pub use super::package::*;
    pub use super::rotation::*;
    pub use super::traits::*;
}
