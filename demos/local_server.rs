//! # Local Server Example
//!
//! Runs the delivery server against a local storage directory, using `git` and `godot` from `PATH`.
//!
//! ## Usage
//!
//! ```sh
//! AUTH_PW=secret cargo run --example local_server
//!
//! curl -u manager:secret -H 'Content-Type: application/json' \
//!     -d '{"repository": "https://github.com/user/game.git"}' \
//!     http://localhost:3000/godot-delivery/add-repository
//! curl 'http://localhost:3000/godot-delivery/next-game?platform=linuxx11'
//! ```

use godot_delivery::prelude::*;
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Storage & Cache
    let storage = PackageStorage::new("./delivery_data");
    storage.ensure_layout().await.unwrap();
    let cache = MetadataCache::restore(storage.cache_file()).await;

    // Export pipeline, Godot 4 command line
    let builder = ExportBuilder::new(
        GitFetcher::default(),
        GodotCli::new("godot", EngineFlavor::Godot4, Duration::from_secs(900)),
        storage.clone(),
        env::temp_dir().join("godot-delivery-demo"),
    );

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let password = env::var("AUTH_PW").unwrap_or_default();
    let config = DeliveryServerConfig::new(password, format!("http://localhost:{port}"), storage.pcks_dir());

    // Build App
    let app = DeliveryServer::new(config).build(builder, cache.clone());

    // Serve
    let addr = format!("0.0.0.0:{port}");
    println!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();

    cache.persist().await;
}
