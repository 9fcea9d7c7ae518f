use crate::{api, prelude::*};

use godot_delivery_cache::MetadataCache;
use godot_delivery_core::prelude::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// The builder for the delivery server.
#[derive(Clone, Debug)]
pub struct DeliveryServer {
    config: DeliveryServerConfig,
}

impl DeliveryServer {
    pub fn new(config: DeliveryServerConfig) -> Self {
        Self { config }
    }
}

#[derive(Clone, Debug)]
pub struct DeliveryServerConfig {
    /// Password of the `manager` user. An empty password locks `add-repository`.
    pub manager_password: String,
    /// Externally visible base URL, prefixed to download links.
    pub base_url: String,
    /// Directory served by the download route.
    pub pcks_dir: PathBuf,
    /// Platforms accepted by `next-game`.
    ///
    /// Defaults to [`DEFAULT_PLATFORMS`].
    pub platforms: Vec<Platform>,
    /// Submissions allowed to wait behind the running build.
    ///
    /// Defaults to `16`.
    pub queue_capacity: usize,
}

impl DeliveryServerConfig {
    pub fn new(
        manager_password: impl Into<String>,
        base_url: impl Into<String>,
        pcks_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            manager_password: manager_password.into(),
            base_url: base_url.into(),
            pcks_dir: pcks_dir.into(),
            platforms: DEFAULT_PLATFORMS
                .iter()
                .map(|label| Platform::from_label(label))
                .collect(),
            queue_capacity: 16,
        }
    }

    pub fn with_platforms<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.platforms = labels
            .into_iter()
            .map(|label| Platform::from_label(label.as_ref()))
            .filter(|platform| !platform.is_empty())
            .collect();
        self
    }

    /// `<base_url>/godot-delivery/download/<filename>`
    pub fn download_url(&self, filename: &str) -> String {
        format!(
            "{}{}/{filename}",
            self.base_url.trim_end_matches('/'),
            routes::DOWNLOAD
        )
    }
}

impl DeliveryServer {
    /// Spawns the build worker and returns the router. Must be called within a tokio runtime.
    pub fn build<B: PackageBuilder>(self, builder: B, cache: MetadataCache) -> Router {
        let config = self.config;
        let queue = BuildQueue::spawn(builder, cache.clone(), config.queue_capacity);
        let downloads = ServeDir::new(&config.pcks_dir);

        Router::new()
            .route(routes::HEALTH, get(|| async { "OK" }))
            .route(routes::ADD_REPOSITORY, post(api::add_repository))
            .route(routes::NEXT_GAME, get(api::next_game))
            .nest_service(routes::DOWNLOAD, downloads)
            .layer(TraceLayer::new_for_http())
            .with_state(AppState {
                cache,
                queue,
                config: Arc::new(config),
            })
    }
}
