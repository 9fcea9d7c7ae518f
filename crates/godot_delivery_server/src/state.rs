use crate::queue::BuildQueue;
use crate::server::DeliveryServerConfig;

use godot_delivery_cache::MetadataCache;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cache: MetadataCache,
    pub queue: BuildQueue,
    pub config: Arc<DeliveryServerConfig>,
}
