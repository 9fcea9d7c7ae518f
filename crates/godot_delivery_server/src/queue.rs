use godot_delivery_cache::MetadataCache;
use godot_delivery_core::prelude::*;

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

struct BuildTask {
    repository: String,
    reply: oneshot::Sender<Result<BuildOutput, BuildError>>,
}

/// Hands repository submissions to a single build worker.
///
/// The worker runs fetch, export, ingest and persist for one submission at a time, so builds
/// never share the workspace concurrently. Rotation reads only wait for the in-memory ingest.
#[derive(Clone)]
pub struct BuildQueue {
    sender: mpsc::Sender<BuildTask>,
}

impl BuildQueue {
    /// Spawns the worker on the current runtime.
    ///
    /// At most `capacity` submissions wait behind the running one, further ones wait for a slot.
    pub fn spawn<B: PackageBuilder>(builder: B, cache: MetadataCache, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_worker(builder, cache, receiver));
        Self { sender }
    }

    /// Queues `repository` and waits for its build to finish.
    pub async fn submit(&self, repository: String) -> Result<BuildOutput, BuildError> {
        let (reply, response) = oneshot::channel();

        self.sender
            .send(BuildTask { repository, reply })
            .await
            .map_err(|_| BuildError::Unavailable("build worker stopped".into()))?;

        response
            .await
            .map_err(|_| BuildError::Unavailable("build worker dropped the task".into()))?
    }
}

async fn run_worker<B: PackageBuilder>(
    builder: B,
    cache: MetadataCache,
    mut receiver: mpsc::Receiver<BuildTask>,
) {
    while let Some(BuildTask { repository, reply }) = receiver.recv().await {
        info!(%repository, "building repository");

        let result = builder.build(&repository).await;

        if let Ok(BuildOutput::Packages(packages)) = &result {
            if !packages.is_empty() {
                let summary = cache.ingest(packages.clone()).await;
                info!(%repository, removed = summary.removed, added = summary.added, "cache updated");
                cache.persist().await;
            }
        }

        if reply.send(result).is_err() {
            warn!(%repository, "build finished after its request was dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails the test if two builds overlap.
    #[derive(Clone, Default)]
    struct ExclusiveBuilder {
        running: Arc<AtomicUsize>,
        overlaps: Arc<AtomicUsize>,
    }

    impl PackageBuilder for ExclusiveBuilder {
        async fn build(&self, repository: &str) -> Result<BuildOutput, BuildError> {
            if self.running.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            let platform = Platform::from_label("Linux/X11");
            Ok(BuildOutput::Packages(vec![PckMetadata {
                filename: package_filename(repository, &platform),
                platform,
                origin_repository: repository.to_string(),
                gamename: repository_base_name(repository).to_string(),
                main_scene: String::new(),
            }]))
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_build_one_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join("cache.json"));
        let builder = ExclusiveBuilder::default();
        let queue = BuildQueue::spawn(builder.clone(), cache.clone(), 8);

        let submissions = (0..4).map(|i| {
            let queue = queue.clone();
            tokio::spawn(async move { queue.submit(format!("https://example.com/game{i}.git")).await })
        });
        for handle in submissions.collect::<Vec<_>>() {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(builder.overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(cache.len().await, 4);
        assert!(dir.path().join("cache.json").exists());
    }
}
