use std::sync::Arc;

use crate::{
    cache::HealthCache,
    config::NormalizedConfig,
    fetch::{fetch_with_fallback, Fetcher, RssFetcher},
    notify::Notifier,
    performance::{HttpProbe, Probe},
    store::LastSeenStore,
    strategy::fallback_order,
    HealthSnapshot, Instance, PostRecord, Result, RunOutcome, Strategy,
};

pub struct Lookout {
    config: NormalizedConfig,
    cache: Arc<HealthCache>,
    probe: Arc<dyn Probe>,
    fetcher: Arc<dyn Fetcher>,
}

impl Lookout {
    pub fn new(config: NormalizedConfig, probe: Arc<dyn Probe>, fetcher: Arc<dyn Fetcher>) -> Self {
        let cache = Arc::new(HealthCache::new(config.cache_ttl));
        Self::with_cache(config, probe, fetcher, cache)
    }

    /// Share one cache between several handlers, or inject one with a test clock.
    pub fn with_cache(
        config: NormalizedConfig,
        probe: Arc<dyn Probe>,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<HealthCache>,
    ) -> Self {
        Self { config, cache, probe, fetcher }
    }

    /// HTTP probe and RSS fetcher built from the config.
    pub fn from_config(config: NormalizedConfig) -> Self {
        let probe = Arc::new(HttpProbe::new(&config.probe));
        let fetcher = Arc::new(RssFetcher::new(
            config.fetch_timeout,
            config.probe.scheme.clone(),
            config.probe.user_agent.clone(),
        ));
        Self::new(config, probe, fetcher)
    }

    pub fn config(&self) -> &NormalizedConfig {
        &self.config
    }

    pub fn health_cache(&self) -> Arc<HealthCache> {
        Arc::clone(&self.cache)
    }

    pub async fn healthy_instances(&self) -> HealthSnapshot {
        self.cache
            .get_or_refresh(
                self.probe.as_ref(),
                &self.config.instances,
                self.config.health_check_count,
            )
            .await
    }

    pub async fn fallback_order(&self) -> Vec<Instance> {
        match self.config.strategy {
            Strategy::Ranked => {
                let healthy = self.healthy_instances().await;
                let order = fallback_order(&self.config.instances, &healthy);
                tracing::info!(
                    total = order.len(),
                    healthy = healthy.len(),
                    "Built fallback order"
                );
                order
            }
            Strategy::Configured => self.config.instances.clone(),
        }
    }

    pub async fn fetch_latest(&self, handle: &str) -> Result<PostRecord> {
        let order = self.fallback_order().await;
        fetch_with_fallback(&order, handle, self.fetcher.as_ref()).await
    }

    /// Fetch the newest post and deliver it unless it was delivered before.
    /// The last-seen id is only written after a successful delivery.
    pub async fn run_once<N>(&self, handle: &str, store: &LastSeenStore, notifier: &N) -> Result<RunOutcome>
    where
        N: Notifier + ?Sized,
    {
        let last_seen = store.read(handle).await?;
        let post = self.fetch_latest(handle).await?;

        if last_seen.as_deref() == Some(post.content_url.as_str()) {
            tracing::info!(handle, url = %post.content_url, "No new post");
            return Ok(RunOutcome::Unchanged(post));
        }

        tracing::info!(
            handle,
            author = %post.author_handle,
            url = %post.content_url,
            has_media = post.media_url.is_some(),
            "New post detected"
        );

        notifier.deliver(&post).await?;
        store.write(handle, &post.content_url).await?;

        Ok(RunOutcome::Delivered(post))
    }

    pub fn clear_health_cache(&self) {
        self.cache.clear();
    }
}
