use std::collections::HashSet;

use futures::future::join_all;

use crate::{performance::Probe, HealthSnapshot, Instance};

/// Probe the first `max_to_test` instances concurrently and rank the survivors
/// fastest first. Waits for every probe to settle before ranking.
pub async fn rank_instances<P>(probe: &P, instances: &[Instance], max_to_test: usize) -> HealthSnapshot
where
    P: Probe + ?Sized,
{
    let window = max_to_test.min(instances.len());
    if window == 0 {
        return HealthSnapshot::new();
    }

    let mut seen = HashSet::new();
    let to_test: Vec<&Instance> = instances[..window]
        .iter()
        .filter(|instance| seen.insert(*instance))
        .collect();

    tracing::info!(count = to_test.len(), "Health checking instances");

    let futures: Vec<_> = to_test
        .iter()
        .map(|instance| probe.check(instance))
        .collect();

    let mut healthy: Vec<_> = join_all(futures).await.into_iter().flatten().collect();

    // sort_by_key is stable, equal latencies keep configured order
    healthy.sort_by_key(|outcome| outcome.latency_ms);

    if healthy.is_empty() {
        tracing::warn!(probed = to_test.len(), "No healthy instances found");
    } else {
        for outcome in &healthy {
            tracing::info!(
                instance = %outcome.instance,
                latency_ms = outcome.latency_ms,
                "Healthy instance"
            );
        }
    }

    HealthSnapshot::from_ranked(healthy)
}
