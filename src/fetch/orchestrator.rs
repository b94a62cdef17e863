use crate::{error::FetchFailure, fetch::Fetcher, Instance, LookoutError, PostRecord, Result};

const NOTHING_TRIED: &str = "no instances to try";

/// Try each instance in `order` one at a time until one returns a post.
///
/// Per-instance failures are logged and collected; only running out of
/// instances is an error. Each instance gets exactly one attempt.
pub async fn fetch_with_fallback<F>(order: &[Instance], handle: &str, fetcher: &F) -> Result<PostRecord>
where
    F: Fetcher + ?Sized,
{
    let mut failures: Vec<FetchFailure> = Vec::new();

    for (attempt, instance) in order.iter().enumerate() {
        tracing::info!(
            instance = %instance,
            attempt = attempt + 1,
            of = order.len(),
            "Trying instance"
        );

        match fetcher.fetch(instance, handle).await {
            Ok(post) => {
                tracing::info!(instance = %instance, url = %post.content_url, "Fetched latest post");
                return Ok(post);
            }
            Err(e) => {
                tracing::warn!(instance = %instance, error = %e, "Instance failed");
                failures.push(FetchFailure {
                    instance: instance.clone(),
                    cause: e.to_string(),
                });
            }
        }
    }

    let last_cause = failures
        .last()
        .map(|failure| failure.cause.clone())
        .unwrap_or_else(|| NOTHING_TRIED.to_string());

    Err(LookoutError::AllInstancesFailed {
        attempts: order.len(),
        last_cause,
        failures,
    })
}
