// src/services/coordinator.rs

//! Bounded fan-out of URL canonicalization.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::canonicalizer::{Canonical, UrlCanonicalizer};
use crate::models::ResolverConfig;

/// Summary of a canonicalization batch.
#[derive(Debug, Default)]
pub struct CanonicalizeOutcome {
    /// Canonical URL per input, in input order
    pub urls: Vec<String>,
    pub unchanged: usize,
    pub rewritten: usize,
    pub resolved: usize,
    /// Resolutions that gave up and kept the original URL
    pub failed: usize,
    /// Tasks that panicked or were cancelled and kept the original URL
    pub faulted: usize,
}

/// Runs canonicalization for many URLs over a fixed-size worker pool.
pub struct ConcurrencyCoordinator {
    canonicalizer: Arc<UrlCanonicalizer>,
    pool_size: usize,
    progress_interval: usize,
}

impl ConcurrencyCoordinator {
    pub fn new(config: &ResolverConfig, canonicalizer: Arc<UrlCanonicalizer>) -> Self {
        Self {
            canonicalizer,
            pool_size: config.pool_size.max(1),
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Canonicalize every URL and return them in input order.
    ///
    /// Each URL runs in its own task, so a fault in one never reaches
    /// the others; that URL simply keeps its original value.
    pub async fn canonicalize_all(&self, urls: &[String]) -> CanonicalizeOutcome {
        let total = urls.len();
        let mut outcome = CanonicalizeOutcome::default();
        let mut results: Vec<Option<String>> = vec![None; total];
        let mut done = 0;

        let mut tasks = stream::iter(urls.iter().cloned().enumerate())
            .map(|(idx, url)| {
                let canonicalizer = Arc::clone(&self.canonicalizer);
                let handle =
                    tokio::spawn(async move { canonicalizer.try_canonicalize(&url).await });
                async move { (idx, handle.await) }
            })
            .buffer_unordered(self.pool_size);

        while let Some((idx, joined)) = tasks.next().await {
            let original = &urls[idx];
            let url = match joined {
                Ok(Ok(canonical)) => {
                    match &canonical {
                        Canonical::Unchanged => outcome.unchanged += 1,
                        Canonical::Rewritten(_) => outcome.rewritten += 1,
                        Canonical::Resolved(_) => outcome.resolved += 1,
                    }
                    canonical.into_url(original)
                }
                Ok(Err(e)) => {
                    outcome.failed += 1;
                    log::debug!("Keeping original URL for record {}: {}", idx, e);
                    original.clone()
                }
                Err(e) => {
                    outcome.faulted += 1;
                    log::warn!("Canonicalization task for record {} faulted: {}", idx, e);
                    original.clone()
                }
            };
            results[idx] = Some(url);

            done += 1;
            if done % self.progress_interval == 0 {
                log::info!("  ... {}/{} URLs canonicalized", done, total);
            }
        }

        outcome.urls = results
            .into_iter()
            .zip(urls)
            .map(|(result, original)| result.unwrap_or_else(|| original.clone()))
            .collect();
        outcome
    }
}
