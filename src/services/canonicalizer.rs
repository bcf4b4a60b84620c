// src/services/canonicalizer.rs

//! Reference URL canonicalization.
//!
//! Rules, first match wins:
//! 1. empty URL: unchanged
//! 2. already a mobile host: unchanged
//! 3. desktop host: rewritten to its mobile host, no network
//! 4. short link: resolved (bounded attempts), then rule 3 on the result
//! 5. anything else: unchanged

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{HostRewrite, ResolverConfig};
use crate::utils::http::RedirectResolver;
use crate::utils::mentions_any;

/// Outcome of a successful canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonical {
    /// Input is already canonical or not a known form
    Unchanged,
    /// Desktop host replaced by its mobile host
    Rewritten(String),
    /// Short link followed to its final URL
    Resolved(String),
}

impl Canonical {
    /// The canonical URL, falling back to `original` when unchanged.
    pub fn into_url(self, original: &str) -> String {
        match self {
            Canonical::Unchanged => original.to_string(),
            Canonical::Rewritten(url) | Canonical::Resolved(url) => url,
        }
    }
}

/// Rewrites and resolves place URLs to their mobile-web form.
pub struct UrlCanonicalizer {
    resolver: Arc<dyn RedirectResolver>,
    mobile_hosts: Vec<String>,
    host_rewrites: Vec<HostRewrite>,
    short_link_hosts: Vec<String>,
    attempts: u32,
}

impl UrlCanonicalizer {
    pub fn new(config: &ResolverConfig, resolver: Arc<dyn RedirectResolver>) -> Self {
        Self {
            resolver,
            mobile_hosts: config.mobile_hosts.clone(),
            host_rewrites: config.host_rewrites.clone(),
            short_link_hosts: config.short_link_hosts.clone(),
            attempts: config.attempts.max(1),
        }
    }

    /// Canonicalize, reporting resolution failure as an error.
    pub async fn try_canonicalize(&self, url: &str) -> Result<Canonical> {
        if url.is_empty() || self.is_mobile(url) {
            return Ok(Canonical::Unchanged);
        }
        if let Cow::Owned(rewritten) = self.rewrite_hosts(url) {
            return Ok(Canonical::Rewritten(rewritten));
        }
        if mentions_any(url, &self.short_link_hosts) {
            let resolved = self.resolve_with_retry(url).await?;
            return Ok(Canonical::Resolved(self.rewrite_hosts(&resolved).into_owned()));
        }
        Ok(Canonical::Unchanged)
    }

    /// Canonicalize, keeping the original URL on any failure.
    pub async fn canonicalize(&self, url: &str) -> String {
        match self.try_canonicalize(url).await {
            Ok(canonical) => canonical.into_url(url),
            Err(e) => {
                log::debug!("Keeping original URL: {}", e);
                url.to_string()
            }
        }
    }

    fn is_mobile(&self, url: &str) -> bool {
        mentions_any(url, &self.mobile_hosts)
    }

    /// Apply every desktop rewrite whose mobile host is not already present.
    fn rewrite_hosts<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if self.is_mobile(url) {
            return Cow::Borrowed(url);
        }
        let mut current = Cow::Borrowed(url);
        for rule in &self.host_rewrites {
            if current.contains(rule.from.as_str()) && !current.contains(rule.to.as_str()) {
                current = Cow::Owned(current.replace(rule.from.as_str(), &rule.to));
            }
        }
        current
    }

    async fn resolve_with_retry(&self, url: &str) -> Result<String> {
        let mut last_error = String::new();
        for attempt in 1..=self.attempts {
            match self.resolver.resolve(url).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) => {
                    log::debug!(
                        "Resolve attempt {}/{} for {} failed: {}",
                        attempt,
                        self.attempts,
                        url,
                        e
                    );
                    last_error = e.to_string();
                }
            }
        }
        Err(AppError::Resolve {
            url: url.to_string(),
            attempts: self.attempts,
            message: last_error,
        })
    }
}
