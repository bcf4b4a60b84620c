// src/utils/http.rs

//! HTTP transport for the page fetch and short-link resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Redirect hops followed before a resolution is abandoned.
const MAX_REDIRECTS: usize = 10;

/// Fetches the source page body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Single attempt. Non-2xx responses still return their body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Follows a URL's redirect chain.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    /// Final URL after redirects.
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// `reqwest`-backed transport with separate desktop and mobile identities.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    page_user_agent: String,
    page_timeout: Duration,
    resolve_user_agent: String,
    resolve_timeout: Duration,
}

impl HttpClient {
    /// Create a client configured from the source and resolver settings.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            page_user_agent: config.source.user_agent.clone(),
            page_timeout: config.source.timeout(),
            resolve_user_agent: config.resolver.user_agent.clone(),
            resolve_timeout: config.resolver.timeout(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.page_user_agent)
            .timeout(self.page_timeout)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Source page {} answered {}, using body anyway", url, status);
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}

#[async_trait]
impl RedirectResolver for HttpClient {
    async fn resolve(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .head(url)
            .header(USER_AGENT, &self.resolve_user_agent)
            .timeout(self.resolve_timeout)
            .send()
            .await?;
        Ok(response.url().to_string())
    }
}
