// src/pipeline/crawl.rs

//! Fetch, extract, canonicalize and publish one snapshot.

use std::sync::Arc;
use std::time::Instant;

use chrono::{FixedOffset, Utc};

use crate::error::{AppError, Result};
use crate::models::{Config, RawRecord, Snapshot};
use crate::services::{
    ConcurrencyCoordinator, EmbeddedArrayExtractor, UrlCanonicalizer, decode, normalize,
};
use crate::storage::{LocalStorage, SnapshotSink, WriteSummary};
use crate::utils::http::{HttpClient, PageFetcher, RedirectResolver};
use crate::utils::log;

const TOTAL_STEPS: usize = 4;

/// One configured snapshot pipeline.
pub struct Pipeline {
    config: Config,
    timezone: FixedOffset,
    extractor: EmbeddedArrayExtractor,
    fetcher: Arc<dyn PageFetcher>,
    coordinator: ConcurrencyCoordinator,
    sink: Arc<dyn SnapshotSink>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        resolver: Arc<dyn RedirectResolver>,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self> {
        config.validate()?;
        let timezone = config.output.timezone()?;
        let extractor = EmbeddedArrayExtractor::new(&config.source.array_key)?;
        let canonicalizer = Arc::new(UrlCanonicalizer::new(&config.resolver, resolver));
        let coordinator = ConcurrencyCoordinator::new(&config.resolver, canonicalizer);

        Ok(Self {
            config,
            timezone,
            extractor,
            fetcher,
            coordinator,
            sink,
        })
    }

    /// Locate, unescape and decode the embedded records of a page.
    pub fn records_from_page(&self, page: &str) -> Result<Vec<RawRecord>> {
        let array = self.extractor.extract(page)?;
        ::log::info!(
            "Found \"{}\" array at byte {} ({:?}, {:?}, {} bytes)",
            self.extractor.key(),
            array.start,
            array.strategy,
            array.escaping,
            array.text.len()
        );

        let json = normalize(&array);
        decode(&json)
    }

    /// Run every stage up to, but not including, the write.
    pub async fn build_snapshot(&self) -> Result<Snapshot> {
        let url = &self.config.source.url;

        log::step(1, TOTAL_STEPS, &format!("Fetching {url}"));
        let page = self.fetcher.fetch(url).await?;
        log::sub_item(&format!("Page loaded ({} bytes)", page.len()));

        log::step(2, TOTAL_STEPS, "Extracting embedded records");
        let mut records = self.records_from_page(&page)?;
        log::sub_item(&format!("{} records decoded", records.len()));

        log::step(3, TOTAL_STEPS, "Canonicalizing reference URLs");
        let urls: Vec<String> = records.iter().map(|r| r.reference_url.clone()).collect();
        let outcome = self.coordinator.canonicalize_all(&urls).await;
        log::sub_item(&format!(
            "{} rewritten, {} resolved, {} unchanged, {} kept after failure",
            outcome.rewritten,
            outcome.resolved,
            outcome.unchanged,
            outcome.failed + outcome.faulted
        ));
        for (record, url) in records.iter_mut().zip(outcome.urls) {
            record.reference_url = url;
        }

        Ok(Snapshot::build(
            records,
            Utc::now().with_timezone(&self.timezone),
        ))
    }

    /// Build a snapshot and write it. Nothing is written on failure.
    pub async fn run(&self) -> Result<WriteSummary> {
        let snapshot = match self.build_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if let AppError::Decode { sample, .. } = &e {
                    ::log::error!("JSON sample (first chars): {}", sample);
                }
                ::log::error!("Run aborted, previous snapshot left in place: {}", e);
                return Err(e);
            }
        };
        debug_assert!(snapshot.is_consistent());

        log::step(4, TOTAL_STEPS, "Writing snapshot");
        self.sink.write_snapshot(&snapshot).await
    }
}

/// Run one snapshot pass against the live site and the local file sink.
pub async fn run_crawler(config: &Config) -> Result<WriteSummary> {
    let started = Instant::now();
    log::header("Cafe stock snapshot");

    let client = Arc::new(HttpClient::new(config)?);
    let storage = Arc::new(LocalStorage::new(&config.output.path));
    let pipeline = Pipeline::new(config.clone(), client.clone(), client, storage)?;

    let summary = pipeline.run().await?;

    log::summary(
        "Snapshot written",
        &[
            ("Total", summary.total_count.to_string()),
            ("Available", summary.available_count.to_string()),
            ("Size", format!("{} bytes", summary.bytes)),
            ("Location", summary.location.clone()),
            ("Elapsed", format!("{:.1}s", started.elapsed().as_secs_f64())),
        ],
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticPage(String);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct NoNetwork;

    #[async_trait]
    impl RedirectResolver for NoNetwork {
        async fn resolve(&self, url: &str) -> Result<String> {
            Err(AppError::validation(format!("no network for {url}")))
        }
    }

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<Snapshot>>);

    #[async_trait]
    impl SnapshotSink for MemorySink {
        async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteSummary> {
            self.0.lock().unwrap().push(snapshot.clone());
            Ok(WriteSummary {
                location: "memory".to_string(),
                bytes: snapshot.to_json()?.len(),
                total_count: snapshot.total_count,
                available_count: snapshot.available_count,
                timestamp: Utc::now(),
            })
        }

        async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
            Ok(self.0.lock().unwrap().last().cloned())
        }
    }

    fn pipeline(page: &str, sink: Arc<MemorySink>) -> Pipeline {
        Pipeline::new(
            Config::default(),
            Arc::new(StaticPage(page.to_string())),
            Arc::new(NoNetwork),
            sink,
        )
        .unwrap()
    }

    const ESCAPED_PAGE: &str = r#"<script>self.__next_f.push([1,"5:[\"$\",\"div\",null,{\"cafes\":[{\"name\":\"A\",\"lat\":1,\"lng\":2,\"stock_count\":3,\"naver_place_url\":\"\"},{\"name\":\"B\",\"lat\":3,\"lng\":4,\"stock_status\":\"SOLDOUT\",\"naver_place_url\":\"\"}],\"total\":2}]"])</script>"#;

    #[tokio::test]
    async fn test_end_to_end_escaped_page() {
        let sink = Arc::new(MemorySink::default());
        let summary = pipeline(ESCAPED_PAGE, Arc::clone(&sink)).run().await.unwrap();

        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.available_count, 1);

        let written = sink.load_snapshot().await.unwrap().unwrap();
        assert_eq!(written.records[0].name, "A");
        assert_eq!(written.records[0].signal, 3);
        assert_eq!(written.records[0].latitude, Coordinate::from(1));
        assert_eq!(written.records[0].longitude, Coordinate::from(2));
        assert_eq!(written.records[1].name, "B");
        assert_eq!(written.records[1].signal, 0);
        assert_eq!(written.generated_at.len(), "MM/DD HH:MM".len());
    }

    #[tokio::test]
    async fn test_unresolvable_short_link_keeps_original() {
        let page = r#"{"cafes":[{"name":"A","stock_count":1,"naver_place_url":"https://naver.me/abc"},
                              {"name":"B","stock_count":1,"naver_place_url":"https://place.naver.com/x"}]}"#;
        let sink = Arc::new(MemorySink::default());
        pipeline(page, Arc::clone(&sink)).run().await.unwrap();

        let written = sink.load_snapshot().await.unwrap().unwrap();
        assert_eq!(written.records[0].url, "https://naver.me/abc");
        assert_eq!(written.records[1].url, "https://m.place.naver.com/x");
    }

    #[tokio::test]
    async fn test_missing_marker_writes_nothing() {
        let sink = Arc::new(MemorySink::default());
        let err = pipeline("<html>maintenance</html>", Arc::clone(&sink))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Extraction { .. }));
        assert!(sink.load_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error_and_writes_nothing() {
        let sink = Arc::new(MemorySink::default());
        let err = pipeline(r#"{"cafes":[{"name":},{]}"#, Arc::clone(&sink))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Decode { .. }));
        assert!(sink.load_snapshot().await.unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.resolver.attempts = 0;
        let result = Pipeline::new(
            config,
            Arc::new(StaticPage(String::new())),
            Arc::new(NoNetwork),
            Arc::new(MemorySink::default()),
        );
        assert!(result.is_err());
    }
}
