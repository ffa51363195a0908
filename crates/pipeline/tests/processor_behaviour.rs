//! End-to-end behaviour of the job processor against scripted upstreams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use tokio::sync::Mutex;

use mapwatch_cache::{CacheStore, InMemoryCache};
use mapwatch_core::cache_key::cache_key;
use mapwatch_core::error::JobError;
use mapwatch_core::osm::OsmResponse;
use mapwatch_core::payload::{JobPayload, DEFAULT_QUERY};
use mapwatch_pipeline::{DataFetcher, FixedWindowGate, JobProcessor};
use mapwatch_queue::Job;

/// Scripted upstream: counts calls, records queries, answers from a closure.
struct MockFetcher {
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    respond: Box<dyn Fn() -> Result<serde_json::Value, JobError> + Send + Sync>,
}

impl MockFetcher {
    fn new(
        respond: impl Fn() -> Result<serde_json::Value, JobError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataFetcher for MockFetcher {
    async fn fetch(&self, query: &str) -> Result<serde_json::Value, JobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().await.push(query.to_string());
        (self.respond)()
    }
}

fn processor(fetcher: Arc<MockFetcher>, cache: Arc<InMemoryCache>) -> JobProcessor {
    JobProcessor::new(
        fetcher,
        cache,
        Arc::new(FixedWindowGate::new(Duration::ZERO)),
    )
}

fn job_with_query(query: &str) -> Job {
    Job {
        id: "job-under-test".to_string(),
        name: "test-job".to_string(),
        payload: JobPayload::with_query(query),
        attempt: 1,
    }
}

/// A response body with `count` node elements.
fn body_with_elements(count: usize) -> serde_json::Value {
    let elements: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "type": "node",
                "id": i as i64 + 1,
                "lat": 51.45,
                "lon": -0.01,
            })
        })
        .collect();
    serde_json::json!({ "version": 0.6, "generator": "test", "elements": elements })
}

/// A ~0.1° x 0.1° box at latitude 51.45, ~77 km².
const LONDON_BOX_QUERY: &str = "[out:json];(way[\"building\"](51.4,-0.05,51.5,0.05););out;";

#[tokio::test]
async fn invalid_payload_fails_before_any_fetch() {
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(1)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), cache);

    let job = job_with_query("invalid query without required JSON tag");
    let err = processor.process(&job).await.unwrap_err();

    assert_matches!(err, JobError::PayloadInvalid(_));
    assert!(!err.is_recoverable());
    assert_eq!(fetcher.calls(), 0, "no upstream call may happen");
}

#[tokio::test]
async fn repeated_query_inside_ttl_hits_cache_with_zero_fetches() {
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(3)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), Arc::clone(&cache));

    let first = processor.process(&job_with_query(LONDON_BOX_QUERY)).await.unwrap();
    assert_eq!(fetcher.calls(), 1);

    let second = processor.process(&job_with_query(LONDON_BOX_QUERY)).await.unwrap();
    assert_eq!(fetcher.calls(), 1, "second run must not reach the network");

    assert_eq!(
        first.data_stats.unwrap().elements,
        second.data_stats.unwrap().elements
    );
}

#[tokio::test]
async fn rate_limited_fetch_is_recoverable_after_exactly_one_call() {
    let fetcher = MockFetcher::new(|| Err(JobError::RateLimited));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), cache);

    let err = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Rate limit exceeded (429)");
    assert!(err.is_recoverable(), "429 must stay retryable");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn schema_violation_is_terminal() {
    let fetcher = MockFetcher::new(|| {
        Ok(serde_json::json!({
            "elements": [ { "type": "invalid_type", "id": "not_a_number" } ]
        }))
    });
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), cache);

    let err = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap_err();

    assert_matches!(err, JobError::ResponseSchemaInvalid(_));
    assert!(!err.is_recoverable());
    assert!(err.to_string().contains("schema validation"));
}

#[tokio::test]
async fn sparse_result_over_large_area_is_flagged_low_confidence() {
    // 5 elements over ~77 km²: density ~0.065/km², far below 5/km².
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(5)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(fetcher, cache);

    let result = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap();

    let stats = result.data_stats.unwrap();
    assert_eq!(stats.elements, 5);
    assert!(stats.low_confidence);
}

#[tokio::test]
async fn dense_result_over_large_area_is_full_confidence() {
    // 1000 elements over the same box: density ~13/km².
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(1000)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(fetcher, cache);

    let result = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap();

    let stats = result.data_stats.unwrap();
    assert_eq!(stats.elements, 1000);
    assert!(!stats.low_confidence);
}

#[tokio::test]
async fn miss_path_persists_a_retrievable_cache_entry() {
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(7)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(fetcher, Arc::clone(&cache));

    let result = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap();

    let cached = cache
        .get(&cache_key(LONDON_BOX_QUERY))
        .await
        .unwrap()
        .expect("entry must exist under the content-hash key");
    let cached_response: OsmResponse = serde_json::from_str(&cached).unwrap();

    assert_eq!(
        cached_response.element_count(),
        result.data_stats.unwrap().elements
    );
}

#[tokio::test]
async fn corrupt_cache_entry_degrades_to_a_refetch() {
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(2)));
    let cache = Arc::new(InMemoryCache::new());
    cache
        .set(&cache_key(LONDON_BOX_QUERY), "{not json".to_string(), 3600)
        .await
        .unwrap();
    let processor = processor(Arc::clone(&fetcher), Arc::clone(&cache));

    let result = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), 1, "corrupt entry must refetch, not fail");
    assert_eq!(result.data_stats.unwrap().elements, 2);
}

#[tokio::test]
async fn missing_query_substitutes_the_default_smoke_query() {
    let fetcher = MockFetcher::new(|| Ok(body_with_elements(1)));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), cache);

    let job = Job {
        id: "smoke".to_string(),
        name: "test-job".to_string(),
        payload: JobPayload::with_message("Hello from test script!"),
        attempt: 1,
    };
    processor.process(&job).await.unwrap();

    let queries = fetcher.queries.lock().await;
    assert_eq!(queries.as_slice(), &[DEFAULT_QUERY.to_string()]);
}

#[tokio::test]
async fn upstream_timeout_propagates_as_recoverable() {
    let fetcher = MockFetcher::new(|| Err(JobError::UpstreamTimeout { timeout_secs: 30 }));
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), cache);

    let err = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap_err();

    assert_matches!(err, JobError::UpstreamTimeout { timeout_secs: 30 });
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn upstream_rejection_propagates_unchanged() {
    let fetcher = MockFetcher::new(|| {
        Err(JobError::UpstreamRejected {
            status: 400,
            body: "static error: parse error".to_string(),
        })
    });
    let cache = Arc::new(InMemoryCache::new());
    let processor = processor(Arc::clone(&fetcher), Arc::clone(&cache));

    let err = processor
        .process(&job_with_query(LONDON_BOX_QUERY))
        .await
        .unwrap_err();

    assert_matches!(err, JobError::UpstreamRejected { status: 400, .. });
    assert!(!err.is_recoverable());
    // A failed attempt leaves nothing behind in the cache.
    assert!(cache.is_empty().await);
}
