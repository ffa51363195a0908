//! The per-job orchestrator.

use std::sync::Arc;

use mapwatch_cache::CacheStore;
use mapwatch_core::cache_key::cache_key;
use mapwatch_core::confidence;
use mapwatch_core::error::JobError;
use mapwatch_core::geo;
use mapwatch_core::osm::{self, OsmResponse};
use mapwatch_core::types::JobResult;
use mapwatch_queue::Job;

use crate::fetcher::DataFetcher;
use crate::gate::AdmissionGate;
use crate::stage::JobStage;

/// Cached responses live for 24 hours. Within that window a repeated
/// identical query never reaches the upstream.
pub const CACHE_TTL_SECS: u64 = 86_400;

/// Runs one job attempt end to end.
///
/// Holds only shared handles, so one processor serves any number of
/// concurrent jobs; the admission gate is what serializes upstream fetches.
pub struct JobProcessor {
    fetcher: Arc<dyn DataFetcher>,
    cache: Arc<dyn CacheStore>,
    gate: Arc<dyn AdmissionGate>,
}

impl JobProcessor {
    pub fn new(
        fetcher: Arc<dyn DataFetcher>,
        cache: Arc<dyn CacheStore>,
        gate: Arc<dyn AdmissionGate>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            gate,
        }
    }

    /// Process one dequeued job attempt.
    ///
    /// Returns a full [`JobResult`] or the first classified error; never a
    /// partial result, and never an internal retry. At most one upstream
    /// call happens per invocation.
    pub async fn process(&self, job: &Job) -> Result<JobResult, JobError> {
        self.log_stage(job, JobStage::Received);

        // Trust boundary one: nothing runs before the payload checks out.
        job.payload.ensure_valid()?;
        self.log_stage(job, JobStage::PayloadValidated);

        let query = job.payload.effective_query();
        let area_sq_km = geo::estimate_area_sq_km(query);
        let key = cache_key(query);

        let cached = match self.cache.get(&key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "Cache read failed, treating as miss");
                None
            }
        };
        self.log_stage(job, JobStage::CacheChecked);

        if let Some(serialized) = cached {
            match serde_json::from_str::<OsmResponse>(&serialized) {
                Ok(response) => {
                    self.log_stage(job, JobStage::CacheHit);
                    return Ok(self.finish(job, &response, area_sq_km));
                }
                Err(e) => {
                    // A corrupt entry is a miss, not a failure.
                    tracing::warn!(job_id = %job.id, error = %e, "Corrupt cache entry, refetching");
                }
            }
        }
        self.log_stage(job, JobStage::CacheMiss);

        // The gate serializes entry into the fetching stage across every
        // concurrent job, protecting the shared upstream budget.
        self.gate.admit().await;
        self.log_stage(job, JobStage::Fetching);

        let body = self.fetcher.fetch(query).await?;
        self.log_stage(job, JobStage::FetchSucceeded);

        // Trust boundary two: the upstream payload must match the OSM shape.
        let response = osm::parse_response(body)?;
        self.log_stage(job, JobStage::ResponseValidated);

        self.write_cache(job, &key, &response).await;

        Ok(self.finish(job, &response, area_sq_km))
    }

    /// Best-effort cache write; a completed result is never blocked on it.
    async fn write_cache(&self, job: &Job, key: &str, response: &OsmResponse) {
        let serialized = match serde_json::to_string(response) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "Failed to serialize response for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, serialized, CACHE_TTL_SECS).await {
            tracing::warn!(job_id = %job.id, error = %e, "Cache write failed, result returned uncached");
        }
    }

    /// Confidence-score the response and build the result.
    fn finish(&self, job: &Job, response: &OsmResponse, area_sq_km: f64) -> JobResult {
        let stats = confidence::analyze(response.element_count(), area_sq_km);
        tracing::info!(
            job_id = %job.id,
            elements = stats.elements,
            area_sq_km,
            low_confidence = stats.low_confidence,
            "Job produced result"
        );
        self.log_stage(job, JobStage::ResultReady);
        JobResult::success(stats)
    }

    fn log_stage(&self, job: &Job, stage: JobStage) {
        tracing::info!(job_id = %job.id, stage = stage.as_str(), "Job stage");
    }
}
