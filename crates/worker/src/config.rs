//! Environment-derived worker configuration.
//!
//! Read after `dotenvy` has loaded any `.env` file. Every value has a
//! default so a bare `mapwatch-worker` start works out of the box.

use mapwatch_overpass::OVERPASS_URL;

/// Worker process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Overpass interpreter endpoint (`OVERPASS_URL`).
    pub overpass_url: String,

    /// Enqueue one smoke-test job at startup (`WORKER_SMOKE_JOB=1`).
    pub smoke_job: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            overpass_url: std::env::var("OVERPASS_URL")
                .unwrap_or_else(|_| OVERPASS_URL.to_string()),
            smoke_job: std::env::var("WORKER_SMOKE_JOB")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
