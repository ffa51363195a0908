//! Density-based confidence scoring.
//!
//! A result whose element density falls below [`DENSITY_THRESHOLD`] is
//! flagged low-confidence: the area likely returned an incomplete snapshot
//! (sparse mapping, clipped query, or partial upstream data). Purely
//! advisory: the flag never fails a job.

use serde::{Deserialize, Serialize};

/// Minimum elements per km² for a result to count as full-confidence.
pub const DENSITY_THRESHOLD: f64 = 5.0;

/// Floor applied to the area so tiny boxes cannot inflate density.
const MIN_AREA_SQ_KM: f64 = 1.0;

/// Statistics attached to a successful job result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataStats {
    /// Number of elements in the fetched document.
    pub elements: usize,

    /// Whether the element density fell below [`DENSITY_THRESHOLD`].
    pub low_confidence: bool,
}

/// Score a fetched document against its query area.
pub fn analyze(element_count: usize, area_sq_km: f64) -> DataStats {
    let density = element_count as f64 / area_sq_km.max(MIN_AREA_SQ_KM);
    DataStats {
        elements: element_count,
        low_confidence: density < DENSITY_THRESHOLD,
    }
}
