//! Bounding-box extraction and area estimation.
//!
//! The geographic extent of a query is recovered heuristically from its text:
//! the first parenthesized `(lat1, lon1, lat2, lon2)` group is taken as an
//! Overpass bounding box. Extraction is best-effort: a query without a
//! recognisable box falls back to [`DEFAULT_AREA_SQ_KM`] instead of failing
//! the job, since the area only feeds the advisory confidence flag.
//!
//! Areas use the equirectangular approximation (constant km/degree latitude,
//! longitude scaled by `cos(mid_lat)`). Acceptable for the few-km boxes this
//! system targets; no geodesic correction is applied.

use std::sync::LazyLock;

use regex::Regex;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.32;

/// Metres per degree, used when building a box from a centre and radius.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Fallback area when no bounding box can be recovered from the query text.
pub const DEFAULT_AREA_SQ_KM: f64 = 10.0;

/// Maximum radius when deriving a box from a centre point: one mile.
pub const MAX_RADIUS_METERS: f64 = 1_609.0;

/// First parenthesized group of four decimal numbers in a query.
static BBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)",
    )
    .expect("bounding-box regex is valid")
});

/// A rectangular latitude/longitude region. Never persisted; derived
/// transiently from query text or a centre point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// Errors from bounding-box construction.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// Requested radius exceeds the one-mile cap.
    #[error("Radius constrained to {MAX_RADIUS_METERS}m max, got {0}m")]
    RadiusTooLarge(f64),
}

impl BoundingBox {
    /// Build a box from two corners, normalising coordinate order.
    pub fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        Self {
            min_lat: lat1.min(lat2),
            min_lon: lon1.min(lon2),
            max_lat: lat1.max(lat2),
            max_lon: lon1.max(lon2),
        }
    }

    /// Build a box around a centre point with the given radius in metres.
    ///
    /// Longitude extent widens with latitude so the box stays roughly square
    /// on the ground. Radii above [`MAX_RADIUS_METERS`] are rejected.
    pub fn around(center_lat: f64, center_lon: f64, radius_meters: f64) -> Result<Self, GeoError> {
        if radius_meters > MAX_RADIUS_METERS {
            return Err(GeoError::RadiusTooLarge(radius_meters));
        }
        let lat_delta = radius_meters / METERS_PER_DEGREE;
        let lon_delta = radius_meters / (METERS_PER_DEGREE * center_lat.to_radians().cos());
        Ok(Self::new(
            center_lat - lat_delta,
            center_lon - lon_delta,
            center_lat + lat_delta,
            center_lon + lon_delta,
        ))
    }

    /// Approximate area in km².
    pub fn area_sq_km(&self) -> f64 {
        let height_km = (self.max_lat - self.min_lat).abs() * KM_PER_DEGREE;
        let mid_lat = (self.min_lat + self.max_lat) / 2.0;
        let width_km = (self.max_lon - self.min_lon).abs() * KM_PER_DEGREE * mid_lat.to_radians().cos();
        height_km * width_km
    }

    /// Render in Overpass filter order: `south,west,north,east`.
    pub fn overpass_bbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

/// Extract the first bounding box from a query's text, if any.
pub fn extract_bounding_box(query: &str) -> Option<BoundingBox> {
    let caps = BBOX_RE.captures(query)?;
    let mut coords = [0.0f64; 4];
    for (i, coord) in coords.iter_mut().enumerate() {
        *coord = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    Some(BoundingBox::new(coords[0], coords[1], coords[2], coords[3]))
}

/// Estimated area for a query, with the documented fallback.
pub fn estimate_area_sq_km(query: &str) -> f64 {
    match extract_bounding_box(query) {
        Some(bbox) => bbox.area_sq_km(),
        None => {
            tracing::debug!(
                fallback_sq_km = DEFAULT_AREA_SQ_KM,
                "No bounding box found in query, using default area"
            );
            DEFAULT_AREA_SQ_KM
        }
    }
}

/// Render the standard buildings/highways snapshot query for a box.
///
/// `date` is an optional attic timestamp (strict ISO-8601, e.g.
/// `2020-01-01T00:00:00Z`) for querying historical state.
pub fn snapshot_query(bbox: &BoundingBox, date: Option<&str>) -> String {
    let time_filter = date.map(|d| format!("[date:\"{d}\"]")).unwrap_or_default();
    let bbox = bbox.overpass_bbox();
    format!(
        "[out:json][timeout:25]{time_filter};\
         (way[\"building\"]({bbox});relation[\"building\"]({bbox});way[\"highway\"]({bbox}););\
         out geom;"
    )
}
