//! Domain logic for the OSM data-fetch pipeline.
//!
//! Pure types and functions shared by the queue, cache, client, and worker
//! crates: job payload validation, the classified [`error::JobError`], the
//! tolerant OSM document model, bounding-box/area estimation, density-based
//! confidence scoring, and content-addressed cache-key derivation.
//!
//! Nothing in this crate performs I/O.

pub mod cache_key;
pub mod confidence;
pub mod error;
pub mod geo;
pub mod osm;
pub mod payload;
pub mod types;
