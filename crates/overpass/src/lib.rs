//! HTTP client for the Overpass bulk-geodata API.
//!
//! One POST per fetch, with every outcome classified into a
//! [`JobError`](mapwatch_core::error::JobError) variant so the queue can
//! apply its retry policy without inspecting transport details.

pub mod client;

pub use client::{OverpassClient, DEFAULT_TIMEOUT_SECS, OVERPASS_URL};
