//! Caching for recipe records and images.
//!
//! Two independent caches:
//! - [`RecordCache`]: in-memory, per-id detail records with TTL staleness
//!   and a de-duplicating fire-and-forget prefetch queue
//! - [`ImageCache`]: on-disk files keyed by remote filename, resolved
//!   lazily at display time

mod image;
mod record;

pub use image::ImageCache;
pub use record::RecordCache;
