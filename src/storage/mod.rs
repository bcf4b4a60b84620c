//! Storage abstractions for snapshot persistence.
//!
//! A run writes exactly one snapshot, replacing the previous one
//! whole. Failed runs never reach the sink.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the snapshot landed
    pub location: String,
    /// Serialized size in bytes
    pub bytes: usize,
    pub total_count: usize,
    pub available_count: usize,
    /// Wall-clock time of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Replace the stored snapshot.
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteSummary>;

    /// Load the stored snapshot, if any.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>>;
}
