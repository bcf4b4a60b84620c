// src/models/mod.rs

//! Domain models for the snapshot pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod snapshot;

// Re-export all public types
pub use config::{
    Config, HostRewrite, LoggingConfig, OutputConfig, ResolverConfig, SourceConfig,
};
pub use record::{Coordinate, RawRecord};
pub use snapshot::{CompactRecord, Snapshot, TIMESTAMP_FORMAT};
