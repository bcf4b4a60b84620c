//! Compact snapshot output.
//!
//! Single-letter keys keep the published file small:
//!
//! ```text
//! {"t":"MM/DD HH:MM","c":<total>,"a":<available>,"d":[{"n","a","y","x","s","u"}, ...]}
//! ```

use std::cmp::Reverse;
use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Coordinate, RawRecord};

/// Format of the snapshot generation time.
pub const TIMESTAMP_FORMAT: &str = "%m/%d %H:%M";

/// Output unit for one cafe. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactRecord {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "a")]
    pub address: String,
    #[serde(rename = "y")]
    pub latitude: Coordinate,
    #[serde(rename = "x")]
    pub longitude: Coordinate,
    /// Availability signal
    #[serde(rename = "s")]
    pub signal: u64,
    /// Canonical reference URL
    #[serde(rename = "u")]
    pub url: String,
}

impl From<RawRecord> for CompactRecord {
    fn from(record: RawRecord) -> Self {
        let signal = record.availability();
        Self {
            name: record.name,
            address: record.address,
            latitude: record.latitude,
            longitude: record.longitude,
            signal,
            url: record.reference_url,
        }
    }
}

/// A complete, write-once stock snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "t")]
    pub generated_at: String,
    #[serde(rename = "c")]
    pub total_count: usize,
    #[serde(rename = "a")]
    pub available_count: usize,
    #[serde(rename = "d")]
    pub records: Vec<CompactRecord>,
}

impl Snapshot {
    /// Build a snapshot from records whose URLs are already canonical.
    ///
    /// Records with stock come first, higher stock first; equal signals
    /// keep their input order.
    pub fn build<Tz>(records: Vec<RawRecord>, generated_at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut records: Vec<CompactRecord> =
            records.into_iter().map(CompactRecord::from).collect();
        records.sort_by_key(|r| (r.signal == 0, Reverse(r.signal)));

        let available_count = records.iter().filter(|r| r.signal > 0).count();

        Self {
            generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            total_count: records.len(),
            available_count,
            records,
        }
    }

    /// Check the count fields against the record list.
    pub fn is_consistent(&self) -> bool {
        self.total_count == self.records.len()
            && self.available_count == self.records.iter().filter(|r| r.signal > 0).count()
    }

    /// Minified UTF-8 JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
