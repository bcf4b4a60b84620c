//! Service layer for the snapshot pipeline.
//!
//! This module contains the business logic for:
//! - Embedded array extraction (`EmbeddedArrayExtractor`)
//! - Escape normalization (`unescape`, `normalize`)
//! - Record decoding (`decode`)
//! - URL canonicalization (`UrlCanonicalizer`)
//! - Bounded fan-out of canonicalization (`ConcurrencyCoordinator`)

pub mod canonicalizer;
pub mod coordinator;
pub mod decoder;
pub mod extractor;
pub mod unescape;

pub use canonicalizer::{Canonical, UrlCanonicalizer};
pub use coordinator::{CanonicalizeOutcome, ConcurrencyCoordinator};
pub use decoder::decode;
pub use extractor::{EmbeddedArray, EmbeddedArrayExtractor, Escaping, Strategy};
pub use unescape::{normalize, unescape};
