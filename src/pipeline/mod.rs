//! Pipeline entry points.
//!
//! - `run_crawler`: Fetch the page and publish one snapshot
//! - `run_validate`: Check configuration

pub mod crawl;
pub mod validate;

pub use crawl::{Pipeline, run_crawler};
pub use validate::run_validate;
