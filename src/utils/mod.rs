//! Utility functions and helpers.

pub mod http;
pub mod log;

/// Whether `url` mentions any of `hosts`.
///
/// Matching is by substring, so `place.naver.com` also matches
/// `m.place.naver.com`; callers order their checks accordingly.
pub fn mentions_any(url: &str, hosts: &[String]) -> bool {
    hosts.iter().any(|host| !host.is_empty() && url.contains(host.as_str()))
}
