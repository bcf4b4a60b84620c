// src/services/extractor.rs

//! Embedded array extraction.
//!
//! Locates the JSON array stored under a known key somewhere inside
//! server-rendered markup. The array may appear verbatim or escaped for
//! nesting inside an outer string literal (`"` as `\"`, `\` as `\\`).
//!
//! Two strategies run in order: a lazy regex fast path and a
//! bracket-counting scanner. The scanner is authoritative, so fast-path
//! hits are re-checked against it from the same opening bracket.

use regex::Regex;

use crate::error::{AppError, Result};

/// How the embedded array was written into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaping {
    /// Quotes and backslashes carry an extra `\`
    Escaped,
    /// Verbatim JSON
    Plain,
}

impl Escaping {
    /// Forms in the order they are tried.
    pub const ALL: [Escaping; 2] = [Escaping::Escaped, Escaping::Plain];

    /// Literal `"key":` marker in this form.
    fn marker(self, key: &str) -> String {
        match self {
            Escaping::Escaped => format!(r#"\"{key}\":"#),
            Escaping::Plain => format!(r#""{key}":"#),
        }
    }

    fn pattern(self, key: &str) -> String {
        let key = regex::escape(key);
        match self {
            Escaping::Escaped => format!(r#"(?s)\\"{key}\\":\s*(\[.*?\])\s*(?:,\s*\\"|\}})"#),
            Escaping::Plain => format!(r#"(?s)"{key}":\s*(\[.*?\])\s*(?:,\s*"|\}})"#),
        }
    }
}

/// Which strategy produced an [`EmbeddedArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FastPath,
    Scanner,
}

/// Raw, possibly still escaped, array text found in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedArray<'a> {
    /// Bracketed substring, both brackets included
    pub text: &'a str,
    /// Byte offset of the opening `[`
    pub start: usize,
    pub escaping: Escaping,
    pub strategy: Strategy,
}

/// A way of finding the embedded array in page text.
pub trait ExtractStrategy {
    /// `None` means "not found"; the caller decides what comes next.
    fn locate<'a>(&self, text: &'a str) -> Option<EmbeddedArray<'a>>;
}

/// Lazy regex match up to the first plausible closing context.
pub struct RegexStrategy {
    patterns: Vec<(Escaping, Regex)>,
}

impl RegexStrategy {
    pub fn new(key: &str) -> Result<Self> {
        let patterns = Escaping::ALL
            .iter()
            .map(|&escaping| {
                Regex::new(&escaping.pattern(key))
                    .map(|re| (escaping, re))
                    .map_err(|e| AppError::config(format!("invalid array key {key:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl ExtractStrategy for RegexStrategy {
    fn locate<'a>(&self, text: &'a str) -> Option<EmbeddedArray<'a>> {
        self.patterns.iter().find_map(|(escaping, re)| {
            let array = re.captures(text)?.get(1)?;
            Some(EmbeddedArray {
                text: array.as_str(),
                start: array.start(),
                escaping: *escaping,
                strategy: Strategy::FastPath,
            })
        })
    }
}

/// Character scan from the marker, tracking string literals and depth.
pub struct ScanStrategy {
    key: String,
}

impl ScanStrategy {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ExtractStrategy for ScanStrategy {
    fn locate<'a>(&self, text: &'a str) -> Option<EmbeddedArray<'a>> {
        Escaping::ALL.iter().find_map(|&escaping| {
            let marker = escaping.marker(&self.key);
            text.match_indices(&marker).find_map(|(at, _)| {
                let after = at + marker.len();
                let skipped = text[after..].len() - text[after..].trim_start().len();
                let open = after + skipped;
                if text.as_bytes().get(open) != Some(&b'[') {
                    return None;
                }
                scan_array(text, open, escaping).map(|array| EmbeddedArray {
                    text: array,
                    start: open,
                    escaping,
                    strategy: Strategy::Scanner,
                })
            })
        })
    }
}

/// Return the balanced array starting at byte `open`, which must be `[`.
///
/// In escaped form `\"` and `\\` are read as one unit standing for the
/// inner `"` and `\`, so neither can be mistaken for a bracket. Brackets
/// only count outside string literals. `None` if the text ends before
/// the depth returns to zero.
pub fn scan_array(text: &str, open: usize, escaping: Escaping) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'[') {
        return None;
    }

    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = open;

    while i < bytes.len() {
        let (unit, width) = match (escaping, bytes[i], bytes.get(i + 1)) {
            (Escaping::Escaped, b'\\', Some(&b'"')) => (b'"', 2),
            (Escaping::Escaped, b'\\', Some(&b'\\')) => (b'\\', 2),
            (_, c, _) => (c, 1),
        };
        i += width;

        if in_string {
            if escape_next {
                escape_next = false;
            } else if unit == b'\\' {
                escape_next = true;
            } else if unit == b'"' {
                in_string = false;
            }
            continue;
        }

        match unit {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open..i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extracts the array stored under one key.
pub struct EmbeddedArrayExtractor {
    key: String,
    fast_path: RegexStrategy,
    scanner: ScanStrategy,
}

impl EmbeddedArrayExtractor {
    pub fn new(key: &str) -> Result<Self> {
        Ok(Self {
            key: key.to_string(),
            fast_path: RegexStrategy::new(key)?,
            scanner: ScanStrategy::new(key),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Find the embedded array, fast path first.
    pub fn extract<'a>(&self, text: &'a str) -> Result<EmbeddedArray<'a>> {
        if let Some(found) = self.fast_path.locate(text) {
            return Ok(self.cross_check(text, found));
        }

        log::debug!("Fast path found no \"{}\" array, scanning", self.key);
        self.scanner
            .locate(text)
            .ok_or_else(|| AppError::extraction(&self.key))
    }

    /// Prefer the scanner's span when it disagrees with a fast-path hit.
    fn cross_check<'a>(&self, text: &'a str, found: EmbeddedArray<'a>) -> EmbeddedArray<'a> {
        match scan_array(text, found.start, found.escaping) {
            Some(scanned) if scanned.len() != found.text.len() => {
                log::warn!(
                    "Fast path returned {} bytes for \"{}\" but the bracket scan found {}; using scan",
                    found.text.len(),
                    self.key,
                    scanned.len()
                );
                EmbeddedArray {
                    text: scanned,
                    strategy: Strategy::Scanner,
                    ..found
                }
            }
            Some(_) => found,
            None => {
                log::warn!(
                    "Fast path match for \"{}\" is not bracket-balanced",
                    self.key
                );
                found
            }
        }
    }
}
