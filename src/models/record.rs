//! Decoded cafe records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A coordinate exactly as the source wrote it.
///
/// Whole numbers stay integral (`1`, not `1.0`) when written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinate(Number);

impl Coordinate {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self(Number::from(0))
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map(Self).unwrap_or_default()
    }
}

impl From<i64> for Coordinate {
    fn from(value: i64) -> Self {
        Self(Number::from(value))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One element of the embedded cafe array.
///
/// Every field is defaulted at decode time so later stages never deal
/// with missing values. Unknown fields are ignored and a repeated key
/// keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawRecord {
    pub name: String,
    pub address: String,
    /// Source key `lat`
    pub latitude: Coordinate,
    /// Source key `lng`
    pub longitude: Coordinate,
    /// Numeric stock, takes precedence over `stock_status`
    pub stock_count: Option<i64>,
    pub stock_status: Option<String>,
    /// Place link (`naver_place_url`), possibly a short link or desktop URL
    pub reference_url: String,
}

impl From<Map<String, Value>> for RawRecord {
    fn from(mut fields: Map<String, Value>) -> Self {
        let mut take = |key: &str| fields.remove(key).unwrap_or(Value::Null);
        Self {
            name: lenient::text(take("name")),
            address: lenient::text(take("address")),
            latitude: lenient::coordinate(take("lat")),
            longitude: lenient::coordinate(take("lng")),
            stock_count: lenient::count(take("stock_count")),
            stock_status: lenient::optional_text(take("stock_status")),
            reference_url: lenient::text(take("naver_place_url")),
        }
    }
}

impl RawRecord {
    /// Derive the availability signal.
    ///
    /// `stock_count` wins when present (negative counts clamp to 0).
    /// Otherwise `stock_status` maps sold-out markers and the empty
    /// string to 0 and anything else to 1.
    pub fn availability(&self) -> u64 {
        if let Some(count) = self.stock_count {
            return count.max(0) as u64;
        }
        match self.stock_status.as_deref() {
            None | Some("") | Some("SOLDOUT") | Some("sold_out") => 0,
            Some("IN_STOCK") | Some("in_stock") | Some("AVAILABLE") => 1,
            Some(_) => 1,
        }
    }
}

mod lenient {
    use serde_json::Value;

    use super::Coordinate;

    pub fn text(value: Value) -> String {
        optional_text(value).unwrap_or_default()
    }

    pub fn optional_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn coordinate(value: Value) -> Coordinate {
        match value {
            Value::Number(n) => Coordinate(n),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Coordinate::from)
                .unwrap_or_default(),
            _ => Coordinate::default(),
        }
    }

    pub fn count(value: Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_count)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_count))
            }
            _ => None,
        }
    }

    fn float_to_count(v: f64) -> Option<i64> {
        v.is_finite().then(|| v.trunc() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> RawRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_fields_default() {
        let r = record("{}");
        assert_eq!(r, RawRecord::default());
        assert_eq!(r.availability(), 0);
    }

    #[test]
    fn test_stock_count_is_the_signal() {
        assert_eq!(record(r#"{"stock_count":7}"#).availability(), 7);
        assert_eq!(record(r#"{"stock_count":0,"stock_status":"IN_STOCK"}"#).availability(), 0);
        assert_eq!(record(r#"{"stock_count":-3}"#).availability(), 0);
        assert_eq!(record(r#"{"stock_count":"4"}"#).availability(), 4);
        assert_eq!(record(r#"{"stock_count":2.9}"#).availability(), 2);
    }

    #[test]
    fn test_stock_status_mapping() {
        let cases = [
            ("SOLDOUT", 0),
            ("sold_out", 0),
            ("", 0),
            ("IN_STOCK", 1),
            ("in_stock", 1),
            ("AVAILABLE", 1),
            ("LIMITED", 1),
        ];
        for (status, expected) in cases {
            let json = format!(r#"{{"stock_status":"{status}"}}"#);
            assert_eq!(record(&json).availability(), expected, "status {status:?}");
        }
    }

    #[test]
    fn test_null_count_falls_back_to_status() {
        let r = record(r#"{"stock_count":null,"stock_status":"AVAILABLE"}"#);
        assert_eq!(r.stock_count, None);
        assert_eq!(r.availability(), 1);
    }

    #[test]
    fn test_loose_field_types() {
        let r = record(
            r#"{"name":null,"address":"Seoul","lat":"37.5","lng":127.01,
                "naver_place_url":"https://naver.me/abc","extra":[1,2]}"#,
        );
        assert_eq!(r.name, "");
        assert_eq!(r.address, "Seoul");
        assert_eq!(r.latitude.as_f64(), 37.5);
        assert_eq!(r.longitude.as_f64(), 127.01);
        assert_eq!(r.reference_url, "https://naver.me/abc");
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let r = record(r#"{"name":"A","name":"B","lat":1,"lat":5}"#);
        assert_eq!(r.name, "B");
        assert_eq!(r.latitude, Coordinate::from(5));
    }

    #[test]
    fn test_long_coordinate_keys_are_ignored() {
        let r = record(r#"{"lat":1.0,"latitude":9.0,"lng":2,"longitude":"x"}"#);
        assert_eq!(r.latitude.as_f64(), 1.0);
        assert_eq!(r.longitude, Coordinate::from(2));
    }

    #[test]
    fn test_coordinate_keeps_source_number() {
        let r = record(r#"{"lat":1,"lng":127.25}"#);
        assert_eq!(serde_json::to_string(&r.latitude).unwrap(), "1");
        assert_eq!(serde_json::to_string(&r.longitude).unwrap(), "127.25");
        assert_eq!(Coordinate::from(37.5).to_string(), "37.5");
        assert_eq!(Coordinate::default().to_string(), "0");
    }

    #[test]
    fn test_non_object_element_is_rejected() {
        assert!(serde_json::from_str::<RawRecord>("[1,2]").is_err());
    }
}
