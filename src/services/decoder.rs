//! Decodes normalized JSON text into records.

use crate::error::{AppError, Result};
use crate::models::RawRecord;

/// Parse the array text. Failures keep a prefix of the text for diagnostics.
pub fn decode(json: &str) -> Result<Vec<RawRecord>> {
    serde_json::from_str(json).map_err(|e| AppError::decode(json, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_records_in_order() {
        let records = decode(
            r#"[{"name":"A","lat":1,"lng":2,"stock_count":3},
                {"name":"B","stock_status":"SOLDOUT"},
                {"name":"A","lat":1,"lng":2,"stock_count":3}]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].availability(), 0);
        assert_eq!(records[0], records[2]);
    }

    #[test]
    fn test_repeated_and_alternate_keys_decode() {
        let records = decode(
            r#"[{"name":"A","lat":1.0,"latitude":1.0,"lng":2},
                {"name":"A","name":"B","stock_count":1,"stock_count":4}]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude.as_f64(), 1.0);
        assert_eq!(records[0].longitude.as_f64(), 2.0);
        assert_eq!(records[1].name, "B");
        assert_eq!(records[1].availability(), 4);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode(r#"[{"name":"A""#).unwrap_err();
        match err {
            AppError::Decode { sample, .. } => assert_eq!(sample, r#"[{"name":"A""#),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_array_is_decode_error() {
        assert!(matches!(
            decode(r#"{"name":"A"}"#),
            Err(AppError::Decode { .. })
        ));
    }
}
