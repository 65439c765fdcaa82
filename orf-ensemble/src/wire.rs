//! Engine response parsing
//!
//! Engines report times either as numeric seconds or as suffixed strings
//! (`"1.400s"`). A time that is not a number, or is more than a day away
//! from zero, becomes 0; odd word entries never fail the parse.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{EnsembleError, Result};
use crate::word::{EngineRole, RawWord};

/// Times beyond a day are treated as malformed.
pub const MAX_TIME_SECONDS: f64 = 86_400.0;

/// Parse a time value (seconds) into whole milliseconds.
///
/// Strings are read up to the end of their leading number, so `"1.4s"` and
/// `"1.4sec"` both parse. Anything else, including out-of-range values,
/// becomes 0.
pub fn parse_time_ms(value: &Value) -> i64 {
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s.trim()),
        _ => None,
    };

    match seconds {
        Some(seconds) if seconds.is_finite() && seconds.abs() <= MAX_TIME_SECONDS => {
            (seconds * 1000.0).round() as i64
        }
        _ => 0,
    }
}

/// The longest prefix of `s` that reads as a decimal number
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let digits = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits(end);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        end += 1 + fraction;
    }
    if whole + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let count = digits(exponent);
        if count > 0 {
            end = exponent + count;
        }
    }

    s.get(..end)?.parse().ok()
}

fn de_time_ms<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_time_ms(&value))
}

fn de_confidence<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// A word entry as engines send it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineWord {
    #[serde(default, alias = "word")]
    pub text: String,

    #[serde(default, rename = "startTime", alias = "start", deserialize_with = "de_time_ms")]
    pub start_ms: i64,

    #[serde(default, rename = "endTime", alias = "end", deserialize_with = "de_time_ms")]
    pub end_ms: i64,

    #[serde(default, deserialize_with = "de_confidence")]
    pub confidence: Option<f64>,
}

impl EngineWord {
    pub fn into_raw(self, role: EngineRole) -> RawWord {
        RawWord {
            text: self.text,
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            confidence: self.confidence,
            role,
        }
    }
}

/// One recognition hypothesis inside a result block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub words: Vec<EngineWord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultBlock {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// Engine output: a flat word list or a `results[].alternatives[0].words[]`
/// document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Words(Vec<EngineWord>),
    Results {
        #[serde(default)]
        results: Vec<ResultBlock>,
    },
}

impl EngineResponse {
    /// Flatten into raw words tagged with the engine role. Only the first
    /// alternative of each result block is used.
    pub fn into_raw_words(self, role: EngineRole) -> Vec<RawWord> {
        let words = match self {
            EngineResponse::Words(words) => words,
            EngineResponse::Results { results } => results
                .into_iter()
                .filter_map(|block| block.alternatives.into_iter().next())
                .flat_map(|alt| alt.words)
                .collect(),
        };

        words.into_iter().map(|w| w.into_raw(role)).collect()
    }
}

/// Parse an engine response document.
pub fn parse_engine_response(json: &str, role: EngineRole) -> Result<Vec<RawWord>> {
    let value: Value = serde_json::from_str(json)?;
    engine_words_from_value(value, role)
}

/// Interpret an already-parsed engine response. `null` means no result.
pub fn engine_words_from_value(value: Value, role: EngineRole) -> Result<Vec<RawWord>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let response: EngineResponse = serde_json::from_value(value)
        .map_err(|e| EnsembleError::invalid_response(e.to_string()))?;
    Ok(response.into_raw_words(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_time_forms() {
        assert_eq!(parse_time_ms(&json!(1.02)), 1020);
        assert_eq!(parse_time_ms(&json!("1.400s")), 1400);
        assert_eq!(parse_time_ms(&json!("2.004s")), 2004);
        assert_eq!(parse_time_ms(&json!(3)), 3000);
    }

    #[test]
    fn test_parse_time_malformed_is_zero() {
        assert_eq!(parse_time_ms(&json!("soon")), 0);
        assert_eq!(parse_time_ms(&json!("s1.0")), 0);
        assert_eq!(parse_time_ms(&json!(".")), 0);
        assert_eq!(parse_time_ms(&json!(null)), 0);
        assert_eq!(parse_time_ms(&json!({"seconds": 1})), 0);
    }

    #[test]
    fn test_parse_time_reads_leading_number() {
        assert_eq!(parse_time_ms(&json!("1.5sec")), 1500);
        assert_eq!(parse_time_ms(&json!(" 2 s")), 2000);
        assert_eq!(parse_time_ms(&json!("1.25e1s")), 12_500);
        assert_eq!(parse_time_ms(&json!("3e")), 3000);
        assert_eq!(parse_time_ms(&json!("-0.5s")), -500);
    }

    #[test]
    fn test_parse_time_out_of_range_is_zero() {
        assert_eq!(parse_time_ms(&json!("1e300s")), 0);
        assert_eq!(parse_time_ms(&json!("-1e300")), 0);
        assert_eq!(parse_time_ms(&json!(1e300)), 0);
        assert_eq!(parse_time_ms(&json!(90_000)), 0);
        assert_eq!(parse_time_ms(&json!(86_400)), 86_400_000);

        let words = parse_engine_response(
            r#"[{"word": "dog", "startTime": "1e300s", "endTime": "1e300s"}]"#,
            EngineRole::Timing,
        )
        .unwrap();
        assert_eq!((words[0].start_ms, words[0].end_ms), (0, 0));
    }

    #[test]
    fn test_flat_word_list() {
        let words = parse_engine_response(
            r#"[{"word": "Hefty", "startTime": "1.000s", "endTime": "1.400s", "confidence": 0.4}]"#,
            EngineRole::Vocabulary,
        )
        .unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Hefty");
        assert_eq!(words[0].start_ms, 1000);
        assert_eq!(words[0].end_ms, 1400);
        assert_eq!(words[0].confidence, Some(0.4));
        assert_eq!(words[0].role, EngineRole::Vocabulary);
    }

    #[test]
    fn test_results_document_uses_first_alternative() {
        let doc = r#"{
            "results": [
                {"alternatives": [
                    {"words": [{"word": "the", "startTime": 0.5, "endTime": 0.7}]},
                    {"words": [{"word": "a", "startTime": 0.5, "endTime": 0.7}]}
                ]},
                {"alternatives": []},
                {"alternatives": [{"words": [{"text": "dog", "start": 0.8, "end": "1.1s"}]}]}
            ]
        }"#;
        let words = parse_engine_response(doc, EngineRole::Timing).unwrap();
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "dog"]);
        assert_eq!(words[1].end_ms, 1100);
    }

    #[test]
    fn test_missing_fields_default() {
        let words = parse_engine_response(r#"[{"word": "um"}]"#, EngineRole::Timing).unwrap();
        assert_eq!(words[0].start_ms, 0);
        assert_eq!(words[0].end_ms, 0);
        assert_eq!(words[0].confidence, None);
    }

    #[test]
    fn test_null_and_empty_documents() {
        assert!(parse_engine_response("null", EngineRole::Timing).unwrap().is_empty());
        assert!(parse_engine_response("{}", EngineRole::Timing).unwrap().is_empty());
        assert!(parse_engine_response("not json", EngineRole::Timing).is_err());
    }

    #[test]
    fn test_unrecognized_shape_is_invalid_response() {
        let err = engine_words_from_value(json!("hello"), EngineRole::Timing).unwrap_err();
        assert!(matches!(err, EnsembleError::InvalidResponse(_)));
    }
}
