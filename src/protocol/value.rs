//! Field value typing
//!
//! A field literal is validated and tagged with its type, but the text as it
//! arrived on the wire is kept so that encoding never has to re-format numbers.

use crate::protocol::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed field value carrying its original literal text
///
/// Integers keep their `i` suffix and strings keep their surrounding quotes.
/// Booleans are the only values that are normalized (to lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "literal", rename_all = "lowercase")]
pub enum FieldValue {
    /// `42i`
    Integer(String),
    /// `42`, `4.2`, `-1e3`
    Float(String),
    /// `true` / `false`
    Boolean(String),
    /// `"text"`, quotes included
    String(String),
}

impl FieldValue {
    /// Classify a trimmed field literal.
    ///
    /// The checks run in a fixed order and the first match wins:
    /// quoted string, `i`-suffixed integer, boolean, float. An unsuffixed
    /// all-digit literal is therefore always a float.
    pub fn classify(literal: &str) -> CodecResult<Self> {
        if literal.starts_with('"') || literal.ends_with('"') {
            return if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
                Ok(Self::String(literal.to_string()))
            } else {
                Err(CodecError::InvalidStringField(literal.to_string()))
            };
        }

        if let Some(digits) = literal.strip_suffix('i') {
            return match digits.parse::<i64>() {
                Ok(_) => Ok(Self::Integer(literal.to_string())),
                Err(_) => Err(CodecError::InvalidIntegerField(literal.to_string())),
            };
        }

        if literal.eq_ignore_ascii_case("true") || literal.eq_ignore_ascii_case("false") {
            return Ok(Self::Boolean(literal.to_ascii_lowercase()));
        }

        match literal.parse::<f64>() {
            Ok(_) => Ok(Self::Float(literal.to_string())),
            Err(_) => Err(CodecError::InvalidNumericField(literal.to_string())),
        }
    }

    /// The literal text exactly as it will be written back out
    pub fn literal(&self) -> &str {
        match self {
            Self::Integer(s) | Self::Float(s) | Self::Boolean(s) | Self::String(s) => s,
        }
    }

    /// Numeric view used by the point store.
    ///
    /// Booleans map to 1.0/0.0 and strings to 1.0 (presence). Returns `None`
    /// only for a hand-built value whose literal does not match its variant.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(s) => s.strip_suffix('i')?.parse::<i64>().ok().map(|v| v as f64),
            Self::Float(s) => s.parse::<f64>().ok(),
            Self::Boolean(s) => match s.as_str() {
                "true" => Some(1.0),
                "false" => Some(0.0),
                _ => None,
            },
            Self::String(_) => Some(1.0),
        }
    }

    /// Short type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_digits_are_strings() {
        assert_eq!(
            FieldValue::classify("\"42\"").unwrap(),
            FieldValue::String("\"42\"".to_string())
        );
        assert_eq!(
            FieldValue::classify("\"\"").unwrap(),
            FieldValue::String("\"\"".to_string())
        );
    }

    #[test]
    fn test_malformed_quotes_rejected() {
        assert_eq!(
            FieldValue::classify("\""),
            Err(CodecError::InvalidStringField("\"".to_string()))
        );
        assert_eq!(
            FieldValue::classify("\"abc"),
            Err(CodecError::InvalidStringField("\"abc".to_string()))
        );
        assert!(matches!(
            FieldValue::classify("abc\""),
            Err(CodecError::InvalidStringField(_))
        ));
    }

    #[test]
    fn test_integer_keeps_suffix() {
        let value = FieldValue::classify("42i").unwrap();
        assert_eq!(value, FieldValue::Integer("42i".to_string()));
        assert_eq!(value.literal(), "42i");
        assert_eq!(value.to_f64(), Some(42.0));

        assert_eq!(
            FieldValue::classify("-7i").unwrap(),
            FieldValue::Integer("-7i".to_string())
        );
    }

    #[test]
    fn test_invalid_integer() {
        assert_eq!(
            FieldValue::classify("4.2i"),
            Err(CodecError::InvalidIntegerField("4.2i".to_string()))
        );
        assert_eq!(
            FieldValue::classify("i"),
            Err(CodecError::InvalidIntegerField("i".to_string()))
        );
        assert!(matches!(
            FieldValue::classify("99999999999999999999i"),
            Err(CodecError::InvalidIntegerField(_))
        ));
    }

    #[test]
    fn test_booleans_are_lowercased() {
        assert_eq!(
            FieldValue::classify("TRUE").unwrap(),
            FieldValue::Boolean("true".to_string())
        );
        assert_eq!(
            FieldValue::classify("False").unwrap(),
            FieldValue::Boolean("false".to_string())
        );
        assert_eq!(FieldValue::classify("true").unwrap().to_f64(), Some(1.0));
        assert_eq!(FieldValue::classify("false").unwrap().to_f64(), Some(0.0));
    }

    #[test]
    fn test_unsuffixed_digits_are_floats() {
        assert_eq!(
            FieldValue::classify("42").unwrap(),
            FieldValue::Float("42".to_string())
        );
        assert_eq!(
            FieldValue::classify("-1.5e3").unwrap(),
            FieldValue::Float("-1.5e3".to_string())
        );
        assert_eq!(FieldValue::classify("23.4").unwrap().to_f64(), Some(23.4));
    }

    #[test]
    fn test_invalid_numeric() {
        assert_eq!(
            FieldValue::classify("abc"),
            Err(CodecError::InvalidNumericField("abc".to_string()))
        );
        assert_eq!(
            FieldValue::classify(""),
            Err(CodecError::InvalidNumericField(String::new()))
        );
    }

    #[test]
    fn test_string_counts_as_presence() {
        let value = FieldValue::classify("\"up\"").unwrap();
        assert_eq!(value.to_f64(), Some(1.0));
        assert_eq!(value.type_name(), "string");
    }

    #[test]
    fn test_hand_built_mismatch() {
        assert_eq!(FieldValue::Integer("abc".to_string()).to_f64(), None);
        assert_eq!(FieldValue::Boolean("yes".to_string()).to_f64(), None);
    }
}
