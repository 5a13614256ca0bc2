//! Named codecs for layout fields, converting between slot text and JSON.

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::codec::number::format_float;
use crate::codec::{decode_date, decode_implied, encode_date, encode_implied, TextValue};
use crate::constants::DEFAULT_DATE_FORMAT;
use crate::error::CodecError;

const MAX_SCALE: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DynCodec {
    Text,
    Trimmed,
    Integer,
    Number,
    Decimal(u32),
    Date(String),
}

impl DynCodec {
    /// Resolve a codec name. `None` means plain text.
    pub(crate) fn parse(name: Option<&str>) -> Result<Self, String> {
        let Some(name) = name else {
            return Ok(DynCodec::Text);
        };
        let (head, arg) = match name.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (name, None),
        };
        match (head, arg) {
            ("text", None) => Ok(DynCodec::Text),
            ("trimmed", None) => Ok(DynCodec::Trimmed),
            ("integer", None) => Ok(DynCodec::Integer),
            ("number", None) => Ok(DynCodec::Number),
            ("decimal", Some(scale)) => match scale.parse::<u32>() {
                Ok(scale) if scale <= MAX_SCALE => Ok(DynCodec::Decimal(scale)),
                _ => Err(format!("invalid decimal scale {scale:?}")),
            },
            ("date", None) => Ok(DynCodec::Date(DEFAULT_DATE_FORMAT.to_string())),
            ("date", Some(format)) if !format.is_empty() => Ok(DynCodec::Date(format.to_string())),
            _ => Err(format!("unknown codec {name:?}")),
        }
    }

    /// Absent and null values render as empty text.
    pub(crate) fn encode(&self, value: Option<&Value>) -> Result<String, CodecError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(String::new()),
            Some(value) => value,
        };
        match self {
            DynCodec::Text | DynCodec::Trimmed => match value {
                Value::String(text) => Ok(text.clone()),
                Value::Number(number) => Ok(number.to_string()),
                Value::Bool(flag) => Ok(flag.to_text()),
                other => Err(unexpected("a scalar", other)),
            },
            DynCodec::Integer => match value {
                Value::Number(number) => match (number.as_i64(), number.as_u64()) {
                    (Some(int), _) => Ok(int.to_text()),
                    (None, Some(uint)) => Ok(uint.to_text()),
                    _ => Err(CodecError::new(format!("{number} is not an integer"))),
                },
                Value::String(text) => Ok(i64::from_text(text)?.to_text()),
                other => Err(unexpected("an integer", other)),
            },
            DynCodec::Number => match value {
                Value::Number(number) => match number.as_i64() {
                    Some(int) => Ok(int.to_text()),
                    None => Ok(format_float(as_f64(value)?)),
                },
                Value::String(text) => Ok(format_float(f64::from_text(text)?)),
                other => Err(unexpected("a number", other)),
            },
            DynCodec::Decimal(scale) => encode_implied(as_f64(value)?, *scale),
            DynCodec::Date(format) => match value {
                Value::String(text) => {
                    let date: NaiveDate = decode_date(text, DEFAULT_DATE_FORMAT)?;
                    encode_date(&date, format)
                }
                other => Err(unexpected("an ISO date string", other)),
            },
        }
    }

    pub(crate) fn decode(&self, text: &str) -> Result<Value, CodecError> {
        match self {
            DynCodec::Text => Ok(Value::String(text.to_owned())),
            DynCodec::Trimmed => Ok(Value::String(text.trim().to_owned())),
            DynCodec::Integer => Ok(Value::from(i64::from_text(text)?)),
            DynCodec::Number => {
                let trimmed = text.trim();
                match trimmed.parse::<i64>() {
                    Ok(int) => Ok(Value::from(int)),
                    Err(_) => float_value(f64::from_text(trimmed)?),
                }
            }
            DynCodec::Decimal(scale) => float_value(decode_implied(text, *scale)?),
            DynCodec::Date(format) => {
                let date = decode_date(text, format)?;
                Ok(Value::String(encode_date(&date, DEFAULT_DATE_FORMAT)?))
            }
        }
    }
}

fn as_f64(value: &Value) -> Result<f64, CodecError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| CodecError::new(format!("{number} is not representable as f64"))),
        Value::String(text) => f64::from_text(text),
        other => Err(unexpected("a number", other)),
    }
}

fn float_value(value: f64) -> Result<Value, CodecError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| CodecError::new(format!("{value} is not a finite number")))
}

fn unexpected(expected: &str, found: &Value) -> CodecError {
    CodecError::new(format!("expected {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[rstest::rstest]
    #[case(None, DynCodec::Text)]
    #[case(Some("trimmed"), DynCodec::Trimmed)]
    #[case(Some("decimal:2"), DynCodec::Decimal(2))]
    #[case(Some("date:%m%d%y"), DynCodec::Date("%m%d%y".to_string()))]
    #[case(Some("date"), DynCodec::Date("%Y-%m-%d".to_string()))]
    fn test_parse(#[case] name: Option<&str>, #[case] expected: DynCodec) {
        assert_eq!(DynCodec::parse(name).unwrap(), expected);
    }

    #[rstest::rstest]
    #[case("money")]
    #[case("decimal")]
    #[case("decimal:x")]
    #[case("decimal:40")]
    #[case("text:upper")]
    fn test_parse_rejects(#[case] name: &str) {
        assert!(DynCodec::parse(Some(name)).is_err());
    }

    #[rstest::rstest]
    fn test_pennies_and_dates() {
        let pennies = DynCodec::Decimal(2);
        assert_eq!(pennies.encode(Some(&json!(1050.0))).unwrap(), "105000");
        assert_eq!(pennies.decode("0000105000").unwrap(), json!(1050.0));

        let date = DynCodec::Date("%m%d%y".to_string());
        assert_eq!(date.encode(Some(&json!("2020-02-03"))).unwrap(), "020320");
        assert_eq!(date.decode("020320").unwrap(), json!("2020-02-03"));
    }

    #[rstest::rstest]
    fn test_integers() {
        let integer = DynCodec::Integer;
        assert_eq!(integer.encode(Some(&json!(164))).unwrap(), "164");
        assert_eq!(integer.encode(Some(&json!("00164"))).unwrap(), "164");
        assert_eq!(integer.decode("00164").unwrap(), json!(164));
        assert!(integer.encode(Some(&json!(1.5))).is_err());
        assert!(integer.decode("1x").is_err());
    }

    #[rstest::rstest]
    fn test_null_and_missing_encode_empty() {
        assert_eq!(DynCodec::Integer.encode(None).unwrap(), "");
        assert_eq!(DynCodec::Text.encode(Some(&Value::Null)).unwrap(), "");
        assert!(DynCodec::Text.encode(Some(&json!([1]))).is_err());
    }

    #[rstest::rstest]
    fn test_number_keeps_integers_integral() {
        assert_eq!(DynCodec::Number.decode("0042").unwrap(), json!(42));
        assert_eq!(DynCodec::Number.decode("04.5").unwrap(), json!(4.5));
        assert_eq!(DynCodec::Number.encode(Some(&json!(4.5))).unwrap(), "4.5");
    }
}
