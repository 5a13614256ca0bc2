//! Field codecs: the value ⇄ text contract applied to every leaf slot.
//!
//! A slot without an explicit codec uses [`DefaultCodec`], which delegates to
//! the value's [`TextValue`] implementation. Custom codecs change formatting
//! or scaling (implied decimals, date patterns) and are plain types
//! implementing [`FieldCodec`]; the registry keeps one shared instance per
//! codec type.
//!
//! # Examples
//! ```
//! use fixed_width::codec::{FieldCodec, Pennies};
//!
//! let codec = Pennies::default();
//! assert_eq!(codec.encode(&1050.0).unwrap(), "105000");
//! assert_eq!(codec.decode("0000105000").unwrap(), 1050.0);
//! ```

mod date;
mod decimal;
pub(crate) mod number;
mod text;

use std::fmt;
use std::marker::PhantomData;

use chrono::NaiveDate;
use smol_str::SmolStr;

use crate::constants::DEFAULT_DATE_FORMAT;
use crate::error::CodecError;

pub use date::{CompactDate, DateCodec, DateFormat, IsoDate, MmDdYy};
pub(crate) use date::{decode_date, encode_date};
pub use decimal::{ImpliedDecimal, Pennies};
pub(crate) use decimal::{decode_implied, encode_implied};
pub use text::Trimmed;

pub trait FieldCodec: Default + Send + Sync + 'static {
    type Value;

    fn encode(&self, value: &Self::Value) -> Result<String, CodecError>;

    fn decode(&self, text: &str) -> Result<Self::Value, CodecError>;
}

/// Generic textual conversion used by [`DefaultCodec`].
///
/// Numeric parsing tolerates surrounding spaces so that space-padded
/// numbers read back; strings are kept verbatim, padding included.
pub trait TextValue: Sized {
    fn to_text(&self) -> String;

    fn from_text(text: &str) -> Result<Self, CodecError>;
}

pub struct DefaultCodec<V>(PhantomData<fn() -> V>);

impl<V> Default for DefaultCodec<V> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<V> Clone for DefaultCodec<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for DefaultCodec<V> {}

impl<V> fmt::Debug for DefaultCodec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultCodec<{}>", std::any::type_name::<V>())
    }
}

impl<V: TextValue + 'static> FieldCodec for DefaultCodec<V> {
    type Value = V;

    fn encode(&self, value: &V) -> Result<String, CodecError> {
        Ok(value.to_text())
    }

    fn decode(&self, text: &str) -> Result<V, CodecError> {
        V::from_text(text)
    }
}

macro_rules! impl_text_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TextValue for $ty {
                fn to_text(&self) -> String {
                    let mut buffer = itoa::Buffer::new();
                    buffer.format(*self).to_owned()
                }

                fn from_text(text: &str) -> Result<Self, CodecError> {
                    let trimmed = text.trim();
                    trimmed.parse::<$ty>().map_err(|err| {
                        CodecError::new(format!(
                            "invalid {} {trimmed:?}: {err}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_text_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_text_value_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TextValue for $ty {
                fn to_text(&self) -> String {
                    number::format_float(*self)
                }

                fn from_text(text: &str) -> Result<Self, CodecError> {
                    let trimmed = text.trim();
                    trimmed.parse::<$ty>().map_err(|err| {
                        CodecError::new(format!(
                            "invalid {} {trimmed:?}: {err}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_text_value_float!(f32, f64);

impl TextValue for bool {
    fn to_text(&self) -> String {
        let text = if *self { "true" } else { "false" };
        text.to_string()
    }

    fn from_text(text: &str) -> Result<Self, CodecError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(CodecError::new(format!("invalid bool {trimmed:?}")))
        }
    }
}

impl TextValue for char {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, CodecError> {
        let candidate = if text.chars().count() == 1 {
            text
        } else {
            text.trim()
        };
        let mut chars = candidate.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(CodecError::new(format!(
                "expected a single character, found {text:?}"
            ))),
        }
    }
}

impl TextValue for String {
    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Result<Self, CodecError> {
        Ok(text.to_owned())
    }
}

impl TextValue for SmolStr {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, CodecError> {
        Ok(SmolStr::new(text))
    }
}

impl TextValue for NaiveDate {
    fn to_text(&self) -> String {
        self.format(DEFAULT_DATE_FORMAT).to_string()
    }

    fn from_text(text: &str) -> Result<Self, CodecError> {
        decode_date(text, DEFAULT_DATE_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_integers_tolerate_padding_spaces() {
        assert_eq!(i64::from_text("19983     ").unwrap(), 19983);
        assert_eq!(u32::from_text("00042").unwrap(), 42);
        assert_eq!(i32::from_text("  -7").unwrap(), -7);
        assert!(i32::from_text("4x2").is_err());
        assert!(u8::from_text("     ").is_err());
    }

    #[rstest::rstest]
    fn test_integer_text() {
        assert_eq!(42i32.to_text(), "42");
        assert_eq!((-5i64).to_text(), "-5");
        assert_eq!(u128::MAX.to_text(), "340282366920938463463374607431768211455");
    }

    #[rstest::rstest]
    fn test_strings_are_verbatim() {
        assert_eq!(String::from_text("  padded ").unwrap(), "  padded ");
        assert_eq!(SmolStr::from_text("*03").unwrap(), "*03");
    }

    #[rstest::rstest]
    fn test_bool_and_char() {
        assert!(bool::from_text(" TRUE").unwrap());
        assert!(!bool::from_text("false").unwrap());
        assert!(bool::from_text("1").is_err());
        assert_eq!(char::from_text(" ").unwrap(), ' ');
        assert_eq!(char::from_text("  Y").unwrap(), 'Y');
        assert!(char::from_text("YN").is_err());
    }

    #[rstest::rstest]
    fn test_default_codec_round_trip() {
        let codec = DefaultCodec::<f64>::default();
        let text = codec.encode(&12.5).unwrap();
        assert_eq!(text, "12.5");
        assert_eq!(codec.decode(&text).unwrap(), 12.5);
    }

    #[rstest::rstest]
    fn test_naive_date_default_text() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        assert_eq!(date.to_text(), "2020-02-03");
        assert_eq!(NaiveDate::from_text("2020-02-03").unwrap(), date);
    }
}
