use std::fmt;

use crate::codec::FieldCodec;
use crate::error::CodecError;

/// Scaled fixed-point decimal: the text holds the value in minor units with
/// `SCALE` implied fractional digits, so `1050.00` is written `105000` when
/// `SCALE = 2`. Values are rounded to the nearest minor unit.
#[derive(Default, Clone, Copy)]
pub struct ImpliedDecimal<const SCALE: u32>;

/// Amounts stored as whole pennies.
pub type Pennies = ImpliedDecimal<2>;

impl<const SCALE: u32> fmt::Debug for ImpliedDecimal<SCALE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImpliedDecimal<{SCALE}>")
    }
}

impl<const SCALE: u32> FieldCodec for ImpliedDecimal<SCALE> {
    type Value = f64;

    fn encode(&self, value: &f64) -> Result<String, CodecError> {
        encode_implied(*value, SCALE)
    }

    fn decode(&self, text: &str) -> Result<f64, CodecError> {
        decode_implied(text, SCALE)
    }
}

fn scale_factor(scale: u32) -> Result<f64, CodecError> {
    i32::try_from(scale)
        .ok()
        .filter(|scale| *scale <= 18)
        .map(|scale| 10f64.powi(scale))
        .ok_or_else(|| CodecError::new(format!("unsupported decimal scale {scale}")))
}

pub(crate) fn encode_implied(value: f64, scale: u32) -> Result<String, CodecError> {
    let scaled = (value * scale_factor(scale)?).round();
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return Err(CodecError::new(format!(
            "{value} does not fit in minor units at scale {scale}"
        )));
    }
    let mut buffer = itoa::Buffer::new();
    Ok(buffer.format(scaled as i64).to_owned())
}

pub(crate) fn decode_implied(text: &str, scale: u32) -> Result<f64, CodecError> {
    let trimmed = text.trim();
    let minor = trimmed
        .parse::<i64>()
        .map_err(|err| CodecError::new(format!("invalid implied decimal {trimmed:?}: {err}")))?;
    Ok(minor as f64 / scale_factor(scale)?)
}
