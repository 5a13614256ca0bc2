use std::fmt::{self, Write};
use std::marker::PhantomData;

use chrono::NaiveDate;

use crate::codec::FieldCodec;
use crate::error::CodecError;

/// A `chrono` strftime pattern selected at the type level.
pub trait DateFormat: Send + Sync + 'static {
    const FORMAT: &'static str;
}

/// `20200203`
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactDate;

impl DateFormat for CompactDate {
    const FORMAT: &'static str = "%Y%m%d";
}

/// `2020-02-03`
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDate;

impl DateFormat for IsoDate {
    const FORMAT: &'static str = "%Y-%m-%d";
}

/// `020320`, the two-digit-year layout common in bank issue files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MmDdYy;

impl DateFormat for MmDdYy {
    const FORMAT: &'static str = "%m%d%y";
}

pub struct DateCodec<F>(PhantomData<fn() -> F>);

impl<F> Default for DateCodec<F> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<F: DateFormat> fmt::Debug for DateCodec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateCodec({:?})", F::FORMAT)
    }
}

impl<F: DateFormat> FieldCodec for DateCodec<F> {
    type Value = NaiveDate;

    fn encode(&self, value: &NaiveDate) -> Result<String, CodecError> {
        encode_date(value, F::FORMAT)
    }

    fn decode(&self, text: &str) -> Result<NaiveDate, CodecError> {
        decode_date(text, F::FORMAT)
    }
}

pub(crate) fn encode_date(value: &NaiveDate, format: &str) -> Result<String, CodecError> {
    let mut out = String::new();
    write!(out, "{}", value.format(format))
        .map_err(|_| CodecError::new(format!("invalid date format {format:?}")))?;
    Ok(out)
}

pub(crate) fn decode_date(text: &str, format: &str) -> Result<NaiveDate, CodecError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, format).map_err(|err| {
        CodecError::new(format!("invalid date {trimmed:?} for {format:?}: {err}"))
    })
}
