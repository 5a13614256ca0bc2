//! Declarative fixed-width text records.
//!
//! A record type describes its slots once; the crate then writes values as
//! fixed-width lines and reads them back, including nested records and
//! repeated groups whose length is discovered while reading.
//!
//! ```
//! use fixed_width::codec::Pennies;
//! use fixed_width::schema::{FixedRecord, SchemaBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Payment {
//!     id: u32,
//!     amount: f64,
//! }
//!
//! impl FixedRecord for Payment {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.field("id", 0, 5).bind(|r| r.id, |r, v| r.id = v);
//!         schema
//!             .field("amount", 1, 8)
//!             .bind_with::<Pennies>(|r| r.amount, |r, v| r.amount = v);
//!     }
//! }
//!
//! let payments = vec![
//!     Payment { id: 42, amount: 10.5 },
//!     Payment { id: 43, amount: 0.99 },
//! ];
//! let text = fixed_width::to_string(&payments)?;
//! assert_eq!(text, "0004200001050\n0004300000099");
//! let back: Vec<Payment> = fixed_width::from_str(&text)?;
//! assert_eq!(back, payments);
//! # Ok::<(), fixed_width::Error>(())
//! ```

pub mod codec;
pub mod constants;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod layout;
pub mod node;
pub mod options;
pub mod schema;

use std::io::{Read, Write};

pub use crate::decode::Deserializer;
pub use crate::encode::Serializer;
pub use crate::error::{CodecError, Error, ErrorKind, ErrorStage};
pub use crate::layout::{CompiledLayout, Layout};
pub use crate::node::{FixedDeserialize, FixedSerialize};
pub use crate::options::{DecodeOptions, EmptyCollection, EncodeOptions, LineEnding};
pub use crate::schema::{Alignment, FixedRecord, Overflow, SchemaBuilder};

pub type Result<T> = std::result::Result<T, Error>;

pub fn to_string<T: FixedSerialize + ?Sized>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

pub fn to_string_with_options<T: FixedSerialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<String> {
    encode::to_string(value, options)
}

pub fn to_vec<T: FixedSerialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    to_vec_with_options(value, &EncodeOptions::default())
}

pub fn to_vec_with_options<T: FixedSerialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    encode::to_vec(value, options)
}

pub fn to_writer<T: FixedSerialize + ?Sized, W: Write>(writer: W, value: &T) -> Result<()> {
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

pub fn to_writer_with_options<T: FixedSerialize + ?Sized, W: Write>(
    writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}

/// Decode one root value from `input`.
///
/// Input that yields no record at all (empty text included) is
/// [`Error::NoRecord`] here; [`Deserializer::deserialize`] reports the same
/// case as `Ok(None)`.
pub fn from_str<T: FixedDeserialize>(input: &str) -> Result<T> {
    from_str_with_options(input, &DecodeOptions::default())
}

pub fn from_str_with_options<T: FixedDeserialize>(
    input: &str,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_str(input, options)
}

pub fn from_slice<T: FixedDeserialize>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &DecodeOptions::default())
}

pub fn from_slice_with_options<T: FixedDeserialize>(
    input: &[u8],
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_slice(input, options)
}

/// Reader counterpart of [`from_str`]; empty input is [`Error::NoRecord`].
pub fn from_reader<T: FixedDeserialize, R: Read>(reader: R) -> Result<T> {
    from_reader_with_options(reader, &DecodeOptions::default())
}

pub fn from_reader_with_options<T: FixedDeserialize, R: Read>(
    reader: R,
    options: &DecodeOptions,
) -> Result<T> {
    decode::from_reader(reader, options)
}
