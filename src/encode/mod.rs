//! Rendering of records and sequences to fixed-width text.

mod parallel;

use std::io::Write;

use crate::error::Error;
use crate::node::FixedSerialize;
use crate::options::EncodeOptions;
use crate::schema::{Alignment, Binding, FieldSpec, Overflow, Schema, SchemaKind};
use crate::Result;

pub(crate) fn to_string<T: FixedSerialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<String> {
    let mut serializer = Serializer::with_options(options.clone());
    serializer.serialize(value)?;
    Ok(serializer.finish())
}

pub(crate) fn to_vec<T: FixedSerialize + ?Sized>(
    value: &T,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    Ok(to_string(value, options)?.into_bytes())
}

/// Render fully before writing, so nothing reaches `writer` on error.
pub(crate) fn to_writer<T: FixedSerialize + ?Sized, W: Write>(
    mut writer: W,
    value: &T,
    options: &EncodeOptions,
) -> Result<()> {
    let text = to_string(value, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Output buffer plus the options every nested write consults.
///
/// Lines are separated by the configured line ending; nothing is written
/// after the last line.
#[derive(Debug, Default)]
pub struct Serializer {
    buffer: String,
    options: EncodeOptions,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            buffer: String::new(),
            options,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn serialize<T: FixedSerialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize_fixed(self)
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub(crate) fn write_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn write_line_break(&mut self) {
        self.buffer.push_str(self.options.line_ending.as_str());
    }
}

/// Write one record: nothing for an empty schema, one line per nested slot
/// for a composite, a single line for a leaf record.
pub(crate) fn write_record<R>(schema: &Schema<R>, value: &R, serializer: &mut Serializer) -> Result<()> {
    match schema.kind() {
        SchemaKind::Empty => Ok(()),
        SchemaKind::Composite => {
            for (idx, field) in schema.fields().iter().enumerate() {
                if idx > 0 {
                    serializer.write_line_break();
                }
                if let Binding::Nested { write, .. } = &field.binding {
                    write(value, serializer)?;
                }
            }
            Ok(())
        }
        SchemaKind::Leaf { total_width } => {
            let mut line = String::with_capacity(total_width);
            for field in schema.fields() {
                let Binding::Leaf { encode, .. } = &field.binding else {
                    continue;
                };
                let text = encode(value).map_err(|source| Error::FieldEncode {
                    record: schema.name().clone(),
                    field: field.name().clone(),
                    source,
                })?;
                fit_width(schema, field, &text, &mut line)?;
            }
            serializer.write_str(&line);
            Ok(())
        }
    }
}

/// Append `text` to `line`, padded or truncated to exactly the slot width.
fn fit_width<R>(schema: &Schema<R>, field: &FieldSpec<R>, text: &str, line: &mut String) -> Result<()> {
    let width = field.width();
    let len = text.chars().count();

    if len > width {
        return match field.overflow() {
            Overflow::Reject => Err(Error::Overflow {
                record: schema.name().clone(),
                field: field.name().clone(),
                width,
                value: text.to_owned(),
            }),
            Overflow::Truncate => {
                line.extend(text.chars().take(width));
                Ok(())
            }
        };
    }

    let padding = width - len;
    match field.alignment() {
        Alignment::Right => {
            line.extend(std::iter::repeat(field.pad()).take(padding));
            line.push_str(text);
        }
        Alignment::Left => {
            line.push_str(text);
            line.extend(std::iter::repeat(field.pad()).take(padding));
        }
    }
    Ok(())
}

/// Write elements one per line, in order.
pub(crate) fn write_items<'a, T, I>(items: I, serializer: &mut Serializer) -> Result<()>
where
    T: FixedSerialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    for (idx, item) in items.into_iter().enumerate() {
        if idx > 0 {
            serializer.write_line_break();
        }
        item.serialize_fixed(serializer)?;
    }
    Ok(())
}

/// Like [`write_items`], rendering large slices on the rayon pool when the
/// `parallel` feature is on. The output is identical either way.
pub(crate) fn write_sequence<T: FixedSerialize + Sync>(
    items: &[T],
    serializer: &mut Serializer,
) -> Result<()> {
    if !parallel::should_parallelize(items.len(), serializer.options()) {
        return write_items(items, serializer);
    }

    let options = serializer.options().clone();
    let rendered = parallel::map_items(items, |item| -> Result<String> {
        let mut local = Serializer::with_options(options.clone());
        item.serialize_fixed(&mut local)?;
        Ok(local.finish())
    });
    for (idx, text) in rendered.into_iter().enumerate() {
        let text = text?;
        if idx > 0 {
            serializer.write_line_break();
        }
        serializer.write_str(&text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::LineEnding;
    use crate::schema::{FixedRecord, SchemaBuilder};

    #[derive(Default)]
    struct Padded {
        number: u32,
        name: String,
        code: String,
    }

    impl FixedRecord for Padded {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.field("number", 0, 5).bind(|r| r.number, |r, v| r.number = v);
            schema
                .field("name", 1, 6)
                .pad(' ')
                .left()
                .bind(|r| r.name.clone(), |r, v| r.name = v);
            schema
                .field("code", 2, 3)
                .pad('*')
                .truncate()
                .bind(|r| r.code.clone(), |r, v| r.code = v);
        }
    }

    fn padded(number: u32, name: &str, code: &str) -> Padded {
        Padded {
            number,
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[rstest::rstest]
    #[case(padded(42, "ab", "x"), "00042ab    **x")]
    #[case(padded(12345, "abcdef", "xyz"), "12345abcdefxyz")]
    #[case(padded(7, "", "ABCDE"), "00007      ABC")]
    fn test_leaf_padding(#[case] value: Padded, #[case] expected: &str) {
        let mut serializer = Serializer::new();
        serializer.serialize(&value).unwrap();
        assert_eq!(serializer.finish(), expected);
    }

    #[rstest::rstest]
    fn test_overflow_rejected() {
        let mut serializer = Serializer::new();
        let err = serializer.serialize(&padded(123456, "ab", "x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert!(err.to_string().contains("123456"));
    }

    #[rstest::rstest]
    fn test_sequence_separators() {
        let items = vec![padded(1, "a", "b"), padded(2, "c", "d")];
        let mut serializer =
            Serializer::with_options(EncodeOptions::new().with_line_ending(LineEnding::CrLf));
        serializer.serialize(&items).unwrap();
        assert_eq!(serializer.finish(), "00001a     **b\r\n00002c     **d");
    }

    #[rstest::rstest]
    fn test_threshold_path_matches_serial() {
        let items: Vec<Padded> = (0..40).map(|n| padded(n, "row", "z")).collect();

        let mut serial = Serializer::new();
        serial.serialize(&items).unwrap();

        let mut eager =
            Serializer::with_options(EncodeOptions::new().with_parallel_threshold(2));
        eager.serialize(&items).unwrap();

        assert_eq!(serial.finish(), eager.finish());
    }

    #[rstest::rstest]
    fn test_empty_sequence_writes_nothing() {
        let items: Vec<Padded> = Vec::new();
        let mut serializer = Serializer::new();
        serializer.serialize(&items).unwrap();
        assert_eq!(serializer.as_str(), "");
    }
}
