//! Reading records and collections back from fixed-width lines.
//!
//! Leaf records follow peek, validate, consume: the next line is inspected
//! for width and pattern before it is taken from the cursor. Inside a
//! collection attempt every mismatch reports "nothing here" and leaves the
//! line in place, so the enclosing record can try its next slot.

use std::borrow::Cow;
use std::io::{BufReader, Read};

use smol_str::SmolStr;

use crate::cursor::LineCursor;
use crate::error::Error;
use crate::node::FixedDeserialize;
use crate::options::{DecodeOptions, EmptyCollection};
use crate::schema::{Binding, Schema, SchemaKind};
use crate::Result;

pub(crate) fn from_str<T: FixedDeserialize>(input: &str, options: &DecodeOptions) -> Result<T> {
    let mut deserializer = Deserializer::from_str_with_options(input, options.clone());
    deserialize_root(&mut deserializer)
}

pub(crate) fn from_slice<T: FixedDeserialize>(input: &[u8], options: &DecodeOptions) -> Result<T> {
    let text = std::str::from_utf8(input)?;
    from_str(text, options)
}

pub(crate) fn from_reader<T: FixedDeserialize, R: Read>(
    reader: R,
    options: &DecodeOptions,
) -> Result<T> {
    let mut deserializer =
        Deserializer::from_reader_with_options(BufReader::new(reader), options.clone());
    deserialize_root(&mut deserializer)
}

fn deserialize_root<T: FixedDeserialize>(deserializer: &mut Deserializer<'_>) -> Result<T> {
    let value = deserializer
        .deserialize::<T>()?
        .ok_or_else(|| Error::NoRecord {
            record: T::type_label(),
        })?;
    deserializer.end()?;
    Ok(value)
}

/// Line cursor plus the options every nested read consults.
#[derive(Debug)]
pub struct Deserializer<'de> {
    cursor: LineCursor<'de>,
    options: DecodeOptions,
}

impl<'de> Deserializer<'de> {
    pub fn from_str(input: &'de str) -> Self {
        Self::from_str_with_options(input, DecodeOptions::default())
    }

    pub fn from_str_with_options(input: &'de str, options: DecodeOptions) -> Self {
        Self {
            cursor: LineCursor::from_str(input),
            options,
        }
    }

    pub fn from_reader<R: std::io::BufRead + 'de>(reader: R) -> Self {
        Self::from_reader_with_options(reader, DecodeOptions::default())
    }

    pub fn from_reader_with_options<R: std::io::BufRead + 'de>(reader: R, options: DecodeOptions) -> Self {
        Self {
            cursor: LineCursor::from_reader(reader),
            options,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn cursor(&mut self) -> &mut LineCursor<'de> {
        &mut self.cursor
    }

    /// Read the next top-level value. `Ok(None)` when the input matched
    /// nothing.
    pub fn deserialize<T: FixedDeserialize>(&mut self) -> Result<Option<T>> {
        T::deserialize_fixed(self, false)
    }

    pub fn is_at_end(&mut self) -> Result<bool> {
        self.cursor.at_end()
    }

    /// Apply the trailing-line policy once the caller is done reading.
    pub fn end(&mut self) -> Result<()> {
        if !self.options.deny_trailing_lines || self.cursor.at_end()? {
            return Ok(());
        }
        let line = self.cursor.next_line_number();
        let text = self.cursor.read()?.map(Cow::into_owned).unwrap_or_default();
        Err(Error::TrailingLines { line, text })
    }
}

pub(crate) fn read_record<R>(
    schema: &Schema<R>,
    deserializer: &mut Deserializer<'_>,
    part_of_collection: bool,
) -> Result<Option<R>> {
    if deserializer.cursor.at_end()? {
        return Ok(None);
    }
    match schema.kind() {
        SchemaKind::Empty => Ok(None),
        SchemaKind::Composite => read_composite(schema, deserializer, part_of_collection),
        SchemaKind::Leaf { total_width } => {
            read_leaf(schema, total_width, deserializer, part_of_collection)
        }
    }
}

fn read_composite<R>(
    schema: &Schema<R>,
    deserializer: &mut Deserializer<'_>,
    part_of_collection: bool,
) -> Result<Option<R>> {
    let mut record = schema.instantiate();
    let mut produced = false;
    for field in schema.fields() {
        if let Binding::Nested { read, .. } = &field.binding {
            produced |= read(&mut record, deserializer, part_of_collection)?;
        }
    }
    if part_of_collection && !produced && deserializer.options.blank_composite_ends_collection {
        log::trace!("{}: no nested slot matched, collection ends", schema.name());
        return Ok(None);
    }
    Ok(Some(record))
}

enum Guard {
    Accept,
    Width,
    Pattern,
}

fn read_leaf<R>(
    schema: &Schema<R>,
    total_width: usize,
    deserializer: &mut Deserializer<'_>,
    part_of_collection: bool,
) -> Result<Option<R>> {
    let line_number = deserializer.cursor.next_line_number();
    let guard = match deserializer.cursor.peek()? {
        None => return Ok(None),
        Some(line) if line.chars().count() != total_width => Guard::Width,
        Some(line) => match schema.pattern() {
            Some(pattern) if !pattern.is_match(line) => Guard::Pattern,
            _ => Guard::Accept,
        },
    };

    if !matches!(guard, Guard::Accept) {
        if part_of_collection {
            log::trace!("{}: line {line_number} rejected by guard, backing off", schema.name());
            return Ok(None);
        }
        let text = deserializer
            .cursor
            .read()?
            .map(Cow::into_owned)
            .unwrap_or_default();
        let record = schema.name().clone();
        return Err(match guard {
            Guard::Pattern => Error::Pattern {
                record,
                pattern: schema
                    .pattern()
                    .map(|pattern| SmolStr::new(pattern.as_str()))
                    .unwrap_or_default(),
                line: line_number,
                text,
            },
            _ => Error::Width {
                record,
                expected: total_width,
                line: line_number,
                text,
            },
        });
    }

    let Some(line) = deserializer.cursor.read()? else {
        return Ok(None);
    };
    match decode_line(schema, &line, line_number) {
        Ok(record) => Ok(Some(record)),
        Err(err) if part_of_collection => {
            log::trace!("{}: {err}; line pushed back", schema.name());
            deserializer.cursor.pushback(line);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn decode_line<R>(schema: &Schema<R>, line: &str, line_number: usize) -> Result<R> {
    let mut record = schema.instantiate();
    let mut rest = line;
    for field in schema.fields() {
        let (text, tail) = split_chars(rest, field.width());
        rest = tail;
        let Binding::Leaf {
            decode: Some(decode),
            ..
        } = &field.binding
        else {
            continue;
        };
        decode(&mut record, text).map_err(|source| Error::FieldDecode {
            record: schema.name().clone(),
            field: field.name().clone(),
            line: line_number,
            text: text.to_owned(),
            source,
        })?;
    }
    Ok(record)
}

/// Split after `width` characters; ASCII input slices directly.
fn split_chars(text: &str, width: usize) -> (&str, &str) {
    if width >= text.len() {
        if text.is_ascii() || text.chars().count() <= width {
            return (text, "");
        }
    } else if text.as_bytes()[..width].is_ascii() {
        return text.split_at(width);
    }
    let idx = text
        .char_indices()
        .nth(width)
        .map_or(text.len(), |(idx, _)| idx);
    text.split_at(idx)
}

/// Collect elements until one attempt reports "nothing here".
pub(crate) fn read_sequence<'de, E>(
    deserializer: &mut Deserializer<'de>,
    element: &SmolStr,
    mut read_element: impl FnMut(&mut Deserializer<'de>) -> Result<Option<E>>,
) -> Result<Option<Vec<E>>> {
    if deserializer.cursor.at_end()? {
        return Ok(None);
    }

    let mut items = Vec::new();
    loop {
        let before = deserializer.cursor.position();
        let Some(item) = read_element(deserializer)? else {
            break;
        };
        if deserializer.cursor.position() == before {
            log::trace!("{element}: element consumed no input, collection ends");
            break;
        }
        items.push(item);
    }
    log::trace!("{element}: collection of {} element(s)", items.len());

    if items.is_empty() {
        return match deserializer.options.empty_collection {
            EmptyCollection::Reject => Err(Error::EmptyCollection {
                element: element.clone(),
            }),
            EmptyCollection::Allow => Ok(None),
        };
    }
    Ok(Some(items))
}
