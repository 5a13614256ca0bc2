//! Schema model: the ordered slot list that drives both directions.
//!
//! A record type describes itself once through [`FixedRecord::describe`];
//! the resulting [`Schema`] is memoized by the [`registry`] and shared by
//! every encode and decode of that type.

pub mod registry;

use std::any::type_name;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::codec::{DefaultCodec, FieldCodec, TextValue};
use crate::constants::DEFAULT_PAD;
use crate::decode::Deserializer;
use crate::encode::Serializer;
use crate::error::{CodecError, Error};
use crate::node::{FixedDeserialize, FixedSerialize};
use crate::Result;

/// Which side of the slot keeps the value when it is shorter than the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Value first, padding after it.
    Left,
    /// Padding first, value last.
    #[default]
    Right,
}

/// What happens when a rendered value is longer than its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Reject,
    /// Keep the first `width` characters.
    Truncate,
}

pub(crate) type EncodeFn<R> = Box<dyn Fn(&R) -> std::result::Result<String, CodecError> + Send + Sync>;
pub(crate) type DecodeFn<R> =
    Box<dyn Fn(&mut R, &str) -> std::result::Result<(), CodecError> + Send + Sync>;
pub(crate) type WriteFn<R> = Box<dyn Fn(&R, &mut Serializer) -> Result<()> + Send + Sync>;
pub(crate) type ReadFn<R> =
    Box<dyn Fn(&mut R, &mut Deserializer<'_>, bool) -> Result<bool> + Send + Sync>;

pub(crate) enum Binding<R> {
    Leaf {
        encode: EncodeFn<R>,
        /// `None` for read-only slots: written on encode, skipped on decode.
        decode: Option<DecodeFn<R>>,
    },
    Nested {
        write: WriteFn<R>,
        /// Returns whether the nested value produced anything.
        read: ReadFn<R>,
    },
}

/// One slot of a record.
pub struct FieldSpec<R> {
    name: SmolStr,
    position: i32,
    width: usize,
    pad: char,
    alignment: Alignment,
    overflow: Overflow,
    pub(crate) binding: Binding<R>,
}

impl<R> FieldSpec<R> {
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    /// Character width; always 0 for nested slots.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn pad(&self) -> char {
        self.pad
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.binding, Binding::Nested { .. })
    }

    pub fn is_writable(&self) -> bool {
        match &self.binding {
            Binding::Leaf { decode, .. } => decode.is_some(),
            Binding::Nested { .. } => true,
        }
    }
}

impl<R> fmt::Debug for FieldSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("width", &self.width)
            .field("pad", &self.pad)
            .field("alignment", &self.alignment)
            .field("overflow", &self.overflow)
            .field("nested", &self.is_nested())
            .field("writable", &self.is_writable())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// No slots at all; encodes to nothing and never decodes.
    Empty,
    /// Every slot is a leaf; the record occupies exactly one line.
    Leaf { total_width: usize },
    /// Every slot is nested; each slot starts on its own line.
    Composite,
}

pub struct Schema<R> {
    name: SmolStr,
    fields: Vec<FieldSpec<R>>,
    pattern: Option<Regex>,
    kind: SchemaKind,
    construct: Box<dyn Fn() -> R + Send + Sync>,
}

impl<R: FixedRecord> Schema<R> {
    /// Run the record's description and validate it. Uncached; most callers
    /// want [`registry::schema`].
    pub fn describe() -> Result<Self> {
        let mut builder = SchemaBuilder::new(type_name::<R>(), R::default);
        R::describe(&mut builder);
        builder.build()
    }
}

impl<R> Schema<R> {
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    /// Slots in ascending position order.
    pub fn fields(&self) -> &[FieldSpec<R>] {
        &self.fields
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Sum of all slot widths, 0 for composite and empty schemas.
    pub fn total_width(&self) -> usize {
        match self.kind {
            SchemaKind::Leaf { total_width } => total_width,
            _ => 0,
        }
    }

    pub(crate) fn instantiate(&self) -> R {
        (self.construct)()
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// A type with a fixed-width layout.
///
/// ```
/// use fixed_width::schema::{FixedRecord, SchemaBuilder};
///
/// #[derive(Default)]
/// struct Header {
///     bank_id: u32,
///     account: String,
/// }
///
/// impl FixedRecord for Header {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.pattern("^\\*03");
///         schema.field("start", 0, 3).read_only(|_| "*03".to_string());
///         schema.field("bank_id", 1, 5).bind(|r| r.bank_id, |r, v| r.bank_id = v);
///         schema.field("account", 2, 10).bind(|r| r.account.clone(), |r, v| r.account = v);
///     }
/// }
///
/// let header = Header { bank_id: 164, account: "5555333111".into() };
/// assert_eq!(fixed_width::to_string(&header).unwrap(), "*03001645555333111");
/// ```
pub trait FixedRecord: Default + Send + Sync + 'static {
    fn describe(schema: &mut SchemaBuilder<Self>);
}

pub struct SchemaBuilder<R> {
    name: SmolStr,
    fields: Vec<FieldSpec<R>>,
    pattern: Option<String>,
    construct: Box<dyn Fn() -> R + Send + Sync>,
}

impl<R: 'static> SchemaBuilder<R> {
    pub fn new(
        name: impl Into<SmolStr>,
        construct: impl Fn() -> R + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            pattern: None,
            construct: Box::new(construct),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    /// Start a leaf slot. Defaults: pad `'0'`, right aligned, overflow rejected.
    pub fn field(
        &mut self,
        name: impl Into<SmolStr>,
        position: i32,
        width: usize,
    ) -> FieldBuilder<'_, R> {
        FieldBuilder {
            schema: self,
            name: name.into(),
            position,
            width,
            pad: DEFAULT_PAD,
            alignment: Alignment::default(),
            overflow: Overflow::default(),
        }
    }

    /// Declare a slot holding a nested record or collection.
    pub fn nested<F>(
        &mut self,
        name: impl Into<SmolStr>,
        position: i32,
        get: impl Fn(&R) -> &F + Send + Sync + 'static,
        set: impl Fn(&mut R, F) + Send + Sync + 'static,
    ) -> &mut Self
    where
        F: FixedSerialize + FixedDeserialize + 'static,
    {
        let write: WriteFn<R> =
            Box::new(move |record: &R, serializer: &mut Serializer| {
                get(record).serialize_fixed(serializer)
            });
        let read: ReadFn<R> = Box::new(
            move |record: &mut R, deserializer: &mut Deserializer<'_>, part: bool| {
                match F::deserialize_fixed(deserializer, part)? {
                    Some(value) => {
                        set(record, value);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            },
        );
        self.nested_raw(name, position, write, read)
    }

    pub(crate) fn nested_raw(
        &mut self,
        name: impl Into<SmolStr>,
        position: i32,
        write: WriteFn<R>,
        read: ReadFn<R>,
    ) -> &mut Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            position,
            width: 0,
            pad: DEFAULT_PAD,
            alignment: Alignment::default(),
            overflow: Overflow::default(),
            binding: Binding::Nested { write, read },
        });
        self
    }

    /// Line guard applied before a leaf record is decoded. Unanchored.
    pub fn pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn build(mut self) -> Result<Schema<R>> {
        self.fields.sort_by_key(|field| field.position);

        let nested = self.fields.iter().filter(|field| field.is_nested()).count();
        let kind = if self.fields.is_empty() {
            SchemaKind::Empty
        } else if nested == self.fields.len() {
            SchemaKind::Composite
        } else if nested == 0 {
            if let Some(field) = self.fields.iter().find(|field| field.width == 0) {
                return Err(Error::configuration(
                    self.name,
                    format!("field {} has zero width", field.name),
                ));
            }
            SchemaKind::Leaf {
                total_width: self.fields.iter().map(|field| field.width).sum(),
            }
        } else {
            return Err(Error::configuration(
                self.name,
                "a record cannot mix fields and nested records",
            ));
        };

        let pattern = match self.pattern {
            Some(pattern) => Some(Regex::new(&pattern).map_err(|err| {
                Error::configuration(self.name.clone(), format!("invalid pattern {pattern:?}: {err}"))
            })?),
            None => None,
        };

        log::debug!(
            "built schema for {}: {:?}, {} slot(s)",
            self.name,
            kind,
            self.fields.len()
        );

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            pattern,
            kind,
            construct: self.construct,
        })
    }
}

pub struct FieldBuilder<'a, R> {
    schema: &'a mut SchemaBuilder<R>,
    name: SmolStr,
    position: i32,
    width: usize,
    pad: char,
    alignment: Alignment,
    overflow: Overflow,
}

impl<'a, R: 'static> FieldBuilder<'a, R> {
    pub fn pad(mut self, pad: char) -> Self {
        self.pad = pad;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn left(self) -> Self {
        self.align(Alignment::Left)
    }

    pub fn right(self) -> Self {
        self.align(Alignment::Right)
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn truncate(self) -> Self {
        self.overflow(Overflow::Truncate)
    }

    /// Bind through the value's default text conversion.
    pub fn bind<V>(
        self,
        get: impl Fn(&R) -> V + Send + Sync + 'static,
        set: impl Fn(&mut R, V) + Send + Sync + 'static,
    ) -> &'a mut SchemaBuilder<R>
    where
        V: TextValue + 'static,
    {
        self.bind_with::<DefaultCodec<V>>(get, set)
    }

    pub fn bind_with<C: FieldCodec>(
        self,
        get: impl Fn(&R) -> C::Value + Send + Sync + 'static,
        set: impl Fn(&mut R, C::Value) + Send + Sync + 'static,
    ) -> &'a mut SchemaBuilder<R> {
        let codec = registry::codec::<C>();
        let encoder = codec.clone();
        let encode: EncodeFn<R> = Box::new(move |record: &R| encoder.encode(&get(record)));
        let decode: DecodeFn<R> = Box::new(move |record: &mut R, text: &str| {
            set(record, codec.decode(text)?);
            Ok(())
        });
        self.bind_raw(encode, Some(decode))
    }

    /// Slot that is written but never assigned on decode.
    pub fn read_only<V>(
        self,
        get: impl Fn(&R) -> V + Send + Sync + 'static,
    ) -> &'a mut SchemaBuilder<R>
    where
        V: TextValue + 'static,
    {
        self.read_only_with::<DefaultCodec<V>>(get)
    }

    pub fn read_only_with<C: FieldCodec>(
        self,
        get: impl Fn(&R) -> C::Value + Send + Sync + 'static,
    ) -> &'a mut SchemaBuilder<R> {
        let codec = registry::codec::<C>();
        let encode: EncodeFn<R> = Box::new(move |record: &R| codec.encode(&get(record)));
        self.bind_raw(encode, None)
    }

    pub(crate) fn bind_raw(
        self,
        encode: EncodeFn<R>,
        decode: Option<DecodeFn<R>>,
    ) -> &'a mut SchemaBuilder<R> {
        self.schema.fields.push(FieldSpec {
            name: self.name,
            position: self.position,
            width: self.width,
            pad: self.pad,
            alignment: self.alignment,
            overflow: self.overflow,
            binding: Binding::Leaf { encode, decode },
        });
        self.schema
    }
}
