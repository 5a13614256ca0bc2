//! Record layouts declared as data instead of Rust types.
//!
//! A [`Layout`] is usually loaded from JSON and compiled once; the compiled
//! form decodes files into [`serde_json::Value`] and encodes them back
//! through the same engine the typed records use.
//!
//! ```
//! use fixed_width::layout::Layout;
//! use fixed_width::{DecodeOptions, EncodeOptions};
//! use serde_json::json;
//!
//! let layout = Layout::from_json(r#"{
//!     "root": "Row",
//!     "repeated": true,
//!     "records": {
//!         "Row": { "fields": [
//!             { "name": "code", "position": 0, "width": 3, "pad": " ", "align": "left", "codec": "trimmed" },
//!             { "name": "amount", "position": 1, "width": 6, "codec": "decimal:2" }
//!         ] }
//!     }
//! }"#).unwrap();
//! let compiled = layout.compile().unwrap();
//!
//! let value = compiled.decode_str("AB 001050\nXYZ000099", &DecodeOptions::default()).unwrap();
//! assert_eq!(value, json!([{ "code": "AB", "amount": 10.5 }, { "code": "XYZ", "amount": 0.99 }]));
//! assert_eq!(compiled.encode(&value, &EncodeOptions::default()).unwrap(), "AB 001050\nXYZ000099");
//! ```

mod codec;

use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, Read};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::constants::DEFAULT_PAD;
use crate::decode::{self, Deserializer};
use crate::encode::{self, Serializer};
use crate::error::{CodecError, Error};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::schema::{
    Alignment, DecodeFn, EncodeFn, Overflow, ReadFn, Schema, SchemaBuilder, WriteFn,
};
use crate::Result;

use self::codec::DynCodec;

/// Record value produced by a compiled layout.
pub type DynRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub root: SmolStr,
    /// Root is a collection of `root` records rather than a single one.
    #[serde(default)]
    pub repeated: bool,
    pub records: BTreeMap<SmolStr, RecordDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDef {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: SmolStr,
    pub position: i32,
    #[serde(default)]
    pub width: usize,
    #[serde(default = "default_pad")]
    pub pad: char,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub overflow: Overflow,
    #[serde(default)]
    pub codec: Option<String>,
    /// Fixed text written on encode; the slot is skipped on decode.
    #[serde(default)]
    pub constant: Option<String>,
    /// Name of a record nested in this slot.
    #[serde(default)]
    pub record: Option<SmolStr>,
    /// Name of a record repeated in this slot.
    #[serde(default)]
    pub list: Option<SmolStr>,
}

fn default_pad() -> char {
    DEFAULT_PAD
}

impl Layout {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    /// Build a schema for every record reachable from `root`.
    pub fn compile(&self) -> Result<CompiledLayout> {
        let mut compiler = Compiler {
            layout: self,
            done: HashMap::new(),
            visiting: Vec::new(),
        };
        let root = compiler.record(&self.root)?;
        Ok(CompiledLayout {
            root,
            repeated: self.repeated,
            schemas: compiler.done,
        })
    }
}

struct Compiler<'a> {
    layout: &'a Layout,
    done: HashMap<SmolStr, Arc<Schema<DynRecord>>>,
    visiting: Vec<SmolStr>,
}

impl Compiler<'_> {
    fn record(&mut self, name: &SmolStr) -> Result<Arc<Schema<DynRecord>>> {
        if let Some(schema) = self.done.get(name) {
            return Ok(Arc::clone(schema));
        }
        if self.visiting.contains(name) {
            let path: Vec<&str> = self.visiting.iter().map(SmolStr::as_str).collect();
            return Err(Error::configuration(
                name.clone(),
                format!("record contains itself via {} -> {name}", path.join(" -> ")),
            ));
        }
        let def = self
            .layout
            .records
            .get(name)
            .ok_or_else(|| Error::configuration(name.clone(), "record is not defined"))?;

        self.visiting.push(name.clone());
        let mut builder = SchemaBuilder::new(name.clone(), DynRecord::new);
        if let Some(pattern) = &def.pattern {
            builder.pattern(pattern.clone());
        }
        for field in &def.fields {
            self.field(&mut builder, name, field)?;
        }
        self.visiting.pop();

        let schema = Arc::new(builder.build()?);
        self.done.insert(name.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    fn field(
        &mut self,
        builder: &mut SchemaBuilder<DynRecord>,
        owner: &SmolStr,
        field: &FieldDef,
    ) -> Result<()> {
        match (&field.record, &field.list) {
            (Some(_), Some(_)) => Err(Error::configuration(
                owner.clone(),
                format!("field {} cannot be both a record and a list", field.name),
            )),
            (Some(child), None) => {
                let child = self.record(child)?;
                let (write, read) = record_slot(owner, &field.name, child);
                builder.nested_raw(field.name.clone(), field.position, write, read);
                Ok(())
            }
            (None, Some(child)) => {
                let child = self.record(child)?;
                let (write, read) = list_slot(owner, &field.name, child);
                builder.nested_raw(field.name.clone(), field.position, write, read);
                Ok(())
            }
            (None, None) => leaf_slot(builder, owner, field),
        }
    }
}

fn leaf_slot(builder: &mut SchemaBuilder<DynRecord>, owner: &SmolStr, field: &FieldDef) -> Result<()> {
    let slot = builder
        .field(field.name.clone(), field.position, field.width)
        .pad(field.pad)
        .align(field.align)
        .overflow(field.overflow);

    if let Some(constant) = field.constant.clone() {
        let encode: EncodeFn<DynRecord> = Box::new(move |_: &DynRecord| Ok(constant.clone()));
        slot.bind_raw(encode, None);
        return Ok(());
    }

    let codec = Arc::new(DynCodec::parse(field.codec.as_deref()).map_err(|message| {
        Error::configuration(owner.clone(), format!("field {}: {message}", field.name))
    })?);
    let key = field.name.to_string();
    let (encoder, encode_key) = (Arc::clone(&codec), key.clone());
    let encode: EncodeFn<DynRecord> =
        Box::new(move |record: &DynRecord| encoder.encode(record.get(&encode_key)));
    let decode: DecodeFn<DynRecord> = Box::new(move |record: &mut DynRecord, text: &str| {
        record.insert(key.clone(), codec.decode(text)?);
        Ok(())
    });
    slot.bind_raw(encode, Some(decode));
    Ok(())
}

fn record_slot(
    owner: &SmolStr,
    name: &SmolStr,
    child: Arc<Schema<DynRecord>>,
) -> (WriteFn<DynRecord>, ReadFn<DynRecord>) {
    let key = name.to_string();
    let (write_key, write_child, owner) = (key.clone(), Arc::clone(&child), owner.clone());
    let write: WriteFn<DynRecord> = Box::new(move |record: &DynRecord, serializer: &mut Serializer| {
        match record.get(&write_key) {
            Some(Value::Object(map)) => encode::write_record(&write_child, map, serializer),
            None | Some(Value::Null) => {
                encode::write_record(&write_child, &DynRecord::new(), serializer)
            }
            Some(other) => Err(Error::FieldEncode {
                record: owner.clone(),
                field: SmolStr::new(&write_key),
                source: CodecError::new(format!("expected an object, found {other}")),
            }),
        }
    });
    let read: ReadFn<DynRecord> = Box::new(
        move |record: &mut DynRecord, deserializer: &mut Deserializer<'_>, part: bool| {
            match decode::read_record(&child, deserializer, part)? {
                Some(map) => {
                    record.insert(key.clone(), Value::Object(map));
                    Ok(true)
                }
                None => Ok(false),
            }
        },
    );
    (write, read)
}

fn list_slot(
    owner: &SmolStr,
    name: &SmolStr,
    child: Arc<Schema<DynRecord>>,
) -> (WriteFn<DynRecord>, ReadFn<DynRecord>) {
    let key = name.to_string();
    let (write_key, write_child, owner) = (key.clone(), Arc::clone(&child), owner.clone());
    let write: WriteFn<DynRecord> = Box::new(move |record: &DynRecord, serializer: &mut Serializer| {
        match record.get(&write_key) {
            Some(Value::Array(items)) => write_objects(&write_child, items, serializer),
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(Error::FieldEncode {
                record: owner.clone(),
                field: SmolStr::new(&write_key),
                source: CodecError::new(format!("expected an array, found {other}")),
            }),
        }
    });
    let read: ReadFn<DynRecord> = Box::new(
        move |record: &mut DynRecord, deserializer: &mut Deserializer<'_>, _: bool| {
            let items = decode::read_sequence(deserializer, child.name(), |de| {
                decode::read_record(&child, de, true)
            })?;
            match items {
                Some(items) => {
                    let items = items.into_iter().map(Value::Object).collect();
                    record.insert(key.clone(), Value::Array(items));
                    Ok(true)
                }
                None => Ok(false),
            }
        },
    );
    (write, read)
}

fn write_objects(
    schema: &Schema<DynRecord>,
    items: &[Value],
    serializer: &mut Serializer,
) -> Result<()> {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            serializer.write_line_break();
        }
        match item {
            Value::Object(map) => encode::write_record(schema, map, serializer)?,
            other => {
                return Err(Error::Value {
                    record: schema.name().clone(),
                    message: format!("expected an object, found {other}"),
                })
            }
        }
    }
    Ok(())
}

/// A layout with every record schema built.
#[derive(Debug)]
pub struct CompiledLayout {
    root: Arc<Schema<DynRecord>>,
    repeated: bool,
    schemas: HashMap<SmolStr, Arc<Schema<DynRecord>>>,
}

impl CompiledLayout {
    pub fn root(&self) -> &Schema<DynRecord> {
        &self.root
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    pub fn schema(&self, name: &str) -> Option<&Schema<DynRecord>> {
        self.schemas.get(name).map(Arc::as_ref)
    }

    pub fn decode_str(&self, input: &str, options: &DecodeOptions) -> Result<Value> {
        let mut deserializer = Deserializer::from_str_with_options(input, options.clone());
        self.decode(&mut deserializer)
    }

    pub fn decode_reader<R: Read>(&self, reader: R, options: &DecodeOptions) -> Result<Value> {
        let mut deserializer =
            Deserializer::from_reader_with_options(BufReader::new(reader), options.clone());
        self.decode(&mut deserializer)
    }

    fn decode(&self, deserializer: &mut Deserializer<'_>) -> Result<Value> {
        let root = &self.root;
        let value = if self.repeated {
            decode::read_sequence(deserializer, root.name(), |de| {
                decode::read_record(root, de, true)
            })?
            .map(|items| Value::Array(items.into_iter().map(Value::Object).collect()))
        } else {
            decode::read_record(root, deserializer, false)?.map(Value::Object)
        };
        let value = value.ok_or_else(|| Error::NoRecord {
            record: root.name().clone(),
        })?;
        deserializer.end()?;
        Ok(value)
    }

    pub fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<String> {
        let mut serializer = Serializer::with_options(options.clone());
        match (self.repeated, value) {
            (true, Value::Array(items)) => write_objects(&self.root, items, &mut serializer)?,
            (false, Value::Object(map)) => encode::write_record(&self.root, map, &mut serializer)?,
            (repeated, other) => {
                let expected = if repeated { "an array" } else { "an object" };
                return Err(Error::Value {
                    record: self.root.name().clone(),
                    message: format!("expected {expected}, found {other}"),
                });
            }
        }
        Ok(serializer.finish())
    }
}
