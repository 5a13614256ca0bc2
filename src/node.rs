//! Dispatch between record values and collections of them.
//!
//! Every [`FixedRecord`] is serializable through its memoized schema; the
//! container impls below give sequences the line-per-element layout.

use std::any::type_name;
use std::collections::VecDeque;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::decode::{self, Deserializer};
use crate::encode::{self, Serializer};
use crate::error::Error;
use crate::schema::{registry, FixedRecord};
use crate::Result;

pub trait FixedSerialize {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()>;
}

pub trait FixedDeserialize: Sized {
    /// `Ok(None)` means "nothing here": the input is exhausted, or an
    /// attempt made as part of a collection did not match.
    fn deserialize_fixed(
        deserializer: &mut Deserializer<'_>,
        part_of_collection: bool,
    ) -> Result<Option<Self>>;

    /// Name used in error messages.
    fn type_label() -> SmolStr {
        SmolStr::new_static(type_name::<Self>())
    }
}

impl<R: FixedRecord> FixedSerialize for R {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        let schema = registry::schema::<R>()?;
        encode::write_record(&schema, self, serializer)
    }
}

impl<R: FixedRecord> FixedDeserialize for R {
    fn deserialize_fixed(
        deserializer: &mut Deserializer<'_>,
        part_of_collection: bool,
    ) -> Result<Option<Self>> {
        let schema = registry::schema::<R>()?;
        decode::read_record(&schema, deserializer, part_of_collection)
    }
}

fn read_elements<T: FixedDeserialize>(deserializer: &mut Deserializer<'_>) -> Result<Option<Vec<T>>> {
    decode::read_sequence(deserializer, &T::type_label(), |de| {
        T::deserialize_fixed(de, true)
    })
}

impl<T: FixedSerialize + Sync> FixedSerialize for [T] {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        encode::write_sequence(self, serializer)
    }
}

impl<T: FixedSerialize + Sync> FixedSerialize for Vec<T> {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        encode::write_sequence(self, serializer)
    }
}

impl<T: FixedDeserialize> FixedDeserialize for Vec<T> {
    fn deserialize_fixed(deserializer: &mut Deserializer<'_>, _: bool) -> Result<Option<Self>> {
        read_elements(deserializer)
    }

    fn type_label() -> SmolStr {
        T::type_label()
    }
}

impl<T: FixedSerialize> FixedSerialize for VecDeque<T> {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        encode::write_items(self.iter(), serializer)
    }
}

impl<T: FixedDeserialize> FixedDeserialize for VecDeque<T> {
    fn deserialize_fixed(deserializer: &mut Deserializer<'_>, _: bool) -> Result<Option<Self>> {
        Ok(read_elements(deserializer)?.map(VecDeque::from))
    }

    fn type_label() -> SmolStr {
        T::type_label()
    }
}

impl<A> FixedSerialize for SmallVec<A>
where
    A: smallvec::Array,
    A::Item: FixedSerialize + Sync,
{
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        encode::write_sequence(self.as_slice(), serializer)
    }
}

impl<A> FixedDeserialize for SmallVec<A>
where
    A: smallvec::Array,
    A::Item: FixedDeserialize,
{
    fn deserialize_fixed(deserializer: &mut Deserializer<'_>, _: bool) -> Result<Option<Self>> {
        Ok(read_elements(deserializer)?.map(SmallVec::from_vec))
    }

    fn type_label() -> SmolStr {
        <A::Item as FixedDeserialize>::type_label()
    }
}

impl<T: FixedSerialize + Sync, const N: usize> FixedSerialize for [T; N] {
    fn serialize_fixed(&self, serializer: &mut Serializer) -> Result<()> {
        encode::write_sequence(self.as_slice(), serializer)
    }
}

/// Fixed-size arrays must match exactly `N` elements.
impl<T: FixedDeserialize, const N: usize> FixedDeserialize for [T; N] {
    fn deserialize_fixed(deserializer: &mut Deserializer<'_>, _: bool) -> Result<Option<Self>> {
        let Some(items) = read_elements::<T>(deserializer)? else {
            return Ok(None);
        };
        items.try_into().map(Some).map_err(|items: Vec<T>| Error::CollectionLength {
            element: T::type_label(),
            expected: N,
            found: items.len(),
        })
    }

    fn type_label() -> SmolStr {
        T::type_label()
    }
}
