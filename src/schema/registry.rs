//! Process-wide memo of built schemas and codec instances, keyed by type.
//!
//! Lookups take a read lock. A miss builds the value outside any lock and
//! then inserts it only if nobody else got there first, so concurrent first
//! uses may build twice but every caller observes the same instance.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::codec::FieldCodec;
use crate::error::Error;
use crate::schema::{FixedRecord, Schema};
use crate::Result;

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Memo {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Memo {
    fn get(&self, id: TypeId) -> Option<Entry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&id).cloned()
    }

    fn insert(&self, id: TypeId, entry: Entry) -> Entry {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(id).or_insert(entry).clone()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn schemas() -> &'static Memo {
    static SCHEMAS: OnceLock<Memo> = OnceLock::new();
    SCHEMAS.get_or_init(Memo::default)
}

fn codecs() -> &'static Memo {
    static CODECS: OnceLock<Memo> = OnceLock::new();
    CODECS.get_or_init(Memo::default)
}

/// Schema for `R`, built on first use. Failed builds are not cached.
pub fn schema<R: FixedRecord>() -> Result<Arc<Schema<R>>> {
    let id = TypeId::of::<R>();
    let entry = match schemas().get(id) {
        Some(entry) => entry,
        None => {
            let built: Entry = Arc::new(Schema::<R>::describe()?);
            schemas().insert(id, built)
        }
    };
    entry.downcast::<Schema<R>>().map_err(|_| {
        Error::configuration(type_name::<R>(), "schema registry holds a foreign entry")
    })
}

/// Shared instance of codec `C`.
pub fn codec<C: FieldCodec>() -> Arc<C> {
    let id = TypeId::of::<C>();
    let entry = match codecs().get(id) {
        Some(entry) => entry,
        None => codecs().insert(id, Arc::new(C::default())),
    };
    entry
        .downcast::<C>()
        .unwrap_or_else(|_| Arc::new(C::default()))
}

/// Number of schemas memoized so far.
pub fn cached_schemas() -> usize {
    schemas().len()
}

/// Number of codec instances memoized so far.
pub fn cached_codecs() -> usize {
    codecs().len()
}
