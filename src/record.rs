//! Record field tables and the process-wide descriptor cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::Lazy;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::reader::TokenRead;
use crate::writer::TokenWrite;

/// A struct that maps to a UBJSON object through an ordered field table.
///
/// Records encode as unbounded objects with one entry per field, in table
/// order; on decode, keys resolve through the table's name index and
/// unknown keys are discarded (or rejected when the decoder denies unknown
/// fields). Implement via [`ubjson_record!`](crate::ubjson_record), or by
/// hand for unusual layouts.
pub trait Record: 'static {
    /// Builds the ordered wire-name table for this type. Called at most a
    /// handful of times per process; results are memoized by [`TypeId`].
    fn fields() -> FieldSet;

    /// Encodes the field at `ordinal` (an index into the table) as one
    /// value.
    fn encode_field<W: TokenWrite>(&self, ordinal: usize, e: &mut Encoder<W>) -> Result<()>;

    /// Decodes one value into the field at `ordinal`.
    fn decode_field<R: TokenRead>(&mut self, ordinal: usize, d: &mut Decoder<R>) -> Result<()>;
}

/// Ordered wire names plus a name→ordinal index for one record type.
#[derive(Debug, Clone)]
pub struct FieldSet {
    names: Vec<&'static str>,
    index: HashMap<&'static str, usize>,
}

impl FieldSet {
    pub fn new(names: &[&'static str]) -> Self {
        let index = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        Self {
            names: names.to_vec(),
            index,
        }
    }

    /// Wire names in declaration order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// The ordinal for a wire name, if the record has that field.
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Copy-on-write cache of field tables.
///
/// Readers clone the current snapshot without touching the writer lock, so
/// concurrent encoders and decoders resolve tables without contention.
/// Writers rebuild a fresh map under the mutex and swap it in; two threads
/// computing the same table is tolerated; the later snapshot wins and both
/// tables are identical.
struct FieldCache {
    snapshot: RwLock<Arc<HashMap<TypeId, Arc<FieldSet>>>>,
    writers: Mutex<()>,
}

static FIELD_CACHE: Lazy<FieldCache> = Lazy::new(|| FieldCache {
    snapshot: RwLock::new(Arc::new(HashMap::new())),
    writers: Mutex::new(()),
});

fn load_snapshot() -> Arc<HashMap<TypeId, Arc<FieldSet>>> {
    match FIELD_CACHE.snapshot.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Returns the memoized field table for `T`, computing it on first use.
pub(crate) fn fields_for<T: Record>() -> Arc<FieldSet> {
    let key = TypeId::of::<T>();
    if let Some(found) = load_snapshot().get(&key) {
        return Arc::clone(found);
    }

    // Compute without holding any lock; duplicated effort is harmless.
    let computed = Arc::new(T::fields());

    let _writer = match FIELD_CACHE.writers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut next: HashMap<TypeId, Arc<FieldSet>> = (*load_snapshot()).clone();
    next.insert(key, Arc::clone(&computed));
    match FIELD_CACHE.snapshot.write() {
        Ok(mut guard) => *guard = Arc::new(next),
        Err(poisoned) => *poisoned.into_inner() = Arc::new(next),
    }
    computed
}

/// Derives [`Record`], [`Encode`](crate::Encode) and
/// [`Decode`](crate::Decode) for a struct from its field list.
///
/// Each field's wire name defaults to the field name; `field as "Name"`
/// overrides it. Decoding starts from `Default::default()`, so the struct
/// must implement [`Default`].
///
/// ```
/// use ubjson::ubjson_record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Widget {
///     id: i64,
///     label: String,
/// }
///
/// ubjson_record!(Widget { id, label as "Label" });
///
/// let bytes = ubjson::marshal(&Widget { id: 7, label: "x".into() }).unwrap();
/// let back: Widget = ubjson::unmarshal(&bytes).unwrap();
/// assert_eq!(back, Widget { id: 7, label: "x".into() });
/// ```
#[macro_export]
macro_rules! ubjson_record {
    (@name $field:ident as $wire:literal) => {
        $wire
    };
    (@name $field:ident) => {
        stringify!($field)
    };
    ($ty:ident { $($field:ident $(as $wire:literal)?),+ $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields() -> $crate::FieldSet {
                $crate::FieldSet::new(&[
                    $($crate::ubjson_record!(@name $field $(as $wire)?)),+
                ])
            }

            fn encode_field<W: $crate::TokenWrite>(
                &self,
                ordinal: usize,
                e: &mut $crate::Encoder<W>,
            ) -> $crate::Result<()> {
                let mut at = 0usize;
                $(
                    if ordinal == at {
                        return e.encode(&self.$field);
                    }
                    at += 1;
                )+
                let _ = at;
                unreachable!("field ordinal {ordinal} out of range")
            }

            fn decode_field<R: $crate::TokenRead>(
                &mut self,
                ordinal: usize,
                d: &mut $crate::Decoder<R>,
            ) -> $crate::Result<()> {
                let mut at = 0usize;
                $(
                    if ordinal == at {
                        self.$field = d.decode()?;
                        return Ok(());
                    }
                    at += 1;
                )+
                let _ = at;
                unreachable!("field ordinal {ordinal} out of range")
            }
        }

        impl $crate::Encode for $ty {
            fn fixed_marker() -> ::core::option::Option<$crate::Marker> {
                ::core::option::Option::Some($crate::Marker::ObjectStart)
            }

            fn encode<W: $crate::TokenWrite>(
                &self,
                e: &mut $crate::Encoder<W>,
            ) -> $crate::Result<()> {
                e.encode_record(self)
            }
        }

        impl $crate::Decode for $ty {
            fn decode<R: $crate::TokenRead>(
                d: &mut $crate::Decoder<R>,
            ) -> $crate::Result<Self> {
                d.decode_record()
            }
        }
    };
}
