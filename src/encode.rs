//! Auto-mapping from host values to the wire, encode side.
//!
//! [`Encode`] is the custom-value capability: built-in impls cover the
//! scalar types, sequences, string-keyed maps and the generic value space,
//! and downstream types implement it to control their own encoding through
//! the engine APIs.

use std::collections::{BTreeMap, HashMap};

use crate::encoder::Encoder;
use crate::error::Result;
use crate::marker::Marker;
use crate::types::{Char, HighPrecNumber};
use crate::value::AnyValue;
use crate::writer::TokenWrite;

/// A value that can encode itself as UBJSON.
pub trait Encode {
    /// The marker values of this type always carry, when one is statically
    /// known.
    ///
    /// A `Some` return lets containers of this element type use the
    /// optimized typed format, eliding per-element markers. Types whose
    /// marker varies per value (booleans split across `T`/`F`, the generic
    /// value space, options) must return `None`. Implementations
    /// must never report a marker they do not actually write.
    fn fixed_marker() -> Option<Marker>
    where
        Self: Sized,
    {
        None
    }

    /// Emits exactly one complete value through the engine.
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()>;
}

impl Encode for bool {
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_bool(*self)
    }
}

impl Encode for u8 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::UInt8)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_u8(*self)
    }
}

impl Encode for i8 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Int8)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_i8(*self)
    }
}

impl Encode for i16 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Int16)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_i16(*self)
    }
}

impl Encode for i32 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Int32)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_i32(*self)
    }
}

impl Encode for i64 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Int64)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_i64(*self)
    }
}

impl Encode for f32 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Float32)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_f32(*self)
    }
}

impl Encode for f64 {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Float64)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_f64(*self)
    }
}

impl Encode for Char {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::Char)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_char(*self)
    }
}

impl Encode for HighPrecNumber {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::HighPrecNum)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_high_prec(&self.0)
    }
}

impl Encode for String {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::String)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_string(self)
    }
}

impl Encode for &str {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::String)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_string(self)
    }
}

impl Encode for str {
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        e.encode_string(self)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        match self {
            None => e.encode_null(),
            Some(v) => v.encode(e),
        }
    }
}

impl<T: Encode> Encode for Box<T> {
    fn fixed_marker() -> Option<Marker> {
        T::fixed_marker()
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        (**self).encode(e)
    }
}

/// Encodes a sequence: typed and counted when the element type has a usable
/// fixed marker, counted but untyped otherwise.
fn encode_seq<T: Encode, W: TokenWrite>(items: &[T], e: &mut Encoder<W>) -> Result<()> {
    let mut a = match T::fixed_marker() {
        Some(t) if t.is_declarable_type() => e.array_type(t, items.len())?,
        _ => e.array_len(items.len())?,
    };
    for v in items {
        a.encode(v)?;
    }
    a.end()
}

/// Encodes map entries: typed and counted when the value type has a usable
/// fixed marker, counted but untyped otherwise.
fn encode_map<'a, V, W, I>(entries: I, len: usize, e: &mut Encoder<W>) -> Result<()>
where
    V: Encode + 'a,
    W: TokenWrite,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    let mut o = match V::fixed_marker() {
        Some(t) if t.is_declarable_type() => e.object_type(t, len)?,
        _ => e.object_len(len)?,
    };
    for (k, v) in entries {
        o.encode_key(k)?;
        o.encode(v)?;
    }
    o.end()
}

impl<T: Encode> Encode for Vec<T> {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::ArrayStart)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        encode_seq(self, e)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        encode_seq(self, e)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::ArrayStart)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        encode_seq(self, e)
    }
}

impl<V: Encode> Encode for HashMap<String, V> {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::ObjectStart)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        encode_map(self, self.len(), e)
    }
}

impl<V: Encode> Encode for BTreeMap<String, V> {
    fn fixed_marker() -> Option<Marker> {
        Some(Marker::ObjectStart)
    }

    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        encode_map(self, self.len(), e)
    }
}

impl Encode for AnyValue {
    fn encode<W: TokenWrite>(&self, e: &mut Encoder<W>) -> Result<()> {
        match self {
            AnyValue::Null => e.encode_null(),
            AnyValue::Bool(b) => e.encode_bool(*b),
            AnyValue::Int(v) => e.encode_int(*v),
            AnyValue::Float32(v) => e.encode_f32(*v),
            AnyValue::Float64(v) => e.encode_f64(*v),
            AnyValue::Char(c) => e.encode_char(*c),
            AnyValue::HighPrecision(h) => e.encode_high_prec(&h.0),
            AnyValue::Str(s) => e.encode_string(s),
            AnyValue::Array(items) => encode_seq(items, e),
            AnyValue::Object(map) => encode_map(map, map.len(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BinaryEncoder;

    fn marshal<T: Encode + ?Sized>(v: &T) -> Vec<u8> {
        let mut buf = Vec::new();
        BinaryEncoder::new(&mut buf).encode(v).unwrap();
        buf
    }

    #[test]
    fn byte_vectors_use_the_typed_counted_form() {
        assert_eq!(
            marshal(&vec![116u8, 101, 115, 116]),
            [0x5b, 0x24, 0x55, 0x23, 0x55, 0x04, 0x74, 0x65, 0x73, 0x74]
        );
    }

    #[test]
    fn fixed_size_arrays_match_slices_on_the_wire() {
        assert_eq!(marshal(&[1u8, 2, 3]), marshal(&vec![1u8, 2, 3]));
    }

    #[test]
    fn bool_sequences_fall_back_to_untyped() {
        // T/F cannot be a declared type, so the prelude is count-only and
        // every element carries its own marker.
        assert_eq!(
            marshal(&vec![true, false]),
            [b'[', b'#', b'U', 2, b'T', b'F']
        );
    }

    #[test]
    fn nested_sequences_elide_inner_start_markers() {
        let v = vec![vec![1u8], vec![2u8]];
        assert_eq!(
            marshal(&v),
            [
                b'[', b'$', b'[', b'#', b'U', 2, // outer: typed array of arrays
                b'$', b'U', b'#', b'U', 1, 1, // first inner, '[' elided
                b'$', b'U', b'#', b'U', 1, 2, // second inner, '[' elided
            ]
        );
    }

    #[test]
    fn options_encode_null_or_value() {
        assert_eq!(marshal(&None::<i64>), [b'Z']);
        assert_eq!(marshal(&Some(5u8)), [b'U', 5]);
        // Option's marker varies per value, so sequences of options are
        // untyped.
        assert_eq!(<Option<u8> as Encode>::fixed_marker(), None);
    }

    #[test]
    fn string_maps_use_the_object_form() {
        let mut m = HashMap::new();
        m.insert("a".to_owned(), 1u8);
        assert_eq!(
            marshal(&m),
            [b'{', b'$', b'U', b'#', b'U', 1, b'U', 1, b'a', 1]
        );
    }

    #[test]
    fn btree_maps_iterate_in_key_order() {
        let mut m = BTreeMap::new();
        m.insert("b".to_owned(), AnyValue::Int(2));
        m.insert("a".to_owned(), AnyValue::Int(1));
        assert_eq!(
            marshal(&m),
            [
                b'{', b'#', b'U', 2, b'U', 1, b'a', b'U', 1, b'U', 1, b'b', b'U', 2
            ]
        );
    }

    #[test]
    fn any_value_int_is_abstract() {
        assert_eq!(marshal(&AnyValue::Int(8)), [b'U', 8]);
        assert_eq!(marshal(&AnyValue::Int(-42)), [b'i', 0xd6]);
        assert_eq!(marshal(&AnyValue::Int(256)), [b'I', 1, 0]);
        // Sized hosts keep their width.
        assert_eq!(marshal(&8i64)[0], b'L');
    }

    #[test]
    fn fixed_marker_table() {
        assert_eq!(<u8 as Encode>::fixed_marker(), Some(Marker::UInt8));
        assert_eq!(<i8 as Encode>::fixed_marker(), Some(Marker::Int8));
        assert_eq!(<i16 as Encode>::fixed_marker(), Some(Marker::Int16));
        assert_eq!(<i32 as Encode>::fixed_marker(), Some(Marker::Int32));
        assert_eq!(<i64 as Encode>::fixed_marker(), Some(Marker::Int64));
        assert_eq!(<f32 as Encode>::fixed_marker(), Some(Marker::Float32));
        assert_eq!(<f64 as Encode>::fixed_marker(), Some(Marker::Float64));
        assert_eq!(<Char as Encode>::fixed_marker(), Some(Marker::Char));
        assert_eq!(
            <HighPrecNumber as Encode>::fixed_marker(),
            Some(Marker::HighPrecNum)
        );
        assert_eq!(<String as Encode>::fixed_marker(), Some(Marker::String));
        assert_eq!(
            <Vec<u8> as Encode>::fixed_marker(),
            Some(Marker::ArrayStart)
        );
        assert_eq!(
            <HashMap<String, u8> as Encode>::fixed_marker(),
            Some(Marker::ObjectStart)
        );
        assert_eq!(<bool as Encode>::fixed_marker(), None);
        assert_eq!(<AnyValue as Encode>::fixed_marker(), None);
    }
}
