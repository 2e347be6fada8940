//! Auto-mapping from the wire to host values, decode side.

use std::collections::{BTreeMap, HashMap};

use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::reader::TokenRead;
use crate::types::{Char, HighPrecNumber};
use crate::value::AnyValue;

/// A value that can decode itself from UBJSON.
///
/// This is the decode half of the custom-value capability: implementations
/// consume exactly one complete value through the engine, whose typed entry
/// points assert every marker against the stream or the enclosing
/// container's declared type.
pub trait Decode: Sized {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self>;
}

impl Decode for bool {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_bool()
    }
}

impl Decode for u8 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_u8()
    }
}

impl Decode for i8 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_i8()
    }
}

impl Decode for i16 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_i16()
    }
}

impl Decode for i32 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_i32()
    }
}

impl Decode for i64 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_i64()
    }
}

impl Decode for f32 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_f32()
    }
}

impl Decode for f64 {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_f64()
    }
}

impl Decode for Char {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_char()
    }
}

impl Decode for HighPrecNumber {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_high_prec()
    }
}

impl Decode for String {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_string()
    }
}

impl Decode for AnyValue {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        d.decode_any()
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        match d.peek_val_type()? {
            Marker::Null => {
                d.expect_type(Marker::Null)?;
                Ok(None)
            }
            _ => T::decode(d).map(Some),
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        T::decode(d).map(Box::new)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        let mut a = d.array()?;
        let mut out = Vec::with_capacity(a.len().unwrap_or(0));
        while a.next_elem() {
            out.push(a.decode()?);
        }
        a.end()?;
        Ok(out)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        let mut a = d.array()?;
        if let Some(declared) = a.len() {
            if declared != N {
                return Err(Error::CountMismatch {
                    len: declared as i64,
                    count: N as i64,
                });
            }
        }
        let mut out = Vec::with_capacity(N);
        for _ in 0..N {
            out.push(a.decode()?);
        }
        a.end()?;
        out.try_into().map_err(|_| Error::CountMismatch {
            len: N as i64,
            count: N as i64,
        })
    }
}

impl<V: Decode> Decode for HashMap<String, V> {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        let mut o = d.object()?;
        let mut out = HashMap::with_capacity(o.len().unwrap_or(0));
        while o.next_entry() {
            let key = o.decode_key()?;
            let val = o.decode()?;
            out.insert(key, val);
        }
        o.end()?;
        Ok(out)
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn decode<R: TokenRead>(d: &mut Decoder<R>) -> Result<Self> {
        let mut o = d.object()?;
        let mut out = BTreeMap::new();
        while o.next_entry() {
            let key = o.decode_key()?;
            let val = o.decode()?;
            out.insert(key, val);
        }
        o.end()?;
        Ok(out)
    }
}
