//! UBJSON (Universal Binary JSON, Draft 12) encoding and decoding.
//!
//! Two wire forms share one engine: the compact binary form and a
//! human-readable block notation in which every token is wrapped in square
//! brackets.
//!
//! ```
//! use ubjson::AnyValue;
//!
//! let bin = ubjson::marshal(&AnyValue::Int(8)).unwrap();
//! assert_eq!(bin, [b'U', 8]);
//!
//! let block = ubjson::marshal_block(&AnyValue::Str("hello".into())).unwrap();
//! assert_eq!(block, b"[S][U][5][hello]");
//!
//! let back: AnyValue = ubjson::unmarshal(&bin).unwrap();
//! assert_eq!(back, AnyValue::Int(8));
//! ```
//!
//! Most types go through the [`Encode`]/[`Decode`] traits, either with the
//! built-in impls (scalars, `Vec`, string-keyed maps, [`AnyValue`]) or the
//! [`ubjson_record!`] macro for structs. Types needing full control over
//! their wire shape implement the traits by hand against the streaming
//! [`Encoder`]/[`Decoder`] engine, which keeps the optimized container
//! format's invariants (declared types, declared counts, marker elision)
//! intact for custom layouts.

mod decode;
mod decoder;
mod encode;
mod encoder;
mod error;
mod marker;
mod reader;
mod record;
mod types;
mod value;
mod writer;

pub use decode::Decode;
pub use decoder::{
    ArrayDecoder, BinaryDecoder, BlockDecoder, Decoder, ObjectDecoder,
    DEFAULT_MAX_COLLECTION_ALLOC, DEFAULT_MAX_CONTAINER_DEPTH,
};
pub use encode::Encode;
pub use encoder::{ArrayEncoder, BinaryEncoder, BlockEncoder, Encoder, ObjectEncoder};
pub use error::{Error, Result};
pub use marker::Marker;
pub use reader::{BinaryReader, BlockReader, TokenRead};
pub use record::{FieldSet, Record};
pub use types::{Char, HighPrecNumber};
pub use value::AnyValue;
pub use writer::{BinaryWriter, BlockWriter, TokenWrite};

/// Encodes `v` into the compact binary form.
pub fn marshal<T: Encode + ?Sized>(v: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    BinaryEncoder::new(&mut buf).encode(v)?;
    Ok(buf)
}

/// Encodes `v` into the block form.
pub fn marshal_block<T: Encode + ?Sized>(v: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    BlockEncoder::new(&mut buf).encode(v)?;
    Ok(buf)
}

/// Decodes one value from the compact binary form.
pub fn unmarshal<T: Decode>(data: &[u8]) -> Result<T> {
    BinaryDecoder::new(data).decode()
}

/// Decodes one value from the block form.
pub fn unmarshal_block<T: Decode>(data: &[u8]) -> Result<T> {
    BlockDecoder::new(data).decode()
}
