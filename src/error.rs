//! Codec error type.

use thiserror::Error;

use crate::marker::Marker;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while encoding or decoding UBJSON.
///
/// Every error is fatal to the current top-level call; nothing is retried
/// internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying source or sink failure.
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// The source was exhausted in the middle of a token.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// String payload bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string data")]
    InvalidUtf8,

    /// A byte outside the marker space, or a marker that is invalid in its
    /// context (e.g. a singleton as a typed-container element type).
    #[error("illegal marker 0x{0:02x}")]
    IllegalMarker(u8),

    /// A container type parameter (`$`) was not followed by a count (`#`).
    #[error("count marker '#' must follow container type marker, found '{0}'")]
    TypeWithoutCount(Marker),

    /// The next marker did not match the caller's expectation or the
    /// container's declared type.
    #[error("tried to read type '{expected}' but found type '{found}'")]
    WrongTypeRead { expected: Marker, found: Marker },

    /// Attempt to write a non-conforming element into a typed container.
    #[error("unable to write element type '{elem}' to container type '{container}'")]
    WrongTypeWrite { container: Marker, elem: Marker },

    /// An integer value was requested but the marker is not an integer type.
    #[error("expected an integer marker but found '{0}'")]
    ExpectedIntMarker(Marker),

    /// A boolean value was requested but the marker is neither `T` nor `F`.
    #[error("expected 'T' or 'F' but found '{0}'")]
    ExpectedBoolMarker(Marker),

    /// A `Char` value above 127.
    #[error("illegal char value {0}: must not exceed 127")]
    IllegalChar(u8),

    /// A negative length prefix, or one exceeding the decoder's allocation
    /// cap.
    #[error("illegal length {0}")]
    IllegalLength(i64),

    /// A bounded container's element count disagreed with its declared
    /// length at `end()`.
    #[error("container length {len} does not match count {count}")]
    CountMismatch { len: i64, count: i64 },

    /// Attempt to read or write past a bounded container's declared length.
    #[error("too many calls for container with length {0}")]
    TooMany(i64),

    /// A value was written or read where an object key was expected.
    #[error("unable to process value: object expects a key")]
    ExpectedKey,

    /// A key was written or read where an object value was expected.
    #[error("unable to process key: object expects a value")]
    ExpectedValue,

    /// An object ended with a key missing its value.
    #[error("cannot end an object after a key")]
    DanglingKey,

    /// An unbounded container reached another token where its end marker
    /// was required.
    #[error("expected container end marker '{expected}' but found '{found}'")]
    MissingEndMarker { expected: Marker, found: Marker },

    /// Container nesting exceeded the decoder's depth cap.
    #[error("container nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// A record was decoded with an unknown key while unknown fields are
    /// denied.
    #[error("no field named {0:?}")]
    UnknownField(String),

    /// A block was malformed: empty, or not a single octet where a marker
    /// or char was expected.
    #[error("malformed block {0:?}")]
    InvalidBlock(String),

    /// A block expected to hold a decimal number did not parse.
    #[error("failed to parse number from block {0:?}")]
    InvalidNumberBlock(String),
}
