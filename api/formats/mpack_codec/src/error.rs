// Copyright 2015-2024 Swim Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::str::Utf8Error;

use mpack_model::ValueKind;
use thiserror::Error;


/// Writing out to MessagePack can fail because of an IO error or because a value exceeds the
/// limitations of the MessagePack format.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// An error ocurred in the underlying sink.
    #[error("An error ocurred writing the content: {0}")]
    Io(#[from] io::Error),
    /// A string, blob or collection has a length that does not fit into a `u32`.
    #[error("{kind} of length {len} is too large to encode as MessagePack.")]
    TooLarge { kind: ValueKind, len: usize },
}

impl PartialEq for EncodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                EncodeError::TooLarge { kind, len },
                EncodeError::TooLarge {
                    kind: other_kind,
                    len: other_len,
                },
            ) => kind == other_kind && len == other_len,
            _ => false,
        }
    }
}

/// Reading MessagePack data can fail if the bytes do not constitute valid MessagePack, the input
/// ends part way through a value or the input exceeds the limits of the reader.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// An error ocurred in the underlying source.
    #[error("An error ocurred reading the content: {0}")]
    Io(#[source] io::Error),
    /// The input terminated part way through a value.
    #[error("The input ended part way through a value.")]
    UnexpectedEof,
    /// A string value contained invalid UTF8.
    #[error("A string value contained invalid UTF8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    /// The marker byte is reserved or describes an unsupported type.
    #[error("Unexpected message pack marker: {0:#04x}")]
    UnknownTag(u8),
    /// An unsigned integer was too large to be represented as a signed 64-bit integer.
    #[error("{0} is too large to be represented as a 64-bit signed integer.")]
    IntegerOverflow(u64),
    /// Arrays and maps were nested more deeply than the configured limit.
    #[error("Arrays and maps were nested more deeply than the limit of {0}.")]
    DepthLimitExceeded(usize),
    /// A length prefix exceeded the configured limit.
    #[error("A length of {len} exceeds the limit of {limit}.")]
    LengthLimitExceeded { len: u32, limit: u32 },
    /// Input remained after a complete value was read.
    #[error("{0} bytes remained after the value was decoded.")]
    TrailingBytes(usize),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::UnexpectedEof
        } else {
            DecodeError::Io(err)
        }
    }
}

impl PartialEq for DecodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DecodeError::UnexpectedEof, DecodeError::UnexpectedEof) => true,
            (DecodeError::InvalidUtf8(e1), DecodeError::InvalidUtf8(e2)) => e1 == e2,
            (DecodeError::UnknownTag(t1), DecodeError::UnknownTag(t2)) => t1 == t2,
            (DecodeError::IntegerOverflow(n), DecodeError::IntegerOverflow(m)) => n == m,
            (DecodeError::DepthLimitExceeded(n), DecodeError::DepthLimitExceeded(m)) => n == m,
            (
                DecodeError::LengthLimitExceeded { len, limit },
                DecodeError::LengthLimitExceeded {
                    len: other_len,
                    limit: other_limit,
                },
            ) => len == other_len && limit == other_limit,
            (DecodeError::TrailingBytes(n), DecodeError::TrailingBytes(m)) => n == m,
            _ => false,
        }
    }
}

/// Coarse classification of [`MsgPackError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgPackErrorKind {
    Io,
    TooLarge,
    UnexpectedEof,
    InvalidUtf8,
    UnknownTag,
    IntegerOverflow,
    LimitExceeded,
    TrailingBytes,
}

/// A single error type for hosts that do not need to distinguish the direction of the failure.
/// The original error is retained as the source.
#[derive(Debug, Error, PartialEq)]
pub enum MsgPackError {
    #[error("Encoding MessagePack failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Decoding MessagePack failed: {0}")]
    Decode(#[from] DecodeError),
}

impl MsgPackError {
    pub fn kind(&self) -> MsgPackErrorKind {
        match self {
            MsgPackError::Encode(EncodeError::Io(_)) => MsgPackErrorKind::Io,
            MsgPackError::Encode(EncodeError::TooLarge { .. }) => MsgPackErrorKind::TooLarge,
            MsgPackError::Decode(err) => match err {
                DecodeError::Io(_) => MsgPackErrorKind::Io,
                DecodeError::UnexpectedEof => MsgPackErrorKind::UnexpectedEof,
                DecodeError::InvalidUtf8(_) => MsgPackErrorKind::InvalidUtf8,
                DecodeError::UnknownTag(_) => MsgPackErrorKind::UnknownTag,
                DecodeError::IntegerOverflow(_) => MsgPackErrorKind::IntegerOverflow,
                DecodeError::DepthLimitExceeded(_) | DecodeError::LengthLimitExceeded { .. } => {
                    MsgPackErrorKind::LimitExceeded
                }
                DecodeError::TrailingBytes(_) => MsgPackErrorKind::TrailingBytes,
            },
        }
    }
}
