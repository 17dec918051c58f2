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

//! # MessagePack Codec
//!
//! Canonical MessagePack encoding and decoding for [`mpack_model::Value`].
//!
//! - [`encode`] writes a value to any [`ByteSink`] (every [`std::io::Write`] is a sink).
//! - [`decode`] reads a value from any [`ByteSource`] (every [`std::io::Read`] is a source).
//! - [`MsgPackEncoder`] and [`MsgPackDecoder`] adapt the two to [`tokio_util::codec`].
//!
//! The plain [`decode`] function applies no limits to the input. Untrusted input should be read
//! with [`decode_with_config`] and a bounded [`ReaderConfig`].

mod codec;
mod config;
mod error;
mod io;
mod reader;
mod writer;

pub use codec::{MsgPackCodec, MsgPackDecoder, MsgPackEncoder};
pub use config::{ReaderConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LEN};
pub use error::{DecodeError, EncodeError, MsgPackError, MsgPackErrorKind};
pub use io::{ByteSink, ByteSource};
pub use reader::{decode, decode_from_slice, decode_from_slice_with_config, decode_with_config};
pub use writer::{encode, encode_to_bytes, encode_to_vec};
