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

#[doc(inline)]
pub use mpack_model as model;

pub use mpack_model::{Value, ValueError, ValueKind};

/// Reading and writing MessagePack.
pub mod codec {
    pub use mpack_codec::{
        decode, decode_from_slice, decode_from_slice_with_config, decode_with_config, encode,
        encode_to_bytes, encode_to_vec, ByteSink, ByteSource, ReaderConfig, DEFAULT_MAX_DEPTH,
        DEFAULT_MAX_LEN,
    };

    /// Adapters for [`tokio_util::codec`](https://docs.rs/tokio-util).
    pub mod framing {
        pub use mpack_codec::{MsgPackCodec, MsgPackDecoder, MsgPackEncoder};
    }

    /// Error
    pub mod error {
        pub use mpack_codec::{DecodeError, EncodeError, MsgPackError, MsgPackErrorKind};
    }
}
