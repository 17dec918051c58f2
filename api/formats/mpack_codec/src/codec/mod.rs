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

use bytes::{Buf, BufMut, BytesMut};
use mpack_model::Value;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use crate::config::ReaderConfig;
use crate::io::ByteSource;
use crate::{reader, writer, DecodeError, EncodeError};


/// Upper bound on the additional capacity reserved for a value that is still arriving.
const MAX_RESERVE: usize = 4 * 1024 * 1024;

/// Encodes [`Value`]s as MessagePack. MessagePack values are self delimiting so no length is
/// written ahead of the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackEncoder;

impl<'a> Encoder<&'a Value> for MsgPackEncoder {
    type Error = EncodeError;

    fn encode(&mut self, item: &'a Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut sink = BufMut::writer(&mut *dst);
        writer::encode(item, &mut sink)
    }
}

impl Encoder<Value> for MsgPackEncoder {
    type Error = EncodeError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Value>::encode(self, &item, dst)
    }
}

/// Decodes a stream of MessagePack [`Value`]s. If the buffer does not yet contain a complete
/// value it is left untouched and the decoder waits for more data. The decoder remembers how many
/// bytes the incomplete value needs (at least) and does not attempt to read it again until that
/// many are available. Any other failure leaves the stream unreadable so the buffer is discarded
/// and the error is returned.
///
/// The default decoder uses [`ReaderConfig::bounded`] as it will typically be reading from a
/// remote peer.
#[derive(Debug, Clone, Copy)]
pub struct MsgPackDecoder {
    config: ReaderConfig,
    required: usize,
}

impl MsgPackDecoder {
    pub fn new(config: ReaderConfig) -> Self {
        MsgPackDecoder {
            config,
            required: 0,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl Default for MsgPackDecoder {
    fn default() -> Self {
        MsgPackDecoder::new(ReaderConfig::bounded())
    }
}

impl Decoder for MsgPackDecoder {
    type Item = Value;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.required.max(1) {
            return Ok(None);
        }
        let mut source = BufferedSource::new(src.as_ref());
        let result = reader::decode_with_config(&mut source, &self.config);
        let BufferedSource { offset, required, .. } = source;
        match result {
            Ok(value) => {
                self.required = 0;
                src.advance(offset);
                Ok(Some(value))
            }
            Err(DecodeError::UnexpectedEof) => {
                let required = required.unwrap_or(src.len() + 1);
                self.required = required;
                src.reserve(required.saturating_sub(src.len()).min(MAX_RESERVE));
                Ok(None)
            }
            Err(err) => {
                debug!(
                    error = %err,
                    discarded = src.len(),
                    "Discarding undecodable MessagePack data."
                );
                self.required = 0;
                src.clear();
                Err(err)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(value) => Ok(Some(value)),
            None if buf.is_empty() => Ok(None),
            None => {
                debug!(
                    remaining = buf.len(),
                    "MessagePack stream ended part way through a value."
                );
                self.required = 0;
                buf.clear();
                Err(DecodeError::UnexpectedEof)
            }
        }
    }
}

/// Source over the bytes buffered so far. A read past the end records the number of bytes the
/// buffer must hold for it to succeed, without copying anything.
struct BufferedSource<'a> {
    buffered: &'a [u8],
    offset: usize,
    required: Option<usize>,
}

impl<'a> BufferedSource<'a> {
    fn new(buffered: &'a [u8]) -> Self {
        BufferedSource {
            buffered,
            offset: 0,
            required: None,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let buffered = self.buffered;
        let end = self.offset.saturating_add(len);
        match buffered.get(self.offset..end) {
            Some(bytes) => {
                self.offset = end;
                Ok(bytes)
            }
            None => {
                self.required = Some(end);
                Err(DecodeError::UnexpectedEof)
            }
        }
    }
}

impl ByteSource for BufferedSource<'_> {
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        buf.copy_from_slice(self.take(buf.len())?);
        Ok(())
    }

    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        self.take(len).map(<[u8]>::to_vec)
    }
}

/// Combination of [`MsgPackEncoder`] and [`MsgPackDecoder`] for use with
/// [`tokio_util::codec::Framed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec {
    encoder: MsgPackEncoder,
    decoder: MsgPackDecoder,
}

impl MsgPackCodec {
    pub fn new(config: ReaderConfig) -> Self {
        MsgPackCodec {
            encoder: MsgPackEncoder,
            decoder: MsgPackDecoder::new(config),
        }
    }
}

impl<'a> Encoder<&'a Value> for MsgPackCodec {
    type Error = EncodeError;

    fn encode(&mut self, item: &'a Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Value>::encode(&mut self.encoder, item, dst)
    }
}

impl Encoder<Value> for MsgPackCodec {
    type Error = EncodeError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<Value>::encode(&mut self.encoder, item, dst)
    }
}

impl Decoder for MsgPackCodec {
    type Item = Value;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode_eof(buf)
    }
}
