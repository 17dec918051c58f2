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

use mpack_model::Value;
use rmp::Marker;
use tracing::debug;

use crate::config::ReaderConfig;
use crate::io::ByteSource;
use crate::DecodeError;

#[cfg(test)]
mod tests;

/// Upper bound on the capacity reserved for an array or map before its elements have been read.
const PREALLOC_ITEMS: usize = 1024;

/// Read a single [`Value`] from MessagePack data. No limits are applied to the nesting depth or
/// to the lengths in the data so this should only be used with trusted input. See
/// [`decode_with_config`].
///
/// # Arguments
/// * `source` - The source of the MessagePack data. Only the bytes of the value are consumed.
pub fn decode<S>(source: &mut S) -> Result<Value, DecodeError>
where
    S: ByteSource + ?Sized,
{
    decode_with_config(source, &ReaderConfig::UNBOUNDED)
}

/// Read a single [`Value`] from MessagePack data, enforcing the limits in the configuration.
///
/// # Arguments
/// * `source` - The source of the MessagePack data. Only the bytes of the value are consumed.
/// * `config` - Limits on the nesting depth and lengths.
pub fn decode_with_config<S>(source: &mut S, config: &ReaderConfig) -> Result<Value, DecodeError>
where
    S: ByteSource + ?Sized,
{
    ValueReader { source, config }.read_value(0)
}

/// Read a [`Value`] that must occupy the entire slice.
pub fn decode_from_slice(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_from_slice_with_config(bytes, &ReaderConfig::UNBOUNDED)
}

/// Read a [`Value`] that must occupy the entire slice, enforcing the limits in the configuration.
pub fn decode_from_slice_with_config(
    mut bytes: &[u8],
    config: &ReaderConfig,
) -> Result<Value, DecodeError> {
    let value = decode_with_config(&mut bytes, config)?;
    if bytes.is_empty() {
        Ok(value)
    } else {
        Err(DecodeError::TrailingBytes(bytes.len()))
    }
}

struct ValueReader<'a, S: ?Sized> {
    source: &'a mut S,
    config: &'a ReaderConfig,
}

impl<S> ValueReader<'_, S>
where
    S: ByteSource + ?Sized,
{
    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.source.read_exact_bytes(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [b] = self.read_fixed::<1>()?;
        Ok(b)
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_fixed()?))
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_fixed()?))
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let tag = self.read_u8()?;
        match Marker::from_u8(tag) {
            Marker::FixPos(n) => Ok(Value::Int(n.into())),
            Marker::FixNeg(n) => Ok(Value::Int(n.into())),
            Marker::Null => Ok(Value::Nil),
            Marker::True => Ok(Value::Bool(true)),
            Marker::False => Ok(Value::Bool(false)),
            Marker::U8 => Ok(Value::Int(self.read_u8()?.into())),
            Marker::U16 => Ok(Value::Int(self.read_u16()?.into())),
            Marker::U32 => Ok(Value::Int(self.read_u32()?.into())),
            Marker::U64 => {
                let n = u64::from_be_bytes(self.read_fixed()?);
                i64::try_from(n)
                    .map(Value::Int)
                    .map_err(|_| DecodeError::IntegerOverflow(n))
            }
            Marker::I8 => Ok(Value::Int(i8::from_be_bytes(self.read_fixed()?).into())),
            Marker::I16 => Ok(Value::Int(i16::from_be_bytes(self.read_fixed()?).into())),
            Marker::I32 => Ok(Value::Int(i32::from_be_bytes(self.read_fixed()?).into())),
            Marker::I64 => Ok(Value::Int(i64::from_be_bytes(self.read_fixed()?))),
            Marker::F32 => Ok(Value::Float32(f32::from_be_bytes(self.read_fixed()?))),
            Marker::F64 => Ok(Value::Float(f64::from_be_bytes(self.read_fixed()?))),
            Marker::FixStr(len) => self.read_string(len.into()),
            Marker::Str8 => {
                let len = self.read_u8()?.into();
                self.read_string(len)
            }
            Marker::Str16 => {
                let len = self.read_u16()?.into();
                self.read_string(len)
            }
            Marker::Str32 => {
                let len = self.read_u32()?;
                self.read_string(len)
            }
            Marker::Bin8 => {
                let len = self.read_u8()?.into();
                self.read_blob(len)
            }
            Marker::Bin16 => {
                let len = self.read_u16()?.into();
                self.read_blob(len)
            }
            Marker::Bin32 => {
                let len = self.read_u32()?;
                self.read_blob(len)
            }
            Marker::FixArray(len) => self.read_array(len.into(), depth),
            Marker::Array16 => {
                let len = self.read_u16()?.into();
                self.read_array(len, depth)
            }
            Marker::Array32 => {
                let len = self.read_u32()?;
                self.read_array(len, depth)
            }
            Marker::FixMap(len) => self.read_map(len.into(), depth),
            Marker::Map16 => {
                let len = self.read_u16()?.into();
                self.read_map(len, depth)
            }
            Marker::Map32 => {
                let len = self.read_u32()?;
                self.read_map(len, depth)
            }
            _ => Err(DecodeError::UnknownTag(tag)),
        }
    }

    /// Check a length prefix against the configured limit.
    fn check_len(&self, len: u32) -> Result<usize, DecodeError> {
        match self.config.max_len {
            Some(limit) if len > limit => {
                debug!(len, limit, "Rejecting MessagePack length prefix.");
                Err(DecodeError::LengthLimitExceeded { len, limit })
            }
            // u32 always fits in usize on supported targets.
            _ => Ok(len as usize),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        match self.config.max_depth {
            Some(limit) if depth > limit.get() => {
                debug!(limit = limit.get(), "MessagePack nesting limit reached.");
                Err(DecodeError::DepthLimitExceeded(limit.get()))
            }
            _ => Ok(depth),
        }
    }

    fn read_string(&mut self, len: u32) -> Result<Value, DecodeError> {
        let len = self.check_len(len)?;
        let bytes = self.source.read_payload(len)?;
        String::from_utf8(bytes)
            .map(Value::Str)
            .map_err(|err| DecodeError::InvalidUtf8(err.utf8_error()))
    }

    fn read_blob(&mut self, len: u32) -> Result<Value, DecodeError> {
        let len = self.check_len(len)?;
        Ok(Value::Bin(self.source.read_payload(len)?))
    }

    fn read_array(&mut self, len: u32, depth: usize) -> Result<Value, DecodeError> {
        let len = self.check_len(len)?;
        let depth = self.enter(depth)?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_ITEMS));
        for _ in 0..len {
            items.push(self.read_value(depth)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: u32, depth: usize) -> Result<Value, DecodeError> {
        let len = self.check_len(len)?;
        let depth = self.enter(depth)?;
        let mut entries = Vec::with_capacity(len.min(PREALLOC_ITEMS));
        for _ in 0..len {
            let key = self.read_value(depth)?;
            let value = self.read_value(depth)?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }
}
