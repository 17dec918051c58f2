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

use bytes::{BufMut, Bytes, BytesMut};
use mpack_model::{Value, ValueKind};
use rmp::Marker;
use tracing::trace;

use crate::io::ByteSink;
use crate::EncodeError;


/// Largest header: a marker followed by an 8 byte payload.
const MAX_HEAD_LEN: usize = 9;

/// Write a [`Value`] to a sink as MessagePack.
///
/// The encoding is canonical: integers and lengths always use the smallest representation that
/// can hold them. Integers are always written with the signed markers, other than the positive
/// fixint range. Collections are written recursively, without any limit on the depth.
///
/// # Arguments
/// * `value` - The value to write.
/// * `sink` - Destination for the bytes.
pub fn encode<S>(value: &Value, sink: &mut S) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    match value {
        Value::Nil => write_head(sink, Marker::Null, &[]),
        Value::Bool(true) => write_head(sink, Marker::True, &[]),
        Value::Bool(false) => write_head(sink, Marker::False, &[]),
        Value::Int(n) => write_int(sink, *n),
        Value::Float(x) => write_head(sink, Marker::F64, &x.to_be_bytes()),
        Value::Float32(x) => write_head(sink, Marker::F32, &x.to_be_bytes()),
        Value::Str(string) => {
            write_str_len(sink, string.len())?;
            sink.write_bytes(string.as_bytes())?;
            Ok(())
        }
        Value::Bin(blob) => {
            write_bin_len(sink, blob.len())?;
            sink.write_bytes(blob.as_slice())?;
            Ok(())
        }
        Value::Array(items) => {
            write_array_len(sink, items.len())?;
            for item in items {
                encode(item, sink)?;
            }
            Ok(())
        }
        Value::Map(entries) => {
            write_map_len(sink, entries.len())?;
            for (key, value) in entries {
                encode(key, sink)?;
                encode(value, sink)?;
            }
            Ok(())
        }
    }
}

/// Encode a [`Value`] into a new vector.
pub fn encode_to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode(value, &mut buf)?;
    Ok(buf)
}

/// Encode a [`Value`] into a new [`Bytes`] buffer.
pub fn encode_to_bytes(value: &Value) -> Result<Bytes, EncodeError> {
    let mut writer = BytesMut::new().writer();
    encode(value, &mut writer)?;
    Ok(writer.into_inner().freeze())
}

/// Write a marker and its fixed size payload with a single write to the sink.
fn write_head<S>(sink: &mut S, marker: Marker, payload: &[u8]) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    debug_assert!(payload.len() < MAX_HEAD_LEN);
    let mut head = [0u8; MAX_HEAD_LEN];
    head[0] = marker.to_u8();
    head[1..=payload.len()].copy_from_slice(payload);
    sink.write_bytes(&head[..=payload.len()])?;
    Ok(())
}

// The order of the checks matters as each successive range contains the ones before it.
fn write_int<S>(sink: &mut S, n: i64) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    if (0..128).contains(&n) {
        write_head(sink, Marker::FixPos(n as u8), &[])
    } else if (-32..0).contains(&n) {
        write_head(sink, Marker::FixNeg(n as i8), &[])
    } else if let Ok(m) = i8::try_from(n) {
        write_head(sink, Marker::I8, &m.to_be_bytes())
    } else if let Ok(m) = i16::try_from(n) {
        write_head(sink, Marker::I16, &m.to_be_bytes())
    } else if let Ok(m) = i32::try_from(n) {
        write_head(sink, Marker::I32, &m.to_be_bytes())
    } else {
        write_head(sink, Marker::I64, &n.to_be_bytes())
    }
}

fn checked_len(kind: ValueKind, len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::TooLarge { kind, len })
}

fn write_str_len<S>(sink: &mut S, len: usize) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    let n = checked_len(ValueKind::Str, len)?;
    if n < 32 {
        write_head(sink, Marker::FixStr(n as u8), &[])
    } else if let Ok(m) = u8::try_from(n) {
        write_head(sink, Marker::Str8, &[m])
    } else if let Ok(m) = u16::try_from(n) {
        write_head(sink, Marker::Str16, &m.to_be_bytes())
    } else {
        write_head(sink, Marker::Str32, &n.to_be_bytes())
    }
}

fn write_bin_len<S>(sink: &mut S, len: usize) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    let n = checked_len(ValueKind::Bin, len)?;
    if let Ok(m) = u8::try_from(n) {
        write_head(sink, Marker::Bin8, &[m])
    } else if let Ok(m) = u16::try_from(n) {
        write_head(sink, Marker::Bin16, &m.to_be_bytes())
    } else {
        write_head(sink, Marker::Bin32, &n.to_be_bytes())
    }
}

fn write_array_len<S>(sink: &mut S, len: usize) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    let n = checked_len(ValueKind::Array, len)?;
    trace!(len = n, "Writing MessagePack array header.");
    if n < 16 {
        write_head(sink, Marker::FixArray(n as u8), &[])
    } else if let Ok(m) = u16::try_from(n) {
        write_head(sink, Marker::Array16, &m.to_be_bytes())
    } else {
        write_head(sink, Marker::Array32, &n.to_be_bytes())
    }
}

fn write_map_len<S>(sink: &mut S, len: usize) -> Result<(), EncodeError>
where
    S: ByteSink + ?Sized,
{
    let n = checked_len(ValueKind::Map, len)?;
    trace!(len = n, "Writing MessagePack map header.");
    if n < 16 {
        write_head(sink, Marker::FixMap(n as u8), &[])
    } else if let Ok(m) = u16::try_from(n) {
        write_head(sink, Marker::Map16, &m.to_be_bytes())
    } else {
        write_head(sink, Marker::Map32, &n.to_be_bytes())
    }
}
