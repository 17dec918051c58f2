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

use std::num::NonZeroUsize;

use bytes::{Buf, BufMut, BytesMut};
use mpack_model::Value;

use super::{decode, decode_from_slice, decode_from_slice_with_config, decode_with_config};
use crate::config::ReaderConfig;
use crate::writer::encode_to_vec;
use crate::DecodeError;

fn read(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_from_slice(bytes)
}

fn round_trip(value: Value) {
    let encoded = encode_to_vec(&value).expect("Encoding failed.");
    let restored = read(&encoded).expect("Decoding failed.");
    assert_eq!(restored, value);
    let reencoded = encode_to_vec(&restored).expect("Encoding failed.");
    assert_eq!(reencoded, encoded);
}

#[test]
fn read_fixints() {
    assert_eq!(read(&[0x00]), Ok(Value::Int(0)));
    assert_eq!(read(&[0x7f]), Ok(Value::Int(127)));
    assert_eq!(read(&[0xff]), Ok(Value::Int(-1)));
    assert_eq!(read(&[0xe0]), Ok(Value::Int(-32)));
}

#[test]
fn read_simple_values() {
    assert_eq!(read(&[0xc0]), Ok(Value::Nil));
    assert_eq!(read(&[0xc2]), Ok(Value::Bool(false)));
    assert_eq!(read(&[0xc3]), Ok(Value::Bool(true)));
    assert_eq!(
        read(&[0xca, 0x3f, 0xc0, 0x00, 0x00]),
        Ok(Value::Float32(1.5))
    );
    let mut f64_bytes = vec![0xcb];
    f64_bytes.extend_from_slice(&(-2.25f64).to_be_bytes());
    assert_eq!(read(&f64_bytes), Ok(Value::Float(-2.25)));
}

#[test]
fn read_signed_ints() {
    assert_eq!(read(&[0xd0, 0xdf]), Ok(Value::Int(-33)));
    assert_eq!(read(&[0xd1, 0x00, 0x80]), Ok(Value::Int(128)));
    assert_eq!(
        read(&[0xd2, 0x80, 0x00, 0x00, 0x00]),
        Ok(Value::Int(i32::MIN as i64))
    );
    assert_eq!(
        read(&[0xd3, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        Ok(Value::Int(i64::MAX))
    );
}

#[test]
fn read_unsigned_ints() {
    assert_eq!(read(&[0xcc, 0xff]), Ok(Value::Int(255)));
    assert_eq!(read(&[0xcd, 0xff, 0xff]), Ok(Value::Int(65535)));
    assert_eq!(
        read(&[0xce, 0xff, 0xff, 0xff, 0xff]),
        Ok(Value::Int(u32::MAX as i64))
    );
    assert_eq!(
        read(&[0xcf, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        Ok(Value::Int(i64::MAX))
    );
    assert_eq!(
        read(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        Err(DecodeError::IntegerOverflow(u64::MAX))
    );
}

#[test]
fn read_strings() {
    assert_eq!(read(&[0xa0]), Ok(Value::text("")));
    assert_eq!(read(&[0xa2, b'h', b'i']), Ok(Value::text("hi")));
    assert_eq!(read(&[0xd9, 0x02, b'h', b'i']), Ok(Value::text("hi")));
    assert_eq!(read(&[0xda, 0x00, 0x02, b'h', b'i']), Ok(Value::text("hi")));
    assert_eq!(
        read(&[0xdb, 0x00, 0x00, 0x00, 0x02, b'h', b'i']),
        Ok(Value::text("hi"))
    );
}

#[test]
fn read_blobs() {
    assert_eq!(read(&[0xc4, 0x00]), Ok(Value::blob(vec![])));
    assert_eq!(read(&[0xc4, 0x01, 0xaa]), Ok(Value::blob(vec![0xaa])));
    assert_eq!(read(&[0xc5, 0x00, 0x01, 0xaa]), Ok(Value::blob(vec![0xaa])));
    assert_eq!(
        read(&[0xc6, 0x00, 0x00, 0x00, 0x01, 0xaa]),
        Ok(Value::blob(vec![0xaa]))
    );
}

#[test]
fn read_collections() {
    assert_eq!(read(&[0x90]), Ok(Value::Array(vec![])));
    assert_eq!(read(&[0x80]), Ok(Value::Map(vec![])));
    assert_eq!(
        read(&[0xdc, 0x00, 0x02, 0x01, 0x02]),
        Ok(Value::array([1, 2]))
    );
    assert_eq!(
        read(&[0xdd, 0x00, 0x00, 0x00, 0x01, 0xc0]),
        Ok(Value::array([Value::Nil]))
    );
    assert_eq!(
        read(&[0xde, 0x00, 0x01, 0x01, 0x02]),
        Ok(Value::map([(1, 2)]))
    );
    assert_eq!(
        read(&[0xdf, 0x00, 0x00, 0x00, 0x01, 0xc3, 0xc2]),
        Ok(Value::map([(true, false)]))
    );
}

#[test]
fn map_order_and_duplicates_preserved() {
    let value = Value::map([
        (Value::text("b"), Value::Int(1)),
        (Value::text("a"), Value::Int(2)),
        (Value::text("b"), Value::Int(3)),
    ]);
    round_trip(value);
}

#[test]
fn round_trip_nested_scenario() {
    let value = Value::map([
        (Value::text("a"), Value::Int(1)),
        (Value::text("b"), Value::array([2, 3])),
    ]);
    let encoded = encode_to_vec(&value).expect("Encoding failed.");
    let restored = read(&encoded).expect("Decoding failed.");
    let entries = restored.as_map().expect("Expected a map.");
    assert_eq!(entries[0].0, Value::text("a"));
    assert_eq!(entries[1].0, Value::text("b"));
    assert_eq!(restored, value);
}

#[test]
fn round_trip_values() {
    let ints = [
        0,
        1,
        127,
        128,
        255,
        256,
        32767,
        32768,
        65535,
        65536,
        i32::MAX as i64,
        i32::MAX as i64 + 1,
        i64::MAX,
        -1,
        -32,
        -33,
        -128,
        -129,
        -32768,
        -32769,
        i32::MIN as i64,
        i32::MIN as i64 - 1,
        i64::MIN,
    ];
    for n in ints {
        round_trip(Value::Int(n));
    }
    round_trip(Value::Float(f64::NAN));
    round_trip(Value::Float(-0.0));
    round_trip(Value::Float32(f32::INFINITY));
    round_trip(Value::text("h\u{e9}llo \u{1F600}"));
    round_trip(Value::blob((0..=255).collect::<Vec<u8>>()));
    round_trip(Value::array((0..70000).map(|i| i % 300)));
    round_trip(Value::map((0..20).map(|i| (Value::text(i.to_string()), i))));
}

#[test]
fn decode_then_encode_is_identity_on_canonical_input() {
    let canonical: &[u8] = &[
        0x93, 0xd1, 0x01, 0x00, 0x81, 0xa1, b'k', 0xc4, 0x01, 0x00, 0xcb, 0x3f, 0xf0, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ];
    let value = read(canonical).expect("Decoding failed.");
    assert_eq!(encode_to_vec(&value).expect("Encoding failed."), canonical);
}

#[test]
fn unknown_tags() {
    for tag in [0xc1u8, 0xc7, 0xc8, 0xc9, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8] {
        assert_eq!(read(&[tag, 0x00, 0x00]), Err(DecodeError::UnknownTag(tag)));
    }
}

#[test]
fn invalid_utf8_is_rejected() {
    let result = read(&[0xa2, 0xc3, 0x28]);
    assert!(matches!(result, Err(DecodeError::InvalidUtf8(_))));
}

#[test]
fn empty_input() {
    assert_eq!(read(&[]), Err(DecodeError::UnexpectedEof));
}

#[test]
fn truncation_is_detected_everywhere() {
    let value = Value::map([
        (Value::text("name"), Value::text("a".repeat(40))),
        (Value::text("blob"), Value::blob(vec![1; 300])),
        (
            Value::text("items"),
            Value::array([
                Value::Int(-70000),
                Value::Float(0.5),
                Value::Float32(0.25),
                Value::Int(i64::MIN),
            ]),
        ),
        (Value::text("many"), Value::array(vec![Value::Nil; 20])),
    ]);
    let encoded = encode_to_vec(&value).expect("Encoding failed.");
    for end in 0..encoded.len() {
        assert_eq!(
            read(&encoded[..end]),
            Err(DecodeError::UnexpectedEof),
            "Truncated at {}",
            end
        );
    }
    assert_eq!(read(&encoded), Ok(value));
}

#[test]
fn trailing_bytes() {
    assert_eq!(read(&[0x01, 0x02, 0x03]), Err(DecodeError::TrailingBytes(2)));

    let mut input: &[u8] = &[0x01, 0x02];
    assert_eq!(decode(&mut input), Ok(Value::Int(1)));
    assert_eq!(decode(&mut input), Ok(Value::Int(2)));
    assert_eq!(decode(&mut input), Err(DecodeError::UnexpectedEof));
}

#[test]
fn read_from_buf_reader() {
    let mut buf = BytesMut::new();
    buf.put_u8(0x92);
    buf.put_u8(0xa1);
    buf.put_u8(b'x');
    buf.put_u8(0xc3);
    let mut reader = buf.freeze().reader();
    assert_eq!(
        decode(&mut reader),
        Ok(Value::array([Value::text("x"), Value::Bool(true)]))
    );
}

fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut bytes = vec![0x91; depth];
    bytes.push(0xc0);
    bytes
}

#[test]
fn depth_limit() {
    let config = ReaderConfig::UNBOUNDED.with_max_depth(NonZeroUsize::new(3));
    assert!(decode_from_slice_with_config(&nested_arrays(3), &config).is_ok());
    assert_eq!(
        decode_from_slice_with_config(&nested_arrays(4), &config),
        Err(DecodeError::DepthLimitExceeded(3))
    );

    let maps: &[u8] = &[0x81, 0x01, 0x81, 0x02, 0xc0];
    let config = ReaderConfig::UNBOUNDED.with_max_depth(NonZeroUsize::new(1));
    assert_eq!(
        decode_from_slice_with_config(maps, &config),
        Err(DecodeError::DepthLimitExceeded(1))
    );
}

#[test]
fn deep_input_with_bounded_config() {
    let bytes = nested_arrays(100_000);
    assert_eq!(
        decode_from_slice_with_config(&bytes, &ReaderConfig::bounded()),
        Err(DecodeError::DepthLimitExceeded(128))
    );
}

#[test]
fn length_limit_applies_before_payload() {
    let config = ReaderConfig::UNBOUNDED.with_max_len(Some(4));
    let forged: &[u8] = &[0xdb, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(
        decode_from_slice_with_config(forged, &config),
        Err(DecodeError::LengthLimitExceeded {
            len: u32::MAX,
            limit: 4
        })
    );
    let array: &[u8] = &[0x95, 0x01, 0x02, 0x03, 0x04, 0x05];
    assert_eq!(
        decode_from_slice_with_config(array, &config),
        Err(DecodeError::LengthLimitExceeded { len: 5, limit: 4 })
    );
    let blob: &[u8] = &[0xc4, 0x04, 0x01, 0x02, 0x03, 0x04];
    assert_eq!(
        decode_from_slice_with_config(blob, &config),
        Ok(Value::blob(vec![1, 2, 3, 4]))
    );
}

#[test]
fn forged_length_without_limit_is_truncation() {
    let forged: &[u8] = &[0xc6, 0xff, 0xff, 0xff, 0xff, 0x00];
    assert_eq!(read(forged), Err(DecodeError::UnexpectedEof));
    let forged: &[u8] = &[0xdd, 0xff, 0xff, 0xff, 0xff, 0x00];
    assert_eq!(read(forged), Err(DecodeError::UnexpectedEof));
}

#[test]
fn decode_with_default_config_is_unbounded() {
    let bytes = nested_arrays(200);
    let mut input = bytes.as_slice();
    assert!(decode_with_config(&mut input, &ReaderConfig::default()).is_ok());
    assert!(input.is_empty());
}
