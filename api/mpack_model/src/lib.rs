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

//! # Generic MessagePack Value Model
//!
//! [`Value`] is a closed, recursive representation of everything that can be written in
//! MessagePack (excluding extension types). It is produced fresh by the decoder and only read by
//! the encoder.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use thiserror::Error;


/// A generic MessagePack value.
///
/// Equality is structural: maps are compared as ordered sequences of pairs (so two maps with
/// the same entries in a different order are not equal) and floating point numbers are compared
/// by their bit patterns. This means that `NaN` is equal to itself, `0.0` and `-0.0` are distinct
/// and a [`Value::Float`] is never equal to a [`Value::Float32`].
#[derive(Clone, Debug)]
pub enum Value {
    /// The absent value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer. The magnitude determines the width used on the wire.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A 32-bit floating point number.
    Float32(f32),
    /// A UTF-8 string.
    Str(String),
    /// An opaque binary blob.
    Bin(Vec<u8>),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An ordered sequence of key/value pairs. Keys are not required to be unique and the order
    /// is never changed.
    Map(Vec<(Value, Value)>),
}

/// The discriminant of a [`Value`], without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Float,
    Float32,
    Str,
    Bin,
    Array,
    Map,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Nil => f.write_str("Nil"),
            ValueKind::Bool => f.write_str("Bool"),
            ValueKind::Int => f.write_str("Int"),
            ValueKind::Float => f.write_str("Float"),
            ValueKind::Float32 => f.write_str("Float32"),
            ValueKind::Str => f.write_str("Str"),
            ValueKind::Bin => f.write_str("Bin"),
            ValueKind::Array => f.write_str("Array"),
            ValueKind::Map => f.write_str("Map"),
        }
    }
}

/// Errors that can occur when converting a native type into a [`Value`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The number cannot be represented by a signed 64-bit integer.
    #[error("{0} cannot be represented as a 64-bit signed integer.")]
    IntegerOutOfRange(u64),
}

impl Value {
    /// Create a string value from anything that can be converted to a [`String`].
    pub fn text<T: Into<String>>(text: T) -> Value {
        Value::Str(text.into())
    }

    /// Create a binary value from anything that can be converted into a vector of bytes.
    pub fn blob<B: Into<Vec<u8>>>(bytes: B) -> Value {
        Value::Bin(bytes.into())
    }

    /// Create an array from anything that can be converted into [`Value`]s.
    pub fn array<I>(items: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Create a map from a sequence of pairs. The order of the pairs is preserved.
    pub fn map<I, K, V>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Float32(_) => ValueKind::Float32,
            Value::Str(_) => ValueKind::Str,
            Value::Bin(_) => ValueKind::Bin,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Either float variant, widened to 64 bits.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Float32(x) => Some(f64::from(*x)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bin(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Find the value of the first entry in a map with the given key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(p), Value::Bool(q)) => p == q,
            (Value::Int(n), Value::Int(m)) => n == m,
            (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
            (Value::Float32(x), Value::Float32(y)) => x.to_bits() == y.to_bits(),
            (Value::Str(s), Value::Str(t)) => s == t,
            (Value::Bin(a), Value::Bin(b)) => a == b,
            (Value::Array(xs), Value::Array(ys)) => xs == ys,
            (Value::Map(xs), Value::Map(ys)) => xs == ys,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Float32(x) => x.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Bin(b) => b.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Map(entries) => entries.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Float32(x) => write!(f, "{:?}f32", x),
            Value::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
            Value::Bin(bytes) => {
                f.write_str("<")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                f.write_str(">")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Value {
    type Error = ValueError;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        i64::try_from(n)
            .map(Value::Int)
            .map_err(|_| ValueError::IntegerOutOfRange(n))
    }
}

impl TryFrom<usize> for Value {
    type Error = ValueError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        // usize is never wider than 64 bits on supported targets.
        Value::try_from(n as u64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float32(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bin(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(maybe: Option<T>) -> Self {
        maybe.map(Into::into).unwrap_or(Value::Nil)
    }
}
