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

use std::io::{self, Read, Write};

use crate::DecodeError;

/// The size of the buffer that is allocated ahead of the bytes that have actually been read when
/// reading a payload. Length prefixes are untrusted so they are not used to size allocations.
const PAYLOAD_CHUNK: usize = 8 * 1024;

/// Something that accepts bytes. This is implemented for all [`Write`] implementations so
/// in-memory buffers, files and sockets can all be used directly.
pub trait ByteSink {
    /// Write all of the bytes or fail.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: Write + ?Sized> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

/// Something that yields bytes. This is implemented for all [`Read`] implementations (including
/// `&[u8]` and [`bytes::buf::Reader`]).
pub trait ByteSource {
    /// Fill the buffer completely, failing with [`DecodeError::UnexpectedEof`] if the source is
    /// exhausted first.
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), DecodeError>;

    /// Read exactly `len` bytes into a new vector.
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.read_exact(buf).map_err(Into::into)
    }

    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        let mut payload = Vec::with_capacity(len.min(PAYLOAD_CHUNK));
        let read = (&mut *self).take(len as u64).read_to_end(&mut payload)?;
        if read < len {
            Err(DecodeError::UnexpectedEof)
        } else {
            Ok(payload)
        }
    }
}
