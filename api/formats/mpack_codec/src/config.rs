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

/// Default nesting limit for [`ReaderConfig::bounded`].
pub const DEFAULT_MAX_DEPTH: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(n) => n,
    None => panic!("Depth limit must be non-zero."),
};

/// Default length limit (16MiB) for [`ReaderConfig::bounded`].
pub const DEFAULT_MAX_LEN: u32 = 16 * 1024 * 1024;

/// Limits applied when decoding MessagePack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// The maximum nesting depth of arrays and maps. A top level array has a depth of 1.
    pub max_depth: Option<NonZeroUsize>,
    /// The maximum number of bytes in a string or blob and the maximum number of entries in an
    /// array or map.
    pub max_len: Option<u32>,
}

impl ReaderConfig {
    /// No limits. Only suitable for trusted input.
    pub const UNBOUNDED: ReaderConfig = ReaderConfig {
        max_depth: None,
        max_len: None,
    };

    /// Limits of [`DEFAULT_MAX_DEPTH`] and [`DEFAULT_MAX_LEN`].
    pub const BOUNDED: ReaderConfig = ReaderConfig {
        max_depth: Some(DEFAULT_MAX_DEPTH),
        max_len: Some(DEFAULT_MAX_LEN),
    };

    /// Limits suitable for untrusted input.
    pub const fn bounded() -> Self {
        ReaderConfig::BOUNDED
    }

    /// Replace the nesting limit. `None` removes it.
    pub fn with_max_depth(self, max_depth: Option<NonZeroUsize>) -> Self {
        ReaderConfig { max_depth, ..self }
    }

    /// Replace the length limit. `None` removes it.
    pub fn with_max_len(self, max_len: Option<u32>) -> Self {
        ReaderConfig { max_len, ..self }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig::UNBOUNDED
    }
}
