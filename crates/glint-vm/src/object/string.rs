// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Interned, immutable strings.

/// An immutable, interned byte string with a cached FNV-1a hash.
pub struct StringObj {
    pub chars: Box<str>,
    pub hash: u32,
}

impl StringObj {
    #[must_use]
    pub fn new(chars: Box<str>) -> Self {
        let hash = fnv1a_hash(chars.as_bytes());
        Self { chars, hash }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.chars
    }
}

/// FNV-1a over raw bytes (spec section 4.1).
#[must_use]
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}
