// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The hash function a filter chains through to derive bit positions.
//!
//! A [`HashFunction`] maps a byte sequence to a digest of any non-zero
//! length. Plain closures and function items implement it, so most
//! callers never name the trait:
//!
//! ```
//! # use chained_bloom::hash::HashFunction;
//! let reverse = |input: &[u8]| input.iter().rev().copied().collect::<Vec<u8>>();
//! assert_eq!(reverse.hash(&[1, 2, 3]), vec![3, 2, 1]);
//! ```
//!
//! [`DigestHasher`] adapts the RustCrypto digests, with [`Sha1Hasher`],
//! [`Sha256Hasher`] and [`Sha512Hasher`] ready to use.

use std::fmt;
use std::marker::PhantomData;

use sha2::Digest;

/// A pure transform from a byte sequence to a digest.
///
/// Implementations must be deterministic and must never return an empty
/// digest; a filter reports an empty digest as an invalid argument.
pub trait HashFunction {
    /// Hashes `input` into a digest.
    fn hash(&self, input: &[u8]) -> Vec<u8>;
}

impl<F> HashFunction for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn hash(&self, input: &[u8]) -> Vec<u8> {
        self(input)
    }
}

/// Adapts any [`Digest`] implementation into a [`HashFunction`].
///
/// # Examples
///
/// ```
/// # use chained_bloom::hash::HashFunction;
/// # use chained_bloom::hash::Sha256Hasher;
/// let digest = Sha256Hasher::new().hash(b"abc");
/// assert_eq!(digest.len(), 32);
/// assert_eq!(digest[..4], [0xba, 0x78, 0x16, 0xbf]);
/// ```
pub struct DigestHasher<D> {
    _digest: PhantomData<fn() -> D>,
}

/// SHA-1 as a [`HashFunction`] (20-byte digests).
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;

/// SHA-256 as a [`HashFunction`] (32-byte digests).
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

/// SHA-512 as a [`HashFunction`] (64-byte digests).
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

impl<D> DigestHasher<D> {
    /// Creates the adapter.
    pub const fn new() -> Self {
        Self {
            _digest: PhantomData,
        }
    }
}

impl<D: Digest> HashFunction for DigestHasher<D> {
    fn hash(&self, input: &[u8]) -> Vec<u8> {
        D::digest(input).to_vec()
    }
}

impl<D> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for DigestHasher<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for DigestHasher<D> {}

impl<D> fmt::Debug for DigestHasher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestHasher")
            .field("digest", &std::any::type_name::<D>())
            .finish()
    }
}
