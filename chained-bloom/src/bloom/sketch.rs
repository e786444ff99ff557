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

use std::borrow::Cow;
use std::fmt;

use byteorder::BigEndian;
use byteorder::ByteOrder;

use super::BloomFilterBuilder;
use crate::error::Error;
use crate::hash::HashFunction;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (added elements always report `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Bit positions are derived by chaining the hash function: round `i` hashes
/// the digest of round `i - 1`, starting from the element itself. Each digest
/// is read as a big-endian unsigned integer and reduced modulo the capacity.
///
/// Use [`BloomFilter::new`] or [`super::BloomFilterBuilder`] to construct instances.
#[derive(Clone)]
pub struct BloomFilter<H> {
    /// The injected hash function, chained once per round
    pub(super) hasher: H,
    /// Number of hash rounds per element (k)
    pub(super) num_rounds: u16,
    /// Number of addressable bits (m), always a multiple of 8
    pub(super) capacity_bits: u64,
    /// Count of bits set to 1 (for statistics)
    pub(super) num_bits_set: u64,
    /// Bit array packed 8 bits per byte, most significant bit first
    pub(super) bit_array: Vec<u8>,
}

impl<H: HashFunction> BloomFilter<H> {
    /// Creates an empty filter of `length` bits that hashes each element `rounds` times.
    ///
    /// Only whole bytes are kept: the capacity is `length / 8 * 8`, which is smaller
    /// than `length` when it is not a multiple of 8. This is the same as
    /// `BloomFilterBuilder::with_size(length, rounds).build(hasher)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` leaves no whole byte or is too large, if `rounds`
    /// is 0, or if `hasher` returns an empty digest.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilter;
    /// # use chained_bloom::hash::Sha256Hasher;
    /// let filter = BloomFilter::new(10, Sha256Hasher::new(), 3).unwrap();
    /// assert_eq!(filter.capacity(), 8);
    ///
    /// assert!(BloomFilter::new(7, Sha256Hasher::new(), 3).is_err());
    /// assert!(BloomFilter::new(64, Sha256Hasher::new(), 0).is_err());
    /// ```
    pub fn new(length: u64, hasher: H, rounds: u16) -> Result<Self, Error> {
        BloomFilterBuilder::with_size(length, rounds).build(hasher)
    }

    /// Adds an element to the filter.
    ///
    /// After adding, `is_member(element)` will always return `true`. Adding the same
    /// element again leaves the filter unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash function produces an empty digest in any round.
    /// The filter is left untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilter;
    /// # use chained_bloom::hash::Sha256Hasher;
    /// let mut filter = BloomFilter::new(1024, Sha256Hasher::new(), 4).unwrap();
    ///
    /// filter.add("apple").unwrap();
    /// filter.add(b"raw bytes").unwrap();
    /// filter.add(&vec![1u8, 2, 3]).unwrap();
    ///
    /// assert!(filter.is_member("apple").unwrap());
    /// ```
    pub fn add<T: AsRef<[u8]> + ?Sized>(&mut self, element: &T) -> Result<(), Error> {
        for bit_index in self.bit_positions(element)? {
            self.set_bit(bit_index);
        }
        Ok(())
    }

    /// Tests whether an element is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Element was **possibly** added (or false positive)
    /// - `false`: Element was **definitely not** added
    ///
    /// Stops at the first round whose bit is clear.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash function produces an empty digest before a
    /// clear bit is found. Rounds after the first clear bit are never hashed, so the
    /// same element may give `Ok(false)` on a sparse filter and this error once the
    /// bits of its earlier rounds have been set by other elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilter;
    /// # use chained_bloom::hash::Sha256Hasher;
    /// let mut filter = BloomFilter::new(1024, Sha256Hasher::new(), 4).unwrap();
    /// filter.add("apple").unwrap();
    ///
    /// assert!(filter.is_member("apple").unwrap()); // true - was added
    /// assert!(!filter.is_member("grape").unwrap()); // false - never added (probably)
    /// ```
    pub fn is_member<T: AsRef<[u8]> + ?Sized>(&self, element: &T) -> Result<bool, Error> {
        for bit_index in self.positions(element.as_ref()) {
            if !self.get_bit(bit_index?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Tests and adds an element in a single operation.
    ///
    /// Returns whether the element was possibly already in the set before adding.
    /// The hash chain is computed once for both steps.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilter;
    /// # use chained_bloom::hash::Sha256Hasher;
    /// let mut filter = BloomFilter::new(1024, Sha256Hasher::new(), 4).unwrap();
    ///
    /// assert!(!filter.is_member_and_add("apple").unwrap()); // First insertion
    /// assert!(filter.is_member_and_add("apple").unwrap()); // Now it's in the set
    /// ```
    pub fn is_member_and_add<T: AsRef<[u8]> + ?Sized>(
        &mut self,
        element: &T,
    ) -> Result<bool, Error> {
        let positions = self.bit_positions(element)?;
        let was_present = positions.iter().all(|&bit_index| self.get_bit(bit_index));
        for bit_index in positions {
            self.set_bit(bit_index);
        }
        Ok(was_present)
    }

    /// Returns the bit index chosen in each round for an element, in round order.
    ///
    /// The sequence depends only on the element, the hash function, the round count
    /// and the capacity. Every index is below [`capacity()`](Self::capacity).
    ///
    /// # Errors
    ///
    /// Returns an error if the hash function produces an empty digest in any round.
    pub fn bit_positions<T: AsRef<[u8]> + ?Sized>(&self, element: &T) -> Result<Vec<u64>, Error> {
        self.positions(element.as_ref()).collect()
    }

    fn positions<'a>(&'a self, element: &'a [u8]) -> Positions<'a, H> {
        Positions {
            hasher: &self.hasher,
            capacity_bits: self.capacity_bits,
            digest: Cow::Borrowed(element),
            round: 0,
            num_rounds: self.num_rounds,
        }
    }
}

impl<H> BloomFilter<H> {
    /// Returns whether the filter is empty (no bits set).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the number of addressable bits (capacity).
    ///
    /// This is the requested length rounded down to a multiple of 8.
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash rounds per element.
    pub fn num_rounds(&self) -> u16 {
        self.num_rounds
    }

    /// Returns the hash function the filter chains through.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the packed bit array.
    ///
    /// Bit `i` lives in byte `i / 8` under the mask `0x80 >> (i % 8)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bit_array
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values near 0.5 indicate the filter is approaching saturation.
    /// Values above 0.5 indicate degraded false positive rates.
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// Uses the approximation `load_factor^k` where k = num_rounds, assuming
    /// uniformly distributed bits.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powi(i32::from(self.num_rounds))
    }

    /// Gets the value of a single bit.
    fn get_bit(&self, bit_index: u64) -> bool {
        let (byte_index, mask) = locate(bit_index);
        (self.bit_array[byte_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let (byte_index, mask) = locate(bit_index);
        if (self.bit_array[byte_index] & mask) == 0 {
            self.bit_array[byte_index] |= mask;
            self.num_bits_set += 1;
        }
    }
}

impl<H> fmt::Debug for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("num_rounds", &self.num_rounds)
            .field("capacity_bits", &self.capacity_bits)
            .field("num_bits_set", &self.num_bits_set)
            .finish_non_exhaustive()
    }
}

/// Walks the hash chain of one element, yielding a bit index per round.
struct Positions<'a, H> {
    hasher: &'a H,
    capacity_bits: u64,
    digest: Cow<'a, [u8]>,
    round: u16,
    num_rounds: u16,
}

impl<H: HashFunction> Iterator for Positions<'_, H> {
    type Item = Result<u64, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.round >= self.num_rounds {
            return None;
        }
        self.round += 1;

        let digest = self.hasher.hash(&self.digest);
        match reduce_big_endian(&digest, self.capacity_bits) {
            Some(bit_index) => {
                self.digest = Cow::Owned(digest);
                Some(Ok(bit_index))
            }
            None => {
                let err = Error::empty_digest(self.round);
                self.round = self.num_rounds;
                Some(Err(err))
            }
        }
    }
}

/// Splits a bit index into its byte index and the MSB-first mask within that byte.
fn locate(bit_index: u64) -> (usize, u8) {
    let byte_index = (bit_index >> 3) as usize; // Equivalent to bit_index / 8
    let mask = 0x80u8 >> (bit_index & 7);
    (byte_index, mask)
}

/// Computes `digest mod modulus`, reading the digest as one big-endian unsigned integer.
///
/// Horner's rule over 64-bit limbs: the remainder stays below `modulus`, so
/// `rem << 64 | limb` always fits in a `u128`. Returns `None` for an empty digest.
fn reduce_big_endian(digest: &[u8], modulus: u64) -> Option<u64> {
    if digest.is_empty() {
        return None;
    }
    debug_assert!(modulus > 0);

    let modulus = u128::from(modulus);
    let (head, limbs) = digest.split_at(digest.len() % 8);
    let mut rem = if head.is_empty() {
        0
    } else {
        u128::from(BigEndian::read_uint(head, head.len())) % modulus
    };
    for limb in limbs.chunks_exact(8) {
        rem = ((rem << 64) | u128::from(BigEndian::read_u64(limb))) % modulus;
    }
    Some(rem as u64)
}
