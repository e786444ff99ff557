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

use tracing::debug;

use super::calculate_parameters;
use super::BloomFilter;
use crate::error::Error;
use crate::hash::HashFunction;

/// Smallest requested bit length that leaves a usable byte.
pub const MIN_NUM_BITS: u64 = 8;
/// Largest supported bit length; the bit array then spans `i32::MAX` bytes.
pub const MAX_NUM_BITS: u64 = i32::MAX as u64 * 8;
/// Every element is hashed at least once.
pub const MIN_NUM_ROUNDS: u16 = 1;
/// Largest supported number of hash rounds per element.
pub const MAX_NUM_ROUNDS: u16 = i16::MAX as u16;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify target items and false positive rate
/// - [`with_size()`](Self::with_size): Specify requested bit count and hash rounds
///
/// Nothing is allocated until [`build()`](Self::build) has validated the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    num_rounds: u16,
}

impl BloomFilterBuilder {
    /// Creates a builder sized by [`calculate_parameters`].
    ///
    /// # Errors
    ///
    /// Returns an error if `max_items` is 0 or `fpp` is not strictly between 0 and 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilterBuilder;
    /// let builder = BloomFilterBuilder::with_accuracy(1000, 0.01).unwrap();
    /// assert_eq!(builder.num_bits(), 9586);
    /// assert_eq!(builder.num_rounds(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Result<Self, Error> {
        let (num_bits, num_rounds) = calculate_parameters(max_items, fpp)?;
        Ok(Self::with_size(num_bits, num_rounds))
    }

    /// Creates a builder with manual size specification.
    ///
    /// The storage is byte-based and the bit length is rounded *down* to a
    /// multiple of 8, so a filter built from `with_size(10, k)` has 8 usable bits.
    /// The arguments are checked by [`build()`](Self::build).
    pub fn with_size(num_bits: u64, num_rounds: u16) -> Self {
        BloomFilterBuilder {
            num_bits,
            num_rounds,
        }
    }

    /// Returns the requested bit length.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the number of hash rounds per element.
    pub fn num_rounds(&self) -> u16 {
        self.num_rounds
    }

    /// Returns the bit length a built filter will actually address.
    pub fn capacity(&self) -> u64 {
        self.num_bits / 8 * 8
    }

    /// Builds the Bloom filter around `hasher`.
    ///
    /// The hasher is not called here. An empty digest surfaces from the first
    /// [`add`](BloomFilter::add) or query that produces one.
    ///
    /// # Errors
    ///
    /// Returns an error if any of:
    /// - the requested bit length is below [`MIN_NUM_BITS`] or above [`MAX_NUM_BITS`]
    /// - the round count is below [`MIN_NUM_ROUNDS`] or above [`MAX_NUM_ROUNDS`]
    ///
    /// # Examples
    ///
    /// ```
    /// # use chained_bloom::bloom::BloomFilterBuilder;
    /// # use chained_bloom::hash::Sha256Hasher;
    /// let filter = BloomFilterBuilder::with_size(1001, 3)
    ///     .build(Sha256Hasher::new())
    ///     .unwrap();
    /// assert_eq!(filter.capacity(), 1000);
    ///
    /// assert!(BloomFilterBuilder::with_size(7, 3).build(Sha256Hasher::new()).is_err());
    /// ```
    pub fn build<H: HashFunction>(self, hasher: H) -> Result<BloomFilter<H>, Error> {
        if self.num_bits < MIN_NUM_BITS {
            return Err(Error::invalid_argument(format!(
                "num_bits must be at least {MIN_NUM_BITS} to leave a usable byte"
            ))
            .with_context("num_bits", self.num_bits));
        }
        if self.num_bits > MAX_NUM_BITS {
            return Err(
                Error::invalid_argument(format!("num_bits must not exceed {MAX_NUM_BITS}"))
                    .with_context("num_bits", self.num_bits),
            );
        }
        if self.num_rounds < MIN_NUM_ROUNDS {
            return Err(Error::invalid_argument(format!(
                "num_rounds must be at least {MIN_NUM_ROUNDS}"
            ))
            .with_context("num_rounds", self.num_rounds));
        }
        if self.num_rounds > MAX_NUM_ROUNDS {
            return Err(Error::invalid_argument(format!(
                "num_rounds must not exceed {MAX_NUM_ROUNDS}"
            ))
            .with_context("num_rounds", self.num_rounds));
        }
        let capacity_bits = self.capacity();
        let bit_array = vec![0u8; (capacity_bits / 8) as usize];

        debug!(
            requested_bits = self.num_bits,
            capacity_bits,
            num_rounds = self.num_rounds,
            "built bloom filter"
        );

        Ok(BloomFilter {
            hasher,
            num_rounds: self.num_rounds,
            capacity_bits,
            num_bits_set: 0,
            bit_array,
        })
    }
}
