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

//! Bloom filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an element was added, `is_member()` will always return `true`
//! - **Possible false positives**: `is_member()` may return `true` for elements never added
//! - **Fixed size**: The bit array never grows, shrinks, or clears
//! - **Linear space**: Size is proportional to the expected number of distinct elements
//!
//! # Usage
//!
//! ```rust
//! use chained_bloom::bloom::BloomFilter;
//! use chained_bloom::bloom::calculate_parameters;
//! use chained_bloom::hash::Sha256Hasher;
//!
//! // Size a filter for 1000 elements with a 1% false positive rate
//! let (bits, rounds) = calculate_parameters(1000, 0.01)?;
//! let mut filter = BloomFilter::new(bits, Sha256Hasher::new(), rounds)?;
//!
//! // Add elements
//! filter.add("apple")?;
//! filter.add(b"banana")?;
//!
//! // Check membership
//! assert!(filter.is_member("apple")?); // true - definitely added
//! assert!(!filter.is_member("grape")?); // false - never added (probably)
//!
//! // Get statistics
//! println!("Capacity: {} bits", filter.capacity());
//! println!("Bits used: {}", filter.bits_used());
//! println!("Est. FPP: {:.4}%", filter.estimated_fpp() * 100.0);
//! # Ok::<(), chained_bloom::error::Error>(())
//! ```
//!
//! # Hash Functions
//!
//! The filter never hashes on its own terms: the caller injects any
//! [`HashFunction`](crate::hash::HashFunction), including a plain closure.
//!
//! ```rust
//! # use chained_bloom::bloom::BloomFilter;
//! let fold = |input: &[u8]| {
//!     let sum = input.iter().fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
//!     sum.to_be_bytes().to_vec()
//! };
//! let mut filter = BloomFilter::new(256, fold, 3)?;
//! filter.add("apple")?;
//! assert!(filter.is_member("apple")?);
//! # Ok::<(), chained_bloom::error::Error>(())
//! ```
//!
//! # Implementation Details
//!
//! - Round `i` hashes the digest of round `i - 1`, starting from the element itself
//! - Each digest is read as a big-endian unsigned integer, reduced modulo the capacity
//! - Bits are packed into bytes, most significant bit first
//! - The capacity is the requested length rounded *down* to a multiple of 8
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"

mod builder;
mod params;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MAX_NUM_ROUNDS;
pub use self::builder::MIN_NUM_BITS;
pub use self::builder::MIN_NUM_ROUNDS;
pub use self::params::calculate_parameters;
pub use self::params::false_positive_probability;
pub use self::sketch::BloomFilter;
