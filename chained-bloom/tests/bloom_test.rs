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

mod common;

use chained_bloom::bloom::calculate_parameters;
use chained_bloom::bloom::false_positive_probability;
use chained_bloom::bloom::BloomFilter;
use chained_bloom::bloom::BloomFilterBuilder;
use chained_bloom::error::ErrorKind;
use chained_bloom::hash::HashFunction;
use chained_bloom::hash::Sha1Hasher;
use chained_bloom::hash::Sha256Hasher;
use chained_bloom::hash::Sha512Hasher;
use common::elements;
use googletest::assert_that;
use googletest::prelude::eq;
use googletest::prelude::le;
use googletest::prelude::near;

fn observed_fpp<H: HashFunction>(filter: &BloomFilter<H>, probes: &[Vec<u8>]) -> f64 {
    let hits = probes
        .iter()
        .filter(|probe| filter.is_member(probe.as_slice()).unwrap())
        .count();
    hits as f64 / probes.len() as f64
}

#[test]
fn test_no_false_negatives() {
    let items = elements("member", 300);
    for (length, rounds) in [(8, 1), (10, 3), (64, 2), (1000, 7), (9586, 7)] {
        let mut filter = BloomFilter::new(length, Sha256Hasher::new(), rounds).unwrap();
        for item in &items {
            filter.add(item).unwrap();
        }
        for item in &items {
            assert!(
                filter.is_member(item).unwrap(),
                "length={length}, rounds={rounds}"
            );
        }
    }
}

#[test]
fn test_add_is_idempotent() {
    let mut filter = BloomFilter::new(512, Sha256Hasher::new(), 5).unwrap();
    filter.add("apple").unwrap();
    let bytes = filter.as_bytes().to_vec();
    let bits_used = filter.bits_used();

    filter.add("apple").unwrap();
    assert_eq!(filter.as_bytes(), bytes.as_slice());
    assert_eq!(filter.bits_used(), bits_used);
}

#[test]
fn test_bits_only_accumulate() {
    let items = elements("grow", 200);
    let mut filter = BloomFilter::new(256, Sha256Hasher::new(), 3).unwrap();
    let mut previous = filter.as_bytes().to_vec();

    for (i, item) in items.iter().enumerate() {
        filter.add(item).unwrap();
        let current = filter.as_bytes();
        for (before, after) in previous.iter().zip(current) {
            assert_eq!(before & !after, 0, "a bit was cleared by element {i}");
        }
        let ones: u64 = current.iter().map(|b| u64::from(b.count_ones())).sum();
        assert_eq!(filter.bits_used(), ones);
        previous = current.to_vec();

        for earlier in &items[..=i] {
            assert!(filter.is_member(earlier).unwrap());
        }
    }
}

#[test]
fn test_length_is_truncated_to_whole_bytes() {
    let mut filter = BloomFilter::new(10, Sha256Hasher::new(), 4).unwrap();
    assert_eq!(filter.capacity(), 8);
    assert_eq!(filter.as_bytes().len(), 1);

    for item in elements("narrow", 100) {
        for position in filter.bit_positions(&item).unwrap() {
            assert_that!(position, le(7u64));
        }
        filter.add(&item).unwrap();
    }
    assert_that!(filter.bits_used(), le(8u64));
    assert_eq!(filter.as_bytes().len(), 1);
}

#[test]
fn test_reference_parameters() {
    let (bits, rounds) = calculate_parameters(1000, 0.01).unwrap();
    assert_that!(bits as f64, near(9586.0, 1.0));
    assert_that!(rounds, eq(7u16));
}

#[test]
fn test_boundary_rejection() {
    for (input_size, ratio) in [(0, 0.01), (1000, 0.0), (1000, 1.0)] {
        let err = calculate_parameters(input_size, ratio).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    for (length, rounds) in [(0, 3), (7, 3), (64, 0)] {
        let err = BloomFilter::new(length, Sha256Hasher::new(), rounds).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_empirical_false_positive_rate() {
    for (ratio, tolerance) in [(0.01, 0.005), (0.05, 0.015)] {
        let inserted = elements("inserted", 10_000);
        let probes = elements("absent", 10_000);

        let mut filter = BloomFilterBuilder::with_accuracy(inserted.len() as u64, ratio)
            .unwrap()
            .build(Sha256Hasher::new())
            .unwrap();
        for item in &inserted {
            filter.add(item).unwrap();
        }

        assert_that!(observed_fpp(&filter, &probes), near(ratio, tolerance));
        assert_that!(filter.estimated_fpp(), near(ratio, tolerance));
        assert_that!(
            false_positive_probability(filter.capacity(), filter.num_rounds(), 10_000),
            near(ratio, tolerance)
        );
    }
}

#[test]
fn test_addressing_is_deterministic() {
    let first = BloomFilter::new(4096, Sha256Hasher::new(), 6).unwrap();
    let second = BloomFilter::new(4096, Sha256Hasher::new(), 6).unwrap();

    for item in elements("stable", 50) {
        let positions = first.bit_positions(&item).unwrap();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions, first.bit_positions(&item).unwrap());
        assert_eq!(positions, second.bit_positions(&item).unwrap());
    }
}

#[test]
fn test_rounds_hash_the_previous_digest() {
    let hasher = Sha256Hasher::new();
    let filter = BloomFilter::new(1 << 20, hasher, 3).unwrap();

    let round1 = hasher.hash(b"chain");
    let round2 = hasher.hash(&round1);
    let round3 = hasher.hash(&round2);
    let expected: Vec<u64> = [round1, round2, round3]
        .iter()
        .map(|digest| {
            // 2^20 divides 2^64, so only the low 8 bytes matter.
            let tail: [u8; 8] = digest[digest.len() - 8..].try_into().unwrap();
            u64::from_be_bytes(tail) % (1 << 20)
        })
        .collect();

    assert_eq!(filter.bit_positions("chain").unwrap(), expected);
}

#[test]
fn test_borrowed_closure_as_hasher() {
    let sha512 = Sha512Hasher::new();
    let borrowed = |input: &[u8]| sha512.hash(input);
    let mut filter = BloomFilter::new(2048, &borrowed, 4).unwrap();

    filter.add("pear").unwrap();
    assert!(filter.is_member("pear").unwrap());
    assert_eq!(filter.hasher().hash(b"pear"), sha512.hash(b"pear"));
}

#[test]
fn test_sha1_bit_pattern() {
    let (bits, rounds) = calculate_parameters(1000, 0.01).unwrap();
    let mut filter = BloomFilter::new(bits, Sha1Hasher::new(), rounds).unwrap();
    assert_eq!(
        filter.bit_positions("apple").unwrap(),
        vec![9136, 5133, 4755, 5141, 1253, 184, 320]
    );

    filter.add("apple").unwrap();
    assert_eq!(filter.bits_used(), 7);
    // Bit 184 is byte 23, offset 0.
    assert_eq!(filter.as_bytes()[23], 0b1000_0000);
}
