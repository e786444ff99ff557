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

use std::f64::consts::LN_2;

use tracing::debug;

use crate::error::Error;

/// Calculates the optimal bit length and round count for a filter.
///
/// Formulas, with `n = input_size` and `p = false_positive_ratio`:
///
/// ```text
/// m = -n * ln(p) / ln(2)^2
/// k = (m / n) * ln(2)
/// ```
///
/// Both values are rounded up. `k` is computed from the real-valued `m`, before
/// `m` itself is rounded, so it is the ceiling of the closed-form optimum
/// `-log2(p)`. The result is at least one bit and at least one round.
///
/// Returns `(bit_length, rounds)`. The bit length is advisory: a filter built
/// with it keeps only the whole bytes it covers.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
/// if `input_size` is 0, if `false_positive_ratio` is not strictly between 0 and 1,
/// or if the bit length does not fit in a `u64`.
///
/// # Examples
///
/// ```
/// # use chained_bloom::bloom::calculate_parameters;
/// let (bits, rounds) = calculate_parameters(1000, 0.01).unwrap();
/// assert_eq!(bits, 9586);
/// assert_eq!(rounds, 7);
///
/// assert!(calculate_parameters(0, 0.01).is_err());
/// assert!(calculate_parameters(1000, 1.0).is_err());
/// ```
pub fn calculate_parameters(input_size: u64, false_positive_ratio: f64) -> Result<(u64, u16), Error> {
    if input_size == 0 {
        return Err(Error::invalid_argument("input_size must be greater than 0")
            .with_context("input_size", input_size));
    }
    // Also rejects NaN.
    if !(false_positive_ratio > 0.0 && false_positive_ratio < 1.0) {
        return Err(Error::invalid_argument(
            "false_positive_ratio must be strictly between 0 and 1",
        )
        .with_context("false_positive_ratio", false_positive_ratio));
    }

    let n = input_size as f64;
    let bit_length = -n * false_positive_ratio.ln() / (LN_2 * LN_2);
    let rounds = bit_length / n * LN_2;

    // u64::MAX as f64 rounds up to 2^64, so `<` keeps the cast exact.
    let num_bits = bit_length.ceil();
    if !(num_bits < u64::MAX as f64) {
        return Err(Error::invalid_argument("bit length does not fit in a u64")
            .with_context("input_size", input_size)
            .with_context("false_positive_ratio", false_positive_ratio));
    }
    let num_bits = (num_bits as u64).max(1);
    // -log2(p) stays below 1075 for any positive f64, well inside u16.
    let num_rounds = (rounds.ceil() as u16).max(1);

    debug!(
        input_size,
        false_positive_ratio,
        num_bits,
        num_rounds,
        "calculated bloom filter parameters"
    );
    Ok((num_bits, num_rounds))
}

/// Estimates the false positive probability of a configuration.
///
/// Formula: `(1 - e^(-k * n / m))^k`
/// where m = num_bits, k = num_rounds, n = num_items.
///
/// Returns 1.0 when `num_bits` is 0, since such a filter cannot exclude anything.
///
/// # Examples
///
/// ```
/// # use chained_bloom::bloom::false_positive_probability;
/// let fpp = false_positive_probability(9586, 7, 1000);
/// assert!((fpp - 0.01).abs() < 0.001);
/// ```
pub fn false_positive_probability(num_bits: u64, num_rounds: u16, num_items: u64) -> f64 {
    if num_bits == 0 {
        return 1.0;
    }
    let m = num_bits as f64;
    let k = f64::from(num_rounds);
    let n = num_items as f64;
    (1.0 - (-k * n / m).exp()).powf(k)
}
