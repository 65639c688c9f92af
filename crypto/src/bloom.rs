//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Bloom filter used to encode identifiers before they leave the party.
//!
//! Hash positions are derived with MurmurHash3 double hashing under fixed
//! seeds, so a filter built from the same tokens under the same
//! [`BloomParameters`] is bit-identical across runs and processes.

use std::io::Cursor;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_EXPECTED_ELEMENTS: usize = 32;
pub const DEFAULT_MIN_HASHES: usize = 2;

/// Upper bound for the hash count search
const MAX_HASHES: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("expected element count must be positive")]
    ZeroElements,
    #[error("false positive rate must be in (0, 1), got {0}")]
    FalsePositiveRate(f64),
}

/// Filter shape, computed once and shared read-only by every filter
/// an encoder builds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloomParameters {
    pub expected_elements: usize,
    pub min_hashes: usize,
    pub false_positive_rate: f64,
    /// Size in bits (m), always a multiple of 8
    pub size_bits: usize,
    /// Number of hash functions (k)
    pub hash_count: usize,
}

impl BloomParameters {
    /// Target false positive rate defaults to `1 / expected_elements`
    pub fn new(expected_elements: usize, min_hashes: usize) -> Result<Self, ParameterError> {
        if expected_elements == 0 {
            return Err(ParameterError::ZeroElements);
        }
        Self::with_false_positive_rate(
            expected_elements,
            min_hashes,
            1.0 / expected_elements as f64,
        )
    }

    /// Picks the (m, k) pair with the smallest m reaching the target rate,
    /// then raises k to `min_hashes` if needed.
    ///
    /// m = -k * n / ln(1 - p^(1/k))
    pub fn with_false_positive_rate(
        expected_elements: usize,
        min_hashes: usize,
        false_positive_rate: f64,
    ) -> Result<Self, ParameterError> {
        if expected_elements == 0 {
            return Err(ParameterError::ZeroElements);
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(ParameterError::FalsePositiveRate(false_positive_rate));
        }

        let n = expected_elements as f64;
        let mut min_m = f64::INFINITY;
        let mut best_k = 1usize;
        for k in 1..MAX_HASHES {
            let kf = k as f64;
            let denominator = (1.0 - false_positive_rate.powf(1.0 / kf)).ln();
            let m = -(kf * n) / denominator;
            if m < min_m {
                min_m = m;
                best_k = k;
            }
        }

        let hash_count = best_k.max(min_hashes).max(1);
        let mut size_bits = min_m.ceil() as usize;
        size_bits += (8 - size_bits % 8) % 8;

        Ok(BloomParameters {
            expected_elements,
            min_hashes,
            false_positive_rate,
            size_bits: size_bits.max(8),
            hash_count,
        })
    }
}

impl Default for BloomParameters {
    fn default() -> Self {
        // constants are valid, the error branch is unreachable
        Self::new(DEFAULT_EXPECTED_ELEMENTS, DEFAULT_MIN_HASHES).unwrap_or(BloomParameters {
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            min_hashes: DEFAULT_MIN_HASHES,
            false_positive_rate: 1.0 / DEFAULT_EXPECTED_ELEMENTS as f64,
            size_bits: 232,
            hash_count: 5,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomFilter {
    #[serde(with = "bitvec_serde")]
    bits: BitVec<u8, Lsb0>,
    hash_count: usize,
}

mod bitvec_serde {
    use bitvec::prelude::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bits: &BitVec<u8, Lsb0>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (bits.as_raw_slice(), bits.len()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BitVec<u8, Lsb0>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (bytes, len): (Vec<u8>, usize) = Deserialize::deserialize(deserializer)?;
        let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
        bits.truncate(len);
        Ok(bits)
    }
}

fn murmur_hash(token: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(token);
    // reading from an in-memory cursor cannot fail
    murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0) as u64
}

/// h(i) = h1 + i * h2 mod m, no positions for an empty filter
fn hash_positions(token: &[u8], k: usize, m: usize) -> impl Iterator<Item = usize> {
    let h1 = murmur_hash(token, 0);
    let h2 = murmur_hash(token, 1);
    let k = if m == 0 { 0 } else { k };
    (0..k).map(move |i| (h1.wrapping_add((i as u64).wrapping_mul(h2)) % m as u64) as usize)
}

impl BloomFilter {
    /// Hand-built parameters are clamped to at least one byte and one hash
    pub fn new(params: &BloomParameters) -> BloomFilter {
        BloomFilter {
            bits: bitvec![u8, Lsb0; 0; params.size_bits.max(8)],
            hash_count: params.hash_count.max(1),
        }
    }

    pub fn insert(&mut self, token: &[u8]) {
        let m = self.bits.len();
        for pos in hash_positions(token, self.hash_count, m) {
            self.bits.set(pos, true);
        }
    }

    /// No false negatives: anything inserted is reported as present
    pub fn contains(&self, token: &[u8]) -> bool {
        !self.bits.is_empty()
            && hash_positions(token, self.hash_count, self.bits.len()).all(|pos| self.bits[pos])
    }

    /// Number of bits set in both filters, `None` if the shapes differ
    pub fn overlap(&self, other: &BloomFilter) -> Option<usize> {
        if self.bits.len() != other.bits.len() || self.hash_count != other.hash_count {
            return None;
        }
        Some(
            self.bits
                .as_raw_slice()
                .iter()
                .zip(other.bits.as_raw_slice().iter())
                .map(|(a, b)| (a & b).count_ones() as usize)
                .sum(),
        )
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    pub fn size_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_reject_invalid() {
        assert_eq!(
            BloomParameters::new(0, 2),
            Err(ParameterError::ZeroElements)
        );
        assert_eq!(
            BloomParameters::with_false_positive_rate(10, 2, 1.5),
            Err(ParameterError::FalsePositiveRate(1.5))
        );
    }

    #[test]
    fn test_parameters_shape() {
        let p = BloomParameters::new(16, 2).unwrap();
        assert_eq!(p.size_bits % 8, 0);
        assert!(p.hash_count >= 2);
        // optimal k for p = 1/16 is log2(16)
        assert_eq!(p.hash_count, 4);

        let p = BloomParameters::new(16, 9).unwrap();
        assert_eq!(p.hash_count, 9);
    }

    #[test]
    fn test_default_matches_constants() {
        let p = BloomParameters::default();
        assert_eq!(p, BloomParameters::new(32, 2).unwrap());
    }

    #[test]
    fn test_no_false_negatives() {
        let p = BloomParameters::new(32, 2).unwrap();
        let mut f = BloomFilter::new(&p);
        for b in 0u8..32 {
            f.insert(&[b]);
        }
        for b in 0u8..32 {
            assert!(f.contains(&[b]));
        }
    }

    #[test]
    fn test_overlap() {
        let p = BloomParameters::new(32, 2).unwrap();
        let mut a = BloomFilter::new(&p);
        let mut b = BloomFilter::new(&p);
        a.insert(b"x");
        b.insert(b"x");
        assert_eq!(a.overlap(&b), Some(a.bits_set()));

        let other = BloomFilter::new(&BloomParameters::new(64, 2).unwrap());
        assert_eq!(a.overlap(&other), None);
    }

    #[test]
    fn test_serde_keeps_bits() {
        let p = BloomParameters::new(16, 2).unwrap();
        let mut f = BloomFilter::new(&p);
        f.insert(b"abc");
        let s = serde_json::to_string(&f).unwrap();
        let g: BloomFilter = serde_json::from_str(&s).unwrap();
        assert_eq!(f, g);
        assert_eq!(g.size_bits(), p.size_bits);
    }

    #[test]
    fn test_hand_built_zero_size_is_clamped() {
        let p = BloomParameters {
            size_bits: 0,
            hash_count: 0,
            ..BloomParameters::default()
        };
        let mut f = BloomFilter::new(&p);
        assert_eq!(f.size_bits(), 8);
        f.insert(b"x");
        assert!(f.contains(b"x"));
    }

    #[test]
    fn test_empty_deserialized_filter_does_not_panic() {
        let mut f: BloomFilter = serde_json::from_str(r#"{"bits":[[],0],"hash_count":3}"#).unwrap();
        assert_eq!(f.size_bits(), 0);
        assert!(!f.contains(b"x"));
        f.insert(b"x");
        assert_eq!(f.bits_set(), 0);
        assert!(!f.contains(b"x"));
    }
}
