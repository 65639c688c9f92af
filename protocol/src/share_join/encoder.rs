//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use crypto::bloom::BloomFilter;
use crypto::bloom::BloomParameters;
use crypto::hashing::digest_identifier;
use crypto::prelude::TEncodings;
use rayon::prelude::*;

/// Turns identifiers into bloom filter encodings
///
/// Every identifier gets its own filter; each byte of the identifier's
/// SHA-256 digest is inserted as a one-byte token. The parameters are fixed
/// at construction, so two encoders built from equal parameters produce
/// bit-identical encodings for the same identifier.
#[derive(Debug, Clone)]
pub struct IdentifierEncoder {
    params: BloomParameters,
}

impl IdentifierEncoder {
    pub fn new(params: BloomParameters) -> IdentifierEncoder {
        IdentifierEncoder { params }
    }

    pub fn params(&self) -> &BloomParameters {
        &self.params
    }

    pub fn encode(&self, identifier: &str) -> BloomFilter {
        let mut filter = BloomFilter::new(&self.params);
        for b in digest_identifier(identifier).iter() {
            filter.insert(&[*b]);
        }
        filter
    }

    /// Output is index-aligned with `identifiers`
    pub fn encode_all(&self, identifiers: &[String]) -> TEncodings {
        identifiers
            .par_iter()
            .map(|x| self.encode(x.as_str()))
            .collect::<TEncodings>()
    }
}

impl Default for IdentifierEncoder {
    fn default() -> Self {
        Self::new(BloomParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = IdentifierEncoder::default();
        let a = encoder.encode("id0");
        let b = encoder.encode("id0");
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), b.as_bytes());

        // separately constructed encoder, same parameters
        let other = IdentifierEncoder::new(BloomParameters::new(32, 2).unwrap());
        assert_eq!(other.encode("id0"), a);
    }

    #[test]
    fn test_distinct_identifiers_do_not_share_state() {
        let encoder = IdentifierEncoder::default();
        let before = encoder.encode("id1");
        let _ = encoder.encode("id2");
        let after = encoder.encode("id1");
        assert_eq!(before, after);
        assert_ne!(encoder.encode("id1"), encoder.encode("id2"));
    }

    #[test]
    fn test_encode_all_keeps_order() {
        let encoder = IdentifierEncoder::default();
        let ids = (0..64).map(|i| format!("id{}", i)).collect::<Vec<_>>();
        let encodings = encoder.encode_all(&ids);
        assert_eq!(encodings.len(), ids.len());
        for (id, e) in ids.iter().zip(encodings.iter()) {
            assert_eq!(&encoder.encode(id), e);
        }
    }

    #[test]
    fn test_every_digest_byte_is_present() {
        let encoder = IdentifierEncoder::default();
        let filter = encoder.encode("someone@example.com");
        for b in digest_identifier("someone@example.com").iter() {
            assert!(filter.contains(&[*b]));
        }
    }

    #[test]
    fn test_parameters_change_encoding_shape() {
        let small = IdentifierEncoder::new(BloomParameters::new(16, 2).unwrap());
        let large = IdentifierEncoder::new(BloomParameters::new(64, 2).unwrap());
        assert_ne!(
            small.encode("id0").size_bits(),
            large.encode("id0").size_bits()
        );
    }

    #[test]
    fn test_encoding_is_pinned() {
        // other processes and the matching service compare these bytes
        let encoder = IdentifierEncoder::default();
        assert_eq!(encoder.params().size_bits, 232);
        assert_eq!(encoder.params().hash_count, 5);

        let e = encoder.encode("id0");
        assert_eq!(
            e.as_bytes(),
            &[
                0x76, 0xe8, 0xde, 0xf9, 0x58, 0xec, 0xce, 0x6c, 0x11, 0xbc, 0x96, 0xd9, 0x36, 0xcd,
                0x10, 0x48, 0x44, 0x36, 0x4d, 0xfa, 0x84, 0xb8, 0x01, 0x51, 0xad, 0xd2, 0x04, 0x1e,
                0xa7,
            ][..]
        );
        assert_eq!(e.bits_set(), 111);
    }
}
