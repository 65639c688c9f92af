//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

pub use crate::bloom::{BloomFilter, BloomParameters, ParameterError};
pub use crate::hashing::{digest_identifier, TDigest, DIGEST_LEN};
pub use crate::random::CsRng;

/// Encoded identifiers in record order
pub type TEncodings = Vec<BloomFilter>;
