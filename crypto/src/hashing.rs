//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use rayon::prelude::*;
use sha2::{Digest, Sha256};

pub const DIGEST_LEN: usize = 32;

pub type TDigest = [u8; DIGEST_LEN];

/// SHA-256 of the raw identifier bytes
pub fn digest_identifier(identifier: &str) -> TDigest {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hasher.finalize().into()
}

/// Digests every identifier, output keeps the input order
pub fn digest_identifiers(identifiers: &[String]) -> Vec<TDigest> {
    identifiers
        .par_iter()
        .map(|x| digest_identifier(x.as_str()))
        .collect::<Vec<TDigest>>()
}
