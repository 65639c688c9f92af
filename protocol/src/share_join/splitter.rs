//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use crypto::random::CsRng;
use itertools::Itertools;
use rand_core::CryptoRng;
use rand_core::RngCore;

use super::ProtocolError;
use super::Shares;
use crate::shared::TDomain;
use crate::shared::TFeatures;

/// Splits feature rows into `(mask, value - mask)` pairs, wrapping mod 2^64
pub struct ShareSplitter<R: RngCore + CryptoRng> {
    rng: R,
}

impl ShareSplitter<CsRng> {
    /// Splitter over a freshly OS-seeded generator
    pub fn from_entropy() -> Result<ShareSplitter<CsRng>, ProtocolError> {
        let rng = CsRng::new().map_err(|e| ProtocolError::ErrorRandomness(e.to_string()))?;
        Ok(ShareSplitter { rng })
    }
}

impl<R: RngCore + CryptoRng> ShareSplitter<R> {
    pub fn with_rng(rng: R) -> ShareSplitter<R> {
        ShareSplitter { rng }
    }

    /// Returns `(local, exported)` for a single feature vector
    pub fn split_vector(&mut self, values: &[TDomain]) -> (Vec<TDomain>, Vec<TDomain>) {
        values
            .iter()
            .map(|v| {
                let mask = self.rng.next_u64();
                (mask, v.wrapping_sub(mask))
            })
            .unzip()
    }

    pub fn split(&mut self, rows: &[Vec<TDomain>]) -> Shares {
        let mut shares = Shares {
            local: Vec::with_capacity(rows.len()),
            exported: Vec::with_capacity(rows.len()),
        };
        for row in rows.iter() {
            let (local, exported) = self.split_vector(row);
            shares.local.push(local);
            shares.exported.push(exported);
        }
        shares
    }
}

/// Elementwise wrapping sum of two share matrices
pub fn reconstruct(a: &[Vec<TDomain>], b: &[Vec<TDomain>]) -> Result<TFeatures, ProtocolError> {
    if a.len() != b.len() {
        return Err(ProtocolError::ErrorShape(format!(
            "cannot combine {} rows with {} rows",
            a.len(),
            b.len()
        )));
    }
    a.iter()
        .zip(b.iter())
        .enumerate()
        .map(|(i, (x, y))| {
            if x.len() != y.len() {
                return Err(ProtocolError::ErrorShape(format!(
                    "row {} has widths {} and {}",
                    i,
                    x.len(),
                    y.len()
                )));
            }
            Ok(x.iter()
                .zip_eq(y.iter())
                .map(|(p, q)| p.wrapping_add(*q))
                .collect::<Vec<TDomain>>())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn shares_sum_to_original(
            rows in prop::collection::vec(prop::collection::vec(any::<u64>(), 0..16), 0..16),
            seed in any::<u64>(),
        ) {
            let mut splitter = ShareSplitter::with_rng(StdRng::seed_from_u64(seed));
            let shares = splitter.split(&rows);
            prop_assert_eq!(shares.local.len(), rows.len());
            prop_assert_eq!(reconstruct(&shares.local, &shares.exported).unwrap(), rows);
        }

        #[test]
        fn signed_values_reconstruct(values in prop::collection::vec(any::<i64>(), 1..32)) {
            let row = values.iter().map(|v| *v as u64).collect::<Vec<u64>>();
            let mut splitter = ShareSplitter::from_entropy().unwrap();
            let (local, exported) = splitter.split_vector(&row);
            let back = local
                .iter()
                .zip(exported.iter())
                .map(|(a, b)| a.wrapping_add(*b) as i64)
                .collect::<Vec<i64>>();
            prop_assert_eq!(back, values);
        }
    }

    #[test]
    fn test_masks_are_fresh() {
        let mut splitter = ShareSplitter::from_entropy().unwrap();
        let row = vec![7u64; 8];
        let (l1, _) = splitter.split_vector(&row);
        let (l2, _) = splitter.split_vector(&row);
        assert_ne!(l1, l2);
    }

    #[test]
    fn test_reconstruct_rejects_shape_mismatch() {
        assert!(reconstruct(&[vec![1, 2]], &[vec![1]]).is_err());
        assert!(reconstruct(&[vec![1]], &[]).is_err());
    }
}
