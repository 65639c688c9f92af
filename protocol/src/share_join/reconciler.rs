//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use common::permutations;
use itertools::Itertools;

use super::IntersectionResult;
use super::ProtocolError;
use crate::shared::TDomain;
use crate::shared::TFeatures;

/// Aligns the peer's exported shares to the intersection order
///
/// `out[i] = (peer[order[i]] - rand[i]) ++ data[i]`, subtraction wraps.
/// The whole result is validated before any row is produced, an index
/// outside the peer rows fails the call instead of reading out of bounds.
pub fn reconcile(
    peer_shares: &[Vec<TDomain>],
    result: IntersectionResult,
) -> Result<TFeatures, ProtocolError> {
    let IntersectionResult { order, correction } = result;

    if correction.rand.len() != order.len() || correction.data.len() != order.len() {
        return Err(ProtocolError::ErrorShape(format!(
            "order has {} entries but correction has {} rand rows and {} data rows",
            order.len(),
            correction.rand.len(),
            correction.data.len()
        )));
    }

    let reordered = permutations::gather(&order, peer_shares)?;

    if let Some((i, (row, rand))) = reordered
        .iter()
        .zip_eq(correction.rand.iter())
        .enumerate()
        .find(|(_, (row, rand))| row.len() != rand.len())
    {
        return Err(ProtocolError::ErrorShape(format!(
            "rand row {} has width {}, peer row {} has width {}",
            i,
            rand.len(),
            order[i],
            row.len()
        )));
    }

    let aligned = reordered
        .into_iter()
        .zip_eq(correction.rand.into_iter())
        .zip_eq(correction.data.into_iter())
        .map(|((row, rand), data)| {
            let mut out = row
                .iter()
                .zip_eq(rand.iter())
                .map(|(x, r)| x.wrapping_sub(*r))
                .collect::<Vec<TDomain>>();
            out.extend(data);
            out
        })
        .collect::<TFeatures>();

    debug!("aligned {} of {} peer rows", aligned.len(), peer_shares.len());
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share_join::Correction;

    fn peer() -> TFeatures {
        vec![vec![5, 5], vec![6, 6], vec![7, 7]]
    }

    #[test]
    fn test_reconcile_reorders_and_corrects() {
        let result = IntersectionResult {
            order: vec![2, 0],
            correction: Correction {
                rand: vec![vec![1, 1], vec![0, 0]],
                data: vec![vec![9], vec![8]],
            },
        };
        let out = reconcile(&peer(), result).unwrap();
        assert_eq!(out, vec![vec![6, 6, 9], vec![5, 5, 8]]);
    }

    #[test]
    fn test_reconcile_rejects_out_of_range() {
        let result = IntersectionResult {
            order: vec![0, 3],
            correction: Correction {
                rand: vec![vec![0, 0], vec![0, 0]],
                data: vec![vec![], vec![]],
            },
        };
        match reconcile(&peer(), result) {
            Err(ProtocolError::ErrorIndexOutOfRange {
                position,
                index,
                len,
            }) => {
                assert_eq!(position, 1);
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_empty_intersection() {
        let out = reconcile(&peer(), IntersectionResult::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reconcile_wraps() {
        let result = IntersectionResult {
            order: vec![0],
            correction: Correction {
                rand: vec![vec![6, 0]],
                data: vec![vec![]],
            },
        };
        let out = reconcile(&peer(), result).unwrap();
        assert_eq!(out, vec![vec![u64::MAX, 5]]);
    }

    #[test]
    fn test_reconcile_rejects_shape_mismatch() {
        let short_rand = IntersectionResult {
            order: vec![0, 1],
            correction: Correction {
                rand: vec![vec![0, 0]],
                data: vec![vec![], vec![]],
            },
        };
        assert!(matches!(
            reconcile(&peer(), short_rand),
            Err(ProtocolError::ErrorShape(_))
        ));

        let narrow_rand = IntersectionResult {
            order: vec![1],
            correction: Correction {
                rand: vec![vec![0]],
                data: vec![vec![1]],
            },
        };
        assert!(matches!(
            reconcile(&peer(), narrow_rand),
            Err(ProtocolError::ErrorShape(_))
        ));
    }
}
