//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use rand::Rng;

/// Index in a gather order that does not address any item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    /// Position inside the order
    pub position: usize,
    /// Offending index
    pub index: usize,
    /// Number of items available
    pub len: usize,
}

/// Returns random swap permutation
///
/// `(1 2 3 4) -> (3 4 1 2)`
/// From https://en.wikipedia.org/wiki/Fisher%E2%80%93Yates_shuffle
pub fn gen_permute_pattern<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut res: Vec<usize> = (0..n).collect::<Vec<usize>>();
    for i in 0..n.saturating_sub(1) {
        let j = rng.gen_range(i..n);
        res.swap(i, j);
    }
    res
}

/// Checks every index of `order` against `len` without touching any item
pub fn check_order(order: &[usize], len: usize) -> Result<(), OutOfRange> {
    match order.iter().position(|&idx| idx >= len) {
        Some(position) => Err(OutOfRange {
            position,
            index: order[position],
            len,
        }),
        None => Ok(()),
    }
}

/// Builds `output[i] = items[order[i]]`; indices may repeat or be skipped
///
/// # Example
///
/// ```
/// use common::permutations;
/// let v = vec!['a', 'b', 'c'];
///
/// let g = permutations::gather(&[2, 0], &v).unwrap();
/// assert_eq!(g, vec!['c', 'a']);
/// assert!(permutations::gather(&[3], &v).is_err());
/// ```
pub fn gather<T: Clone>(order: &[usize], items: &[T]) -> Result<Vec<T>, OutOfRange> {
    check_order(order, items.len())?;
    Ok(order.iter().map(|&idx| items[idx].clone()).collect::<Vec<T>>())
}
