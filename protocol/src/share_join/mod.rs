//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Party A side of the three-party feature join.
//!
//! Party A encodes its identifiers into bloom filters, splits its features
//! into additive shares, swaps the exported half with Party B, asks the
//! matching service for the intersection order and finally aligns Party B's
//! shares to that order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::TFeatures;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(
        "intersection order position {position} refers to peer row {index}, \
         but only {len} peer rows were exchanged"
    )]
    ErrorIndexOutOfRange {
        position: usize,
        index: usize,
        len: usize,
    },
    #[error("shape mismatch: {0}")]
    ErrorShape(String),
    #[error("invalid input: {0}")]
    ErrorInput(String),
    #[error("randomness source failure: {0}")]
    ErrorRandomness(String),
    #[error("protocol state: {0}")]
    ErrorState(String),
    #[error("io error: {0}")]
    ErrorIO(String),
}

impl From<common::permutations::OutOfRange> for ProtocolError {
    fn from(e: common::permutations::OutOfRange) -> Self {
        ProtocolError::ErrorIndexOutOfRange {
            position: e.position,
            index: e.index,
            len: e.len,
        }
    }
}

/// Reconciliation data produced by the matching service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Subtracted from the reordered peer rows, aligned with `order`
    pub rand: TFeatures,
    /// Appended to every output row, aligned with `order`
    pub data: TFeatures,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionResult {
    /// Indices into the peer's exported share rows, in output order
    pub order: Vec<usize>,
    pub correction: Correction,
}

/// Both halves of a split feature matrix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shares {
    /// Kept by the owner and sent to the matching service
    pub local: TFeatures,
    /// Handed to the peer custodian
    pub exported: TFeatures,
}

pub mod encoder;
pub mod party_a;
pub mod reconciler;
pub mod splitter;
pub mod traits;
