//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use crypto::prelude::TEncodings;

use crate::share_join::IntersectionResult;
use crate::share_join::ProtocolError;
use crate::shared::TFeatures;

pub trait PartyAShareJoinProtocol {
    fn encode_keys(&self) -> Result<TEncodings, ProtocolError>;
    fn split_features(&self) -> Result<(), ProtocolError>;

    /// Moves the exported half out, it belongs to the peer from here on
    fn take_exported_shares(&self) -> Result<TFeatures, ProtocolError>;
    fn get_local_shares(&self) -> Result<TFeatures, ProtocolError>;
    fn set_peer_shares(&self, shares: TFeatures) -> Result<(), ProtocolError>;

    fn reconcile(&self, result: IntersectionResult) -> Result<(), ProtocolError>;
    fn get_aligned_shares(&self) -> Result<TFeatures, ProtocolError>;
    fn print_aligned_shares(&self, limit: usize);
    fn save_aligned_shares(&self, path: &str) -> Result<(), ProtocolError>;
}
