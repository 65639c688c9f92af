//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Network side of the Party A run: the peer share exchange, the matching
//! service call and the sequence tying them to the local protocol state.

use std::time::Duration;

use common::timer;
use protocol::share_join::party_a::PartyAShareJoin;
use protocol::share_join::traits::PartyAShareJoinProtocol;
use protocol::shared::TFeatures;

use crate::connect::shutdown::Shutdown;
use crate::error::RpcError;

pub mod config;
pub mod matching_client;
pub mod peer_channel;

use matching_client::MatchingService;
use peer_channel::PeerShareChannel;

/// encode -> split -> exchange -> match -> reconcile
///
/// The first failing step aborts the run. `shutdown` cancels both network
/// steps while they wait. Returns the aligned shares, which also stay in
/// `protocol` for saving.
pub async fn run_party_a<M: MatchingService>(
    protocol: &PartyAShareJoin,
    channel: PeerShareChannel,
    matching: &M,
    peer_timeout: Duration,
    shutdown: &Shutdown,
) -> Result<TFeatures, RpcError> {
    let t = timer::Timer::new("party A");

    let encodings = protocol.encode_keys()?;
    protocol.split_features()?;
    t.qps("encode and split", protocol.get_size());

    let exported = protocol.take_exported_shares()?;
    let peer_shares = channel.exchange(exported, peer_timeout, shutdown).await?;
    protocol.set_peer_shares(peer_shares)?;

    let local_shares = protocol.get_local_shares()?;
    let result = shutdown
        .guard(matching.compute_intersection_for_a(encodings, local_shares))
        .await?;

    protocol.reconcile(result)?;
    let aligned = protocol.get_aligned_shares()?;
    t.qps("reconcile", aligned.len());
    Ok(aligned)
}
