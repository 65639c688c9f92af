//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crypto::bloom::BloomParameters;
use protocol::fileio::SamplingParams;

use crate::connect::create_client::CallPolicy;
use crate::proto::framing::DEFAULT_MAX_FRAME_LEN;

pub const DEFAULT_PEER_LISTEN: &str = "0.0.0.0:8001";
pub const DEFAULT_MATCHING_SERVICE: &str = "127.0.0.1:8080";
pub const DEFAULT_HELD_OUT_FRACTION: f64 = 0.2;

/// Everything one Party A run needs besides its input
#[derive(Debug, Clone, PartialEq)]
pub struct ShareJoinConfig {
    pub peer_listen: String,
    pub matching_service: String,
    pub bloom: BloomParameters,
    pub sampling: SamplingParams,
    /// Bounds the whole peer exchange, accept included
    pub peer_timeout: Duration,
    pub call: CallPolicy,
    /// Largest frame accepted from the peer
    pub max_frame_len: usize,
}

impl Default for ShareJoinConfig {
    fn default() -> Self {
        ShareJoinConfig {
            peer_listen: String::from(DEFAULT_PEER_LISTEN),
            matching_service: String::from(DEFAULT_MATCHING_SERVICE),
            bloom: BloomParameters::default(),
            sampling: SamplingParams {
                held_out_fraction: DEFAULT_HELD_OUT_FRACTION,
                ..SamplingParams::default()
            },
            peer_timeout: Duration::from_secs(300),
            call: CallPolicy::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ShareJoinConfig::default();
        assert!(c.peer_listen.ends_with(":8001"));
        assert_eq!(c.matching_service, "127.0.0.1:8080");
        assert_eq!(c.bloom.expected_elements, 32);
        assert_eq!(c.bloom.min_hashes, 2);
        assert_eq!(c.sampling.held_out_fraction, 0.2);
        assert_eq!(c.call.max_frame_len, c.max_frame_len);
    }
}
