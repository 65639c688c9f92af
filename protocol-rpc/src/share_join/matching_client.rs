//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use common::timer;
use crypto::prelude::TEncodings;
use protocol::share_join::IntersectionResult;
use protocol::shared::TFeatures;

use crate::connect::create_client::call_with_retry;
use crate::connect::create_client::CallPolicy;
use crate::error::RpcError;
use crate::proto::RpcRequest;
use crate::proto::COMPUTE_INTERSECTION_FOR_A;
use crate::proto::PARAM_1;
use crate::proto::PARAM_2;

/// The external, non-colluding party computing the intersection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchingService: Send + Sync {
    async fn compute_intersection_for_a(
        &self,
        encodings: TEncodings,
        local_shares: TFeatures,
    ) -> Result<IntersectionResult, RpcError>;
}

pub struct RpcMatchingClient {
    addr: String,
    policy: CallPolicy,
}

impl RpcMatchingClient {
    pub fn new(addr: &str, policy: CallPolicy) -> RpcMatchingClient {
        RpcMatchingClient {
            addr: String::from(addr),
            policy,
        }
    }
}

#[async_trait]
impl MatchingService for RpcMatchingClient {
    async fn compute_intersection_for_a(
        &self,
        encodings: TEncodings,
        local_shares: TFeatures,
    ) -> Result<IntersectionResult, RpcError> {
        let t = timer::Timer::new_silent("matching service");
        let request = RpcRequest::new(COMPUTE_INTERSECTION_FOR_A)
            .with_param(PARAM_1, &encodings)?
            .with_param(PARAM_2, &local_shares)?;
        let result: IntersectionResult = call_with_retry(&self.addr, &request, &self.policy)
            .await?
            .into_result()?;
        info!(
            "Matching service returned {} intersected rows",
            result.order.len()
        );
        t.qps("intersection", result.order.len());
        Ok(result)
    }
}
