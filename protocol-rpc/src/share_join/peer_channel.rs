//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::time::Duration;

use common::timer;
use protocol::shared::TFeatures;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

use crate::connect::create_client::call_with_retry;
use crate::connect::create_client::CallPolicy;
use crate::connect::create_server;
use crate::connect::shutdown::Shutdown;
use crate::error::RpcError;
use crate::proto::framing::FrameCodec;
use crate::proto::recv_message;
use crate::proto::send_message;
use crate::proto::RpcRequest;
use crate::proto::RpcResponse;
use crate::proto::PARAM_1;
use crate::proto::PEER_EXCHANGE_METHOD;

/// Single-use rendezvous with the peer custodian
///
/// Binding reserves the endpoint; `exchange` consumes the channel, so the
/// listening socket is released on every exit path.
pub struct PeerShareChannel {
    listener: TcpListener,
    max_frame_len: usize,
}

impl PeerShareChannel {
    pub async fn bind(addr: &str, max_frame_len: usize) -> Result<PeerShareChannel, RpcError> {
        Ok(PeerShareChannel {
            listener: create_server::bind(addr).await?,
            max_frame_len,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    /// Waits for the peer, reads its exported shares and answers with ours
    ///
    /// `timeout` bounds the whole exchange, accept included. `shutdown`
    /// cancels it at any point, a connected but silent peer as well.
    pub async fn exchange(
        self,
        own_exported: TFeatures,
        timeout: Duration,
        shutdown: &Shutdown,
    ) -> Result<TFeatures, RpcError> {
        let t = timer::Timer::new_silent("peer exchange");
        let started = std::time::Instant::now();
        let (stream, peer) = create_server::accept_one(self.listener, timeout, shutdown).await?;
        let remaining = timeout.saturating_sub(started.elapsed());

        let max_frame_len = self.max_frame_len;
        let serve = async move {
            let mut framed = Framed::new(stream, FrameCodec::new(max_frame_len));
            let mut request: RpcRequest = recv_message(&mut framed).await?;
            if request.method != PEER_EXCHANGE_METHOD {
                warn!("Peer {} called unexpected method {:?}", peer, request.method);
                send_message(
                    &mut framed,
                    &RpcResponse::err(&format!("unknown method {:?}", request.method)),
                )
                .await?;
                return Err(RpcError::UnexpectedMethod(request.method));
            }
            let peer_shares: TFeatures = request.take_param(PARAM_1)?;
            send_message(&mut framed, &RpcResponse::ok(&own_exported)?).await?;
            Ok(peer_shares)
        };

        let peer_shares = shutdown
            .guard(async {
                match tokio::time::timeout(remaining, serve).await {
                    Ok(r) => r,
                    Err(_) => Err(RpcError::Timeout {
                        what: format!("share exchange with {}", peer),
                        after: timeout,
                    }),
                }
            })
            .await?;
        t.qps("peer share rows", peer_shares.len());
        Ok(peer_shares)
    }
}

/// Peer side of the exchange: connects to the listening party, sends our
/// exported shares and returns theirs
pub async fn exchange_with_listener(
    addr: &str,
    own_exported: &TFeatures,
    policy: &CallPolicy,
) -> Result<TFeatures, RpcError> {
    let request = RpcRequest::new(PEER_EXCHANGE_METHOD).with_param(PARAM_1, own_exported)?;
    call_with_retry(addr, &request, policy).await?.into_result()
}
