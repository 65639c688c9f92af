//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use log::info;
use log::warn;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::error::RpcError;
use crate::proto::framing::FrameCodec;
use crate::proto::framing::DEFAULT_MAX_FRAME_LEN;
use crate::proto::recv_message;
use crate::proto::send_message;
use crate::proto::RpcRequest;
use crate::proto::RpcResponse;

/// Bounds for one outbound call and its retries
#[derive(Debug, Clone, PartialEq)]
pub struct CallPolicy {
    /// Total attempts, the first one included
    pub attempts: usize,
    /// First backoff, later ones grow along the Fibonacci sequence
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Covers connect, request and response of a single attempt
    pub attempt_timeout: Duration,
    pub max_frame_len: usize,
}

impl Default for CallPolicy {
    fn default() -> Self {
        CallPolicy {
            attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            attempt_timeout: Duration::from_secs(120),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

pub async fn connect(addr: &str) -> Result<TcpStream, RpcError> {
    TcpStream::connect(addr)
        .await
        .map_err(|source| RpcError::Connection {
            addr: String::from(addr),
            source,
        })
}

/// One request, one response, one connection
pub async fn call(
    addr: &str,
    request: &RpcRequest,
    attempt_timeout: Duration,
    max_frame_len: usize,
) -> Result<RpcResponse, RpcError> {
    let exchange = async {
        let stream = connect(addr).await?;
        let mut framed = Framed::new(stream, FrameCodec::new(max_frame_len));
        send_message(&mut framed, request).await?;
        recv_message::<_, RpcResponse>(&mut framed).await
    };
    match tokio::time::timeout(attempt_timeout, exchange).await {
        Ok(r) => r,
        Err(_) => Err(RpcError::Timeout {
            what: format!("call {:?} on {}", request.method, addr),
            after: attempt_timeout,
        }),
    }
}

/// Retries transport failures with backoff; after the last attempt the
/// failure surfaces as `ServiceUnavailable`. Errors reported by the remote
/// side are returned right away.
pub async fn call_with_retry(
    addr: &str,
    request: &RpcRequest,
    policy: &CallPolicy,
) -> Result<RpcResponse, RpcError> {
    let attempts = policy.attempts.max(1);
    let mut delays = retry::delay::Fibonacci::from_millis(policy.initial_backoff.as_millis() as u64)
        .map(|d| d.min(policy.max_backoff));
    let mut last_error = String::new();

    for attempt in 0..attempts {
        if attempt == 0 {
            info!("Connecting to host: {}", addr);
        } else {
            info!("Connecting to host: {} [retry: {}]", addr, attempt);
        }
        match call(addr, request, policy.attempt_timeout, policy.max_frame_len).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() => {
                warn!("Attempt {} of {} failed: {}", attempt + 1, attempts, e);
                last_error = e.to_string();
                if attempt + 1 < attempts {
                    if let Some(d) = delays.next() {
                        tokio::time::sleep(d).await;
                    }
                }
            }
            Err(e) => return Err(e),
        }
    }

    error!("Giving up on {} after {} attempts", addr, attempts);
    Err(RpcError::ServiceUnavailable {
        attempts,
        last_error,
    })
}
