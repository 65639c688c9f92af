//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::time::Duration;

use log::info;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use crate::connect::shutdown::Shutdown;
use crate::error::RpcError;

pub async fn bind(addr: &str) -> Result<TcpListener, RpcError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RpcError::Connection {
            addr: String::from(addr),
            source,
        })?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts exactly one connection and closes the listener
///
/// Connections queued behind the first one are refused once the listener is
/// dropped. Fails with `Timeout` if nobody connects in time and with
/// `Cancelled` when `shutdown` fires.
pub async fn accept_one(
    listener: TcpListener,
    accept_timeout: Duration,
    shutdown: &Shutdown,
) -> Result<(TcpStream, SocketAddr), RpcError> {
    let addr = listener.local_addr()?;
    let accepted = shutdown
        .guard(async {
            match tokio::time::timeout(accept_timeout, listener.accept()).await {
                Ok(Ok(x)) => Ok(x),
                Ok(Err(source)) => Err(RpcError::Connection {
                    addr: addr.to_string(),
                    source,
                }),
                Err(_) => Err(RpcError::Timeout {
                    what: format!("accept on {}", addr),
                    after: accept_timeout,
                }),
            }
        })
        .await;
    drop(listener);
    let (stream, peer) = accepted?;
    info!("Accepted connection from {}, listener on {} closed", peer, addr);
    Ok((stream, peer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::shutdown;

    #[tokio::test]
    async fn test_bind_conflict_is_connection_error() {
        let l = bind("127.0.0.1:0").await.unwrap();
        let addr = l.local_addr().unwrap().to_string();
        assert!(matches!(
            bind(&addr).await,
            Err(RpcError::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn test_accept_times_out() {
        let l = bind("127.0.0.1:0").await.unwrap();
        let (_trigger, rx) = shutdown::channel();
        let r = accept_one(l, Duration::from_millis(50), &rx).await;
        assert!(matches!(r, Err(RpcError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_accept_cancelled() {
        let l = bind("127.0.0.1:0").await.unwrap();
        let (trigger, rx) = shutdown::channel();
        trigger.fire();
        let r = accept_one(l, Duration::from_secs(30), &rx).await;
        assert!(matches!(r, Err(RpcError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropped_shutdown_trigger_does_not_cancel() {
        let l = bind("127.0.0.1:0").await.unwrap();
        let addr = l.local_addr().unwrap();
        let (trigger, rx) = shutdown::channel();
        drop(trigger);
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (_, peer) = accept_one(l, Duration::from_secs(5), &rx).await.unwrap();
        let c = client.await.unwrap();
        assert_eq!(peer, c.local_addr().unwrap());
    }
}
