//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Request and response payloads. A request names a method and carries
//! named parameters (`param1`, `param2`, ...); every payload is JSON inside
//! one length-prefixed frame.

pub mod framing;

use futures::SinkExt;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio_util::codec::Framed;

use crate::error::RpcError;
use framing::FrameCodec;

/// The peer share exchange is a single unnamed call
pub const PEER_EXCHANGE_METHOD: &str = "";
pub const COMPUTE_INTERSECTION_FOR_A: &str = "computeIntersectionForA";
pub const PARAM_1: &str = "param1";
pub const PARAM_2: &str = "param2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(method: &str) -> RpcRequest {
        RpcRequest {
            method: String::from(method),
            params: Map::new(),
        }
    }

    pub fn with_param<T: Serialize>(mut self, name: &str, value: &T) -> Result<Self, RpcError> {
        self.params
            .insert(String::from(name), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Removes and decodes a named parameter
    pub fn take_param<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, RpcError> {
        let v = self
            .params
            .remove(name)
            .ok_or_else(|| RpcError::MissingParam(String::from(name)))?;
        Ok(serde_json::from_value(v)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RpcResponse {
    pub fn ok<T: Serialize>(value: &T) -> Result<RpcResponse, RpcError> {
        Ok(RpcResponse {
            result: Some(serde_json::to_value(value)?),
            error: None,
        })
    }

    pub fn err(msg: &str) -> RpcResponse {
        RpcResponse {
            result: None,
            error: Some(String::from(msg)),
        }
    }

    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, RpcError> {
        match (self.error, self.result) {
            (Some(e), _) => Err(RpcError::Remote(e)),
            (None, Some(v)) => Ok(serde_json::from_value(v)?),
            (None, None) => Err(RpcError::Remote(String::from("empty response"))),
        }
    }
}

pub async fn send_message<S, T>(framed: &mut Framed<S, FrameCodec>, msg: &T) -> Result<(), RpcError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(msg)?;
    debug!("sending frame of {} bytes", payload.len());
    framed.send(payload).await
}

pub async fn recv_message<S, T>(framed: &mut Framed<S, FrameCodec>) -> Result<T, RpcError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: DeserializeOwned,
{
    match framed.next().await {
        Some(frame) => {
            let frame = frame?;
            debug!("received frame of {} bytes", frame.len());
            Ok(serde_json::from_slice(&frame)?)
        }
        None => Err(RpcError::ConnectionClosed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let r = RpcRequest::new(PEER_EXCHANGE_METHOD)
            .with_param(PARAM_1, &vec![vec![1u64, 2u64]])
            .unwrap();
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"method":"","params":{"param1":[[1,2]]}}"#
        );
    }

    #[test]
    fn test_take_param() {
        let mut r = RpcRequest::new(COMPUTE_INTERSECTION_FOR_A)
            .with_param(PARAM_1, &vec![3u64])
            .unwrap();
        let v: Vec<u64> = r.take_param(PARAM_1).unwrap();
        assert_eq!(v, vec![3]);
        assert!(matches!(
            r.take_param::<Vec<u64>>(PARAM_1),
            Err(RpcError::MissingParam(_))
        ));
    }

    #[test]
    fn test_response_into_result() {
        let ok = RpcResponse::ok(&vec![1u64]).unwrap();
        assert_eq!(ok.into_result::<Vec<u64>>().unwrap(), vec![1]);

        let err = RpcResponse::err("no such method");
        assert!(matches!(
            err.into_result::<Vec<u64>>(),
            Err(RpcError::Remote(_))
        ));
        assert_eq!(
            serde_json::to_string(&RpcResponse::err("x")).unwrap(),
            r#"{"error":"x"}"#
        );
    }

    #[tokio::test]
    async fn test_message_over_duplex() {
        let (a, b) = tokio::io::duplex(1024);
        let mut fa = Framed::new(a, FrameCodec::default());
        let mut fb = Framed::new(b, FrameCodec::default());
        let req = RpcRequest::new("x").with_param(PARAM_1, &7u64).unwrap();
        send_message(&mut fa, &req).await.unwrap();
        let got: RpcRequest = recv_message(&mut fb).await.unwrap();
        assert_eq!(got, req);

        drop(fa);
        assert!(matches!(
            recv_message::<_, RpcRequest>(&mut fb).await,
            Err(RpcError::ConnectionClosed)
        ));
    }
}
