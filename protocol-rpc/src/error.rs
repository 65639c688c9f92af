//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::io;
use std::time::Duration;

use protocol::share_join::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("connection error on {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("framing error: frame declared {declared} payload bytes, received {received}")]
    Framing { declared: usize, received: usize },
    #[error("framing error: incomplete length header, received {received} of 4 bytes")]
    FramingHeader { received: usize },
    #[error("framing error: frame of {declared} bytes exceeds the limit of {limit}")]
    FrameTooLarge { declared: usize, limit: usize },
    #[error("payload codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("connection closed before a message arrived")]
    ConnectionClosed,
    #[error("request is missing parameter {0}")]
    MissingParam(String),
    #[error("unexpected method {0:?}")]
    UnexpectedMethod(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },
    #[error("matching service unavailable after {attempts} attempts, last error: {last_error}")]
    ServiceUnavailable { attempts: usize, last_error: String },
    #[error("cancelled by shutdown signal")]
    Cancelled,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl RpcError {
    /// Transport level failures, another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RpcError::Connection { .. }
                | RpcError::Io(_)
                | RpcError::Framing { .. }
                | RpcError::FramingHeader { .. }
                | RpcError::ConnectionClosed
                | RpcError::Timeout { .. }
        )
    }
}
