//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Length-prefixed framing: a 4-byte big-endian payload length followed by
//! the payload. The decoder keeps accumulating until the declared length is
//! buffered, a single socket read is never assumed to hold a whole frame.

use std::convert::TryInto;

use bytes::Buf;
use bytes::BufMut;
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::error::RpcError;

pub const HEADER_LEN: usize = 4;
pub const DEFAULT_MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl FrameCodec {
    pub fn new(max_frame_len: usize) -> FrameCodec {
        FrameCodec {
            max_frame_len: max_frame_len.min(u32::MAX as usize),
        }
    }

    fn declared_len(src: &[u8]) -> Option<usize> {
        src.get(..HEADER_LEN)
            .and_then(|h| h.try_into().ok())
            .map(|h: [u8; HEADER_LEN]| u32::from_be_bytes(h) as usize)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = RpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, RpcError> {
        let declared = match Self::declared_len(src) {
            Some(x) => x,
            None => return Ok(None),
        };
        if declared > self.max_frame_len {
            return Err(RpcError::FrameTooLarge {
                declared,
                limit: self.max_frame_len,
            });
        }
        let frame_len = HEADER_LEN + declared;
        if src.len() < frame_len {
            trace!(
                "partial frame: {} of {} payload bytes buffered",
                src.len() - HEADER_LEN,
                declared
            );
            src.reserve(frame_len - src.len());
            return Ok(None);
        }
        src.advance(HEADER_LEN);
        Ok(Some(src.split_to(declared)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, RpcError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        match Self::declared_len(src) {
            Some(declared) => Err(RpcError::Framing {
                declared,
                received: src.len() - HEADER_LEN,
            }),
            None => Err(RpcError::FramingHeader {
                received: src.len(),
            }),
        }
    }
}

impl Encoder<Vec<u8>> for FrameCodec {
    type Error = RpcError;

    fn encode(&mut self, payload: Vec<u8>, dst: &mut BytesMut) -> Result<(), RpcError> {
        if payload.len() > self.max_frame_len {
            return Err(RpcError::FrameTooLarge {
                declared: payload.len(),
                limit: self.max_frame_len,
            });
        }
        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
