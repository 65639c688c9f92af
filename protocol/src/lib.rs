//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![crate_name = "protocol"]

#[macro_use]
extern crate log;

pub mod fileio;
pub mod share_join;

pub mod shared {
    use serde::{Deserialize, Serialize};

    /// Feature values, all share arithmetic wraps modulo 2^64
    pub type TDomain = u64;

    /// Row-major feature matrix, one row per record
    pub type TFeatures = Vec<Vec<TDomain>>;

    /// One input line of a data custodian
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Record {
        pub identifier: String,
        pub features: Vec<TDomain>,
    }
}
