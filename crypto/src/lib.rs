//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![crate_name = "crypto"]

pub mod bloom;
pub mod hashing;
pub mod prelude;
pub mod random;
