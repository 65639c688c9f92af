//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

//! Cryptographically strong generator for share masks.
//!
//! Entropy source: the operating system (`getrandom` via `OsRng`) seeds a
//! ChaCha12 based `StdRng`. A fresh instance is seeded on every `new`.

use rand::rngs::OsRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_core::CryptoRng;
use rand_core::Error;
use rand_core::RngCore;

pub struct CsRng {
    rng: StdRng,
}

impl CsRng {
    pub fn new() -> Result<CsRng, Error> {
        Ok(CsRng {
            rng: StdRng::from_rng(OsRng)?,
        })
    }
}

impl CryptoRng for CsRng {}

impl RngCore for CsRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.rng.try_fill_bytes(dest)
    }
}
