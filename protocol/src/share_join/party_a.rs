//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;
use std::sync::RwLock;

use common::files;
use common::timer;
use crypto::bloom::BloomParameters;
use crypto::prelude::TEncodings;
use zeroize::Zeroize;

use super::encoder::IdentifierEncoder;
use super::reconciler;
use super::splitter::ShareSplitter;
use super::traits::PartyAShareJoinProtocol;
use super::IntersectionResult;
use super::ProtocolError;
use crate::fileio;
use crate::fileio::SamplingParams;
use crate::shared::Record;
use crate::shared::TFeatures;

pub struct PartyAShareJoin {
    encoder: IdentifierEncoder,
    keys: Arc<RwLock<Vec<String>>>,
    features: Arc<RwLock<TFeatures>>,
    local_shares: Arc<RwLock<TFeatures>>,
    exported_shares: Arc<RwLock<Option<TFeatures>>>,
    peer_shares: Arc<RwLock<TFeatures>>,
    aligned_shares: Arc<RwLock<TFeatures>>,
}

fn poisoned(what: &str) -> ProtocolError {
    error!("Unable to access {}", what);
    ProtocolError::ErrorState(format!("unable to access {}", what))
}

impl PartyAShareJoin {
    pub fn new(params: BloomParameters) -> PartyAShareJoin {
        PartyAShareJoin {
            encoder: IdentifierEncoder::new(params),
            keys: Arc::new(RwLock::default()),
            features: Arc::new(RwLock::default()),
            local_shares: Arc::new(RwLock::default()),
            exported_shares: Arc::new(RwLock::default()),
            peer_shares: Arc::new(RwLock::default()),
            aligned_shares: Arc::new(RwLock::default()),
        }
    }

    pub fn load_data<T: AsRef<Path>>(
        &self,
        path: T,
        input_with_headers: bool,
        sampling: &SamplingParams,
    ) -> Result<(), ProtocolError> {
        let records = fileio::load_records(path, input_with_headers)?;
        let sampled = fileio::sample_records(records, sampling, &mut rand::thread_rng())?;
        self.set_records(sampled)
    }

    /// Data can only be set once per run
    pub fn set_records(&self, records: Vec<Record>) -> Result<(), ProtocolError> {
        let width = fileio::validate_records(&records)?;
        match (self.keys.write(), self.features.write()) {
            (Ok(mut keys), Ok(mut features)) => {
                if !keys.is_empty() {
                    warn!("Attempted to set records after they were already initialised");
                    return Err(ProtocolError::ErrorState(
                        "records are already set".to_string(),
                    ));
                }
                for r in records.into_iter() {
                    keys.push(r.identifier);
                    features.push(r.features);
                }
                info!(
                    "Data initialised with dimensions: rows: {}, cols: {}",
                    keys.len(),
                    width
                );
                Ok(())
            }
            _ => Err(poisoned("records")),
        }
    }

    pub fn get_size(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn params(&self) -> &BloomParameters {
        self.encoder.params()
    }
}

impl PartyAShareJoinProtocol for PartyAShareJoin {
    fn encode_keys(&self) -> Result<TEncodings, ProtocolError> {
        let keys = self.keys.read().map_err(|_| poisoned("keys"))?;
        let t = timer::Timer::new_silent("encode");
        let encodings = self.encoder.encode_all(&keys);
        t.qps("bloom encodings", encodings.len());
        Ok(encodings)
    }

    fn split_features(&self) -> Result<(), ProtocolError> {
        match (
            self.features.read(),
            self.local_shares.write(),
            self.exported_shares.write(),
        ) {
            (Ok(features), Ok(mut local), Ok(mut exported)) => {
                let t = timer::Timer::new_silent("split");
                let mut splitter = ShareSplitter::from_entropy()?;
                let shares = splitter.split(&features);
                local.zeroize();
                *local = shares.local;
                *exported = Some(shares.exported);
                t.qps("additive shares", local.len());
                Ok(())
            }
            _ => Err(poisoned("shares")),
        }
    }

    fn take_exported_shares(&self) -> Result<TFeatures, ProtocolError> {
        let mut exported = self
            .exported_shares
            .write()
            .map_err(|_| poisoned("exported shares"))?;
        exported.take().ok_or_else(|| {
            ProtocolError::ErrorState(
                "exported shares are not available, split first and take once".to_string(),
            )
        })
    }

    fn get_local_shares(&self) -> Result<TFeatures, ProtocolError> {
        let local = self
            .local_shares
            .read()
            .map_err(|_| poisoned("local shares"))?;
        if local.len() != self.get_size() {
            return Err(ProtocolError::ErrorState(
                "local shares are not available, split first".to_string(),
            ));
        }
        Ok(local.clone())
    }

    fn set_peer_shares(&self, shares: TFeatures) -> Result<(), ProtocolError> {
        let mut peer = self
            .peer_shares
            .write()
            .map_err(|_| poisoned("peer shares"))?;
        info!("Received {} peer share rows", shares.len());
        *peer = shares;
        Ok(())
    }

    fn reconcile(&self, result: IntersectionResult) -> Result<(), ProtocolError> {
        match (self.peer_shares.read(), self.aligned_shares.write()) {
            (Ok(peer), Ok(mut aligned)) => {
                let t = timer::Timer::new_silent("reconcile");
                *aligned = reconciler::reconcile(&peer, result)?;
                t.qps("aligned rows", aligned.len());
                Ok(())
            }
            _ => Err(poisoned("aligned shares")),
        }
    }

    fn get_aligned_shares(&self) -> Result<TFeatures, ProtocolError> {
        self.aligned_shares
            .read()
            .map(|x| x.clone())
            .map_err(|_| poisoned("aligned shares"))
    }

    fn print_aligned_shares(&self, limit: usize) {
        match self.aligned_shares.read() {
            Ok(aligned) => files::write_u64rows_to_stdout(&aligned, limit),
            _ => error!("Unable to read aligned shares"),
        }
    }

    fn save_aligned_shares(&self, path: &str) -> Result<(), ProtocolError> {
        let aligned = self
            .aligned_shares
            .read()
            .map_err(|_| poisoned("aligned shares"))?;
        info!("Writing {} aligned share rows to {}", aligned.len(), path);
        files::write_u64rows_to_csv(&aligned, path).map_err(|e| {
            ProtocolError::ErrorIO(format!("unable to write aligned shares to {}: {}", path, e))
        })
    }
}

impl Drop for PartyAShareJoin {
    fn drop(&mut self) {
        if let Ok(mut local) = self.local_shares.write() {
            local.zeroize();
        }
        if let Ok(mut exported) = self.exported_shares.write() {
            if let Some(x) = exported.as_mut() {
                x.zeroize();
            }
        }
        if let Ok(mut features) = self.features.write() {
            features.zeroize();
        }
    }
}
