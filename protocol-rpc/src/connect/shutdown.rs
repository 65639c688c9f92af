//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::future::Future;

use tokio::sync::watch;

use crate::error::RpcError;

/// Fires the shutdown seen by every [`Shutdown`] clone
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Cloneable shutdown signal, one per long-running wait
///
/// Dropping the trigger without firing never cancels anything.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    /// Returns false when every receiver is already gone
    pub fn fire(&self) -> bool {
        self.tx.send(true).is_ok()
    }
}

impl Shutdown {
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires
    pub async fn fired(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `fut` unless the shutdown fires first, then fails with `Cancelled`
    pub async fn guard<F, T>(&self, fut: F) -> Result<T, RpcError>
    where
        F: Future<Output = Result<T, RpcError>>,
    {
        let mut signal = self.clone();
        tokio::select! {
            biased;
            _ = signal.fired() => Err(RpcError::Cancelled),
            r = fut => r,
        }
    }
}
