//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::cell::Cell;
use std::time::Instant;

use log::info;

/// Naive step timer, outputs go to the `log` backend at info level
///
/// Log output looks like
/// `[split | shares size: 10000] elapsed: 0.00625 sec [qps: 1600435]`
///
/// # Example
///
/// ```
/// use common::timer;
/// let t = timer::Timer::new_silent("load");
/// let values = vec![1, 2, 3];
/// t.qps("read input", values.len());
/// ```
pub struct Timer {
    start: Cell<Instant>,
    label: String,
    silent: bool,
}

impl Timer {
    /// Timer that also reports the total elapsed time when dropped
    pub fn new(label: &str) -> Timer {
        Timer {
            start: Cell::new(Instant::now()),
            label: String::from(label),
            silent: false,
        }
    }

    /// Timer that only reports on explicit `qps` calls
    pub fn new_silent(label: &str) -> Timer {
        let mut t = Timer::new(label);
        t.silent = true;
        t
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.get().elapsed().as_secs_f64()
    }

    /// Formats the elapsed time since the last report and restarts the clock
    pub fn qps_str(&self, step: Option<&str>, size: Option<usize>) -> String {
        let e = self.elapsed_secs();
        let step = step.map(|x| format!(" | {}", x)).unwrap_or_default();
        let fixed_size = size.map(|x| format!(" size: {}", x)).unwrap_or_default();
        let fixed_qps = size
            .filter(|_| e > 0.0)
            .map(|x| format!(" [qps: {:.0}]", (x as f64) / e))
            .unwrap_or_default();
        self.start.set(Instant::now());
        format!(
            "[{}{}{}] elapsed: {:.5} sec{}",
            self.label, step, fixed_size, e, fixed_qps
        )
    }

    pub fn qps(&self, step: &str, size: usize) {
        info!("{}", self.qps_str(Some(step), Some(size)));
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.silent {
            info!("{}", self.qps_str(None, None));
        }
    }
}
