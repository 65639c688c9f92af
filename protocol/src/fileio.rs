//  Copyright (c) Facebook, Inc. and its affiliates.
//   SPDX-License-Identifier: Apache-2.0

extern crate common;

use std::collections::HashSet;
use std::path::Path;

use common::{files, permutations, timer};
use rand::Rng;

use crate::share_join::ProtocolError;
use crate::shared::Record;

/// Source dataset sampling, applied in field order
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    /// Keep at most this many records from the head of the source
    pub sample_count: Option<usize>,
    /// Fraction of the shuffled records left out of the run
    pub held_out_fraction: f64,
    /// First feature column kept
    pub feature_offset: usize,
    /// Number of feature columns kept from the offset, all when unset
    pub feature_width: Option<usize>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            sample_count: None,
            held_out_fraction: 0.0,
            feature_offset: 0,
            feature_width: None,
        }
    }
}

/// Reads `key,f0,f1,...` lines into records, keeping file order
pub fn load_records<T>(input_path: T, has_headers: bool) -> Result<Vec<Record>, ProtocolError>
where
    T: AsRef<Path>,
{
    let t = timer::Timer::new_silent("load");
    let rows = files::read_csv_as_keyed_nums(input_path.as_ref(), has_headers).map_err(|e| {
        ProtocolError::ErrorIO(format!(
            "unable to read {}: {}",
            input_path.as_ref().display(),
            e
        ))
    })?;
    let records = rows
        .into_iter()
        .map(|r| Record {
            identifier: r.key,
            features: r.ints,
        })
        .collect::<Vec<Record>>();
    validate_records(&records)?;
    t.qps("records read", records.len());
    info!(
        "Read {} records from {}",
        records.len(),
        input_path.as_ref().display()
    );
    Ok(records)
}

/// Checks identifiers are unique and every feature vector has the same
/// width, returns that width
pub fn validate_records(records: &[Record]) -> Result<usize, ProtocolError> {
    let width = records.first().map(|r| r.features.len()).unwrap_or(0);
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        if r.features.len() != width {
            return Err(ProtocolError::ErrorInput(format!(
                "record {} has {} features, expected {}",
                i,
                r.features.len(),
                width
            )));
        }
        if !seen.insert(r.identifier.as_str()) {
            return Err(ProtocolError::ErrorInput(format!(
                "duplicate identifier at record {}",
                i
            )));
        }
    }
    Ok(width)
}

/// Caps, shuffles, drops the held-out fraction and slices feature columns
pub fn sample_records<R: Rng + ?Sized>(
    mut records: Vec<Record>,
    params: &SamplingParams,
    rng: &mut R,
) -> Result<Vec<Record>, ProtocolError> {
    if !(0.0..1.0).contains(&params.held_out_fraction) {
        return Err(ProtocolError::ErrorInput(format!(
            "held out fraction must be in [0, 1), got {}",
            params.held_out_fraction
        )));
    }
    if let Some(n) = params.sample_count {
        records.truncate(n);
    }

    let width = validate_records(&records)?;
    let end = match params.feature_width {
        Some(w) => params.feature_offset + w,
        None => width,
    };
    if params.feature_offset > end || end > width {
        return Err(ProtocolError::ErrorInput(format!(
            "feature columns {}..{} are outside the {} available",
            params.feature_offset, end, width
        )));
    }

    let held_out = ((records.len() as f64) * params.held_out_fraction).floor() as usize;
    let kept = records.len() - held_out.min(records.len());
    let pattern = permutations::gen_permute_pattern(records.len(), rng);
    let mut sampled = permutations::gather(&pattern[..kept.min(pattern.len())], &records)?;
    for r in sampled.iter_mut() {
        r.features = r.features[params.feature_offset..end].to_vec();
    }

    info!(
        "Sampled {} of {} records, feature columns {}..{}",
        sampled.len(),
        records.len(),
        params.feature_offset,
        end
    );
    Ok(sampled)
}
