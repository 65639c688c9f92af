//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

extern crate csv;

use std::{error::Error, path::Path, str::FromStr};

/// One CSV line: a string key followed by integer columns
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedNums<T> {
    pub key: String,
    pub ints: Vec<T>,
}

impl KeyedNums<u64> {
    pub fn new(vals: &[String]) -> Result<KeyedNums<u64>, Box<dyn Error>> {
        let (key, rest) = vals
            .split_first()
            .ok_or("Need at least one key column")?;
        Ok(KeyedNums {
            key: key.to_string(),
            ints: KeyedNums::string_to_u64(rest)?,
        })
    }

    /// Negative values are accepted and stored in two's complement
    fn string_to_u64(vals: &[String]) -> Result<Vec<u64>, Box<dyn Error>> {
        vals.iter()
            .map(|x| {
                let x = x.trim();
                u64::from_str(x)
                    .or_else(|_| i64::from_str(x).map(|v| v as u64))
                    .map_err(|_| format!("Cannot format {} as u64", x).into())
            })
            .collect::<Result<Vec<u64>, Box<dyn Error>>>()
    }
}

/// Reads CSV file into vector of rows,
/// where each row is represented as a vector of strings
pub fn read_csv_as_strings<T>(
    filename: T,
    has_headers: bool,
) -> Result<Vec<Vec<String>>, Box<dyn Error>>
where
    T: AsRef<Path>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .flexible(false)
        .has_headers(has_headers)
        .from_path(filename)?;
    let mut res = Vec::new();
    for row in reader.records() {
        res.push(
            row?.iter()
                .map(|z| String::from(z.trim()))
                .collect::<Vec<String>>(),
        );
    }
    Ok(res)
}

/// Reads CSV file into vector of rows,
/// where each row is a key followed by integer-like values
pub fn read_csv_as_keyed_nums<T>(
    filename: T,
    has_headers: bool,
) -> Result<Vec<KeyedNums<u64>>, Box<dyn Error>>
where
    T: AsRef<Path>,
{
    read_csv_as_strings(filename, has_headers)?
        .iter()
        .map(|v| KeyedNums::new(v))
        .collect()
}

/// Writes one CSV line per row, values in row order
pub fn write_u64rows_to_csv<T>(rows: &[Vec<u64>], path: T) -> Result<(), Box<dyn Error>>
where
    T: AsRef<Path>,
{
    let mut wr = csv::WriterBuilder::new()
        .buffer_capacity(1024)
        .flexible(false)
        .from_path(path)?;
    for row in rows.iter() {
        wr.write_record(row.iter().map(|x| x.to_string()))?;
    }
    wr.flush()?;
    Ok(())
}

/// Writes keyed rows, the key goes to the first column
pub fn write_keyed_nums_to_csv<T>(rows: &[KeyedNums<u64>], path: T) -> Result<(), Box<dyn Error>>
where
    T: AsRef<Path>,
{
    let mut wr = csv::WriterBuilder::new()
        .buffer_capacity(1024)
        .flexible(false)
        .from_path(path)?;
    for row in rows.iter() {
        let mut record: Vec<String> = Vec::with_capacity(1 + row.ints.len());
        record.push(row.key.clone());
        record.extend(row.ints.iter().map(|x| x.to_string()));
        wr.write_record(record.as_slice())?;
    }
    wr.flush()?;
    Ok(())
}

pub fn write_u64rows_to_stdout(rows: &[Vec<u64>], limit: usize) {
    if rows.len() > limit {
        warn!(
            "View size {} is bigger than stdout limit {} view will be truncated",
            rows.len(),
            limit
        );
    }
    println!("-----BEGIN ALIGNED SHARES-----");
    for row in rows.iter().take(limit) {
        println!(
            "{}",
            row.iter()
                .map(|x| x.to_string())
                .collect::<Vec<String>>()
                .join(",")
        );
    }
    println!("-----END ALIGNED SHARES-----");
}
