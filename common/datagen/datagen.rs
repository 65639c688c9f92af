//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use clap::App;
use clap::Arg;
use log::info;
use rand::distributions;
use rand::thread_rng;
use rand::Rng;

pub mod gen {
    use super::*;
    use common::files::KeyedNums;
    use rand::prelude::SliceRandom;
    use rayon::iter::IntoParallelRefIterator;
    use rayon::iter::ParallelIterator;

    pub struct Data {
        pub player_a: Vec<String>,
        pub player_b: Vec<String>,
    }

    /// Both players get `intersection_size` shared keys on top of their own
    pub fn random_keys(player_a_size: usize, player_b_size: usize, intersection_size: usize) -> Data {
        let string_len = 16;
        let intersection = par_random_string(intersection_size, string_len);
        let mut rng = rand::thread_rng();

        let mut player_a = par_random_string(player_a_size, string_len);
        player_a.extend_from_slice(&intersection);
        player_a.shuffle(&mut rng);

        let mut player_b = par_random_string(player_b_size, string_len);
        player_b.extend_from_slice(&intersection);
        player_b.shuffle(&mut rng);

        Data { player_a, player_b }
    }

    pub fn par_random_string(size: usize, string_len: usize) -> Vec<String> {
        (0..size)
            .collect::<Vec<usize>>()
            .par_iter()
            .map(|_| random_string(string_len))
            .collect::<Vec<String>>()
    }

    /// Dummy key generation only
    fn random_string(size: usize) -> String {
        thread_rng()
            .sample_iter(&distributions::Alphanumeric)
            .take(size)
            .map(char::from)
            .collect()
    }

    pub fn with_features(keys: &[String], cols: usize, max_value: u64) -> Vec<KeyedNums<u64>> {
        use indicatif::ProgressBar;

        let progress_bar = ProgressBar::new(keys.len() as u64);
        let mut rng = thread_rng();
        let mut rows = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            rows.push(KeyedNums {
                key: key.to_string(),
                ints: (0..cols).map(|_| rng.gen_range(0..max_value)).collect(),
            });
            if i % 100 == 0 {
                progress_bar.inc(100);
            }
        }
        progress_bar.finish();
        rows
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = App::new("Share join data generator")
        .version("0.1")
        .about("Generates keyed feature inputs for party A and party B")
        .args(&[
            Arg::with_name("dir")
                .short("d")
                .long("dir")
                .value_name("DIR")
                .help("output dir")
                .takes_value(true)
                .default_value("./"),
            Arg::with_name("size")
                .short("n")
                .long("size")
                .value_name("SIZE")
                .help("records per party")
                .takes_value(true)
                .default_value("10"),
            Arg::with_name("intersection")
                .long("intersection")
                .value_name("SIZE")
                .help("shared records, defaults to half of size")
                .takes_value(true),
            Arg::with_name("cols-a")
                .long("cols-a")
                .help("feature columns of party a")
                .takes_value(true)
                .default_value("4"),
            Arg::with_name("cols-b")
                .long("cols-b")
                .help("feature columns of party b")
                .takes_value(true)
                .default_value("4"),
            Arg::with_name("max-value")
                .long("max-value")
                .help("feature values are drawn from [0, max-value)")
                .takes_value(true)
                .default_value("256"),
        ])
        .get_matches();

    let size = matches.value_of("size").unwrap_or("10").parse::<usize>()?;
    let intrsct = match matches.value_of("intersection") {
        Some(x) => x.parse::<usize>()?,
        None => size / 2,
    };
    if intrsct > size {
        return Err(format!("intersection {} is larger than size {}", intrsct, size).into());
    }
    let cols_a = matches.value_of("cols-a").unwrap_or("4").parse::<usize>()?;
    let cols_b = matches.value_of("cols-b").unwrap_or("4").parse::<usize>()?;
    let max_value = matches.value_of("max-value").unwrap_or("256").parse::<u64>()?;
    if max_value == 0 {
        return Err("max-value must be positive".into());
    }
    let dir = matches.value_of("dir").unwrap_or("./");

    let fn_a = format!("{}/input_{}_size_{}_cols_{}.csv", dir, "a", size, cols_a);
    let fn_b = format!("{}/input_{}_size_{}_cols_{}.csv", dir, "b", size, cols_b);

    info!("Generating output of size {}, intersection {}", size, intrsct);
    info!("Player a output: {}", fn_a);
    info!("Player b output: {}", fn_b);

    let size_player = size - intrsct;
    let data = gen::random_keys(size_player, size_player, intrsct);
    info!("Key generation done, writing to files");

    common::files::write_keyed_nums_to_csv(
        &gen::with_features(&data.player_a, cols_a, max_value),
        &fn_a,
    )?;
    info!("File {} finished", fn_a);

    common::files::write_keyed_nums_to_csv(
        &gen::with_features(&data.player_b, cols_b, max_value),
        &fn_b,
    )?;
    info!("File {} finished", fn_b);

    info!("Bye!");
    Ok(())
}
