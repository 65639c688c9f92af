//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use clap::App;
use clap::Arg;
use clap::ArgGroup;
use common::timer;
use crypto::bloom::BloomParameters;
use log::info;
use log::warn;
use protocol::share_join::party_a::PartyAShareJoin;
use protocol::share_join::traits::PartyAShareJoinProtocol;
use rpc::connect::shutdown;
use rpc::share_join::config::ShareJoinConfig;
use rpc::share_join::config::DEFAULT_PEER_LISTEN;
use rpc::share_join::matching_client::RpcMatchingClient;
use rpc::share_join::peer_channel::PeerShareChannel;
use rpc::share_join::run_party_a;

fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + 'static,
{
    Ok(value.map(|x| x.parse::<T>()).transpose()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = App::new("Share Join Party A")
        .version("0.1")
        .about("Party A of the three-party private feature join")
        .args(&[
            Arg::with_name("peer-host")
                .long("peer-host")
                .takes_value(true)
                .default_value(DEFAULT_PEER_LISTEN)
                .help("Address to listen on for Party B, ex: 0.0.0.0:8001"),
            Arg::with_name("matching-service")
                .long("matching-service")
                .short("m")
                .takes_value(true)
                .default_value("127.0.0.1:8080")
                .help("Matching service address"),
            Arg::with_name("input")
                .long("input")
                .short("i")
                .default_value("input.csv")
                .help("Path to input file: identifier followed by integer features"),
            Arg::with_name("input-with-headers")
                .long("input-with-headers")
                .takes_value(false)
                .help("Indicates if the input CSV contains headers"),
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("Path to output file with the aligned shares"),
            Arg::with_name("stdout")
                .long("stdout")
                .short("u")
                .takes_value(false)
                .help("Prints the output to stdout rather than file"),
            Arg::with_name("expected-elements")
                .long("expected-elements")
                .takes_value(true)
                .default_value("32")
                .help("Bloom filter expected element count"),
            Arg::with_name("min-hashes")
                .long("min-hashes")
                .takes_value(true)
                .default_value("2")
                .help("Bloom filter minimal number of hash functions"),
            Arg::with_name("sample-count")
                .long("sample-count")
                .takes_value(true)
                .help("Keep at most this many records from the head of the input"),
            Arg::with_name("held-out")
                .long("held-out")
                .takes_value(true)
                .default_value("0.2")
                .help("Fraction of the shuffled records left out of the run"),
            Arg::with_name("feature-offset")
                .long("feature-offset")
                .takes_value(true)
                .default_value("0")
                .help("First feature column kept"),
            Arg::with_name("feature-width")
                .long("feature-width")
                .takes_value(true)
                .help("Number of feature columns kept, all when unset"),
            Arg::with_name("peer-timeout-secs")
                .long("peer-timeout-secs")
                .takes_value(true)
                .default_value("300")
                .help("Seconds to wait for Party B to complete the share exchange"),
            Arg::with_name("service-timeout-secs")
                .long("service-timeout-secs")
                .takes_value(true)
                .default_value("120")
                .help("Seconds allowed for one matching service attempt"),
            Arg::with_name("service-retries")
                .long("service-retries")
                .takes_value(true)
                .default_value("3")
                .help("Matching service attempts before giving up"),
        ])
        .groups(&[ArgGroup::with_name("out")
            .args(&["output", "stdout"])
            .required(true)])
        .get_matches();

    let global_timer = timer::Timer::new_silent("global");

    let mut config = ShareJoinConfig::default();
    if let Some(x) = matches.value_of("peer-host") {
        config.peer_listen = String::from(x);
    }
    if let Some(x) = matches.value_of("matching-service") {
        config.matching_service = String::from(x);
    }
    config.bloom = BloomParameters::new(
        parse_opt(matches.value_of("expected-elements"))?.unwrap_or(config.bloom.expected_elements),
        parse_opt(matches.value_of("min-hashes"))?.unwrap_or(config.bloom.min_hashes),
    )?;
    config.sampling.sample_count = parse_opt(matches.value_of("sample-count"))?;
    if let Some(x) = parse_opt(matches.value_of("held-out"))? {
        config.sampling.held_out_fraction = x;
    }
    if let Some(x) = parse_opt(matches.value_of("feature-offset"))? {
        config.sampling.feature_offset = x;
    }
    config.sampling.feature_width = parse_opt(matches.value_of("feature-width"))?;
    if let Some(x) = parse_opt(matches.value_of("peer-timeout-secs"))? {
        config.peer_timeout = Duration::from_secs(x);
    }
    if let Some(x) = parse_opt(matches.value_of("service-timeout-secs"))? {
        config.call.attempt_timeout = Duration::from_secs(x);
    }
    if let Some(x) = parse_opt(matches.value_of("service-retries"))? {
        config.call.attempts = x;
    }
    config.call.max_frame_len = config.max_frame_len;

    let input_path = matches.value_of("input").unwrap_or("input.csv");
    let input_with_headers = matches.is_present("input-with-headers");
    let output_path = matches.value_of("output");

    info!("Input path: {}", input_path);
    match output_path {
        Some(p) => info!("Output path: {}", p),
        None => info!("Output view to stdout (first 10 items)"),
    }

    // 1. Load and sample the local records
    let protocol = PartyAShareJoin::new(config.bloom);
    info!(
        "Bloom filter: {} bits, {} hashes",
        protocol.params().size_bits,
        protocol.params().hash_count
    );
    protocol.load_data(input_path, input_with_headers, &config.sampling)?;

    // 2. Reserve the peer endpoint before anything is sent out
    let channel = PeerShareChannel::bind(&config.peer_listen, config.max_frame_len).await?;

    let (trigger, shutdown_rx) = shutdown::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, shutting down");
            if !trigger.fire() {
                warn!("Run already finished");
            }
        }
    });

    // 3. Exchange, match and reconcile
    let matching = RpcMatchingClient::new(&config.matching_service, config.call.clone());
    let aligned = run_party_a(
        &protocol,
        channel,
        &matching,
        config.peer_timeout,
        &shutdown_rx,
    )
    .await?;
    info!("Aligned {} rows", aligned.len());

    // 4. Output
    match output_path {
        Some(p) => protocol.save_aligned_shares(p)?,
        None => protocol.print_aligned_shares(10),
    }

    global_timer.qps("total time", protocol.get_size());
    info!("Bye!");
    Ok(())
}
