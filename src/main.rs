use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use cbdc_metrics_rs::analyzer::{compute_breakdown, compute_throughput};
use cbdc_metrics_rs::args::{Args, QuantileImplArg};
use cbdc_metrics_rs::filter::filter_transactions;
use cbdc_metrics_rs::ingest::{collect_log_files, load_and_merge};
use cbdc_metrics_rs::quantile::QuantileImpl;
use cbdc_metrics_rs::report::{print_batching, print_breakdown, print_throughput};
use cbdc_metrics_rs::timeline::{reconstruct_timelines, resolve_persisted_times};

fn main() -> Result<()> {
    env_logger::init();
    let profile_enabled = std::env::var("CBDC_METRICS_PROFILE")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let t0 = Instant::now();

    let args = Args::parse();
    let impl_kind = match args.quantile_impl {
        QuantileImplArg::Brute => QuantileImpl::Brute,
        QuantileImplArg::Tdigest => QuantileImpl::TDigest,
    };

    let files = collect_log_files(&args.files)?;
    let t_load = Instant::now();
    let mut data = load_and_merge(&files)?;
    if profile_enabled {
        eprintln!("[profile] load_and_merge: {:.3}s", t_load.elapsed().as_secs_f64());
    }

    filter_transactions(&mut data, args.skip_fraction);
    let timelines = reconstruct_timelines(&data)?;
    let persisted = resolve_persisted_times(&mut data, &timelines);

    let t_report = Instant::now();
    match compute_throughput(&data, &persisted) {
        Some(throughput) => print_throughput(&throughput, impl_kind),
        None => println!("no analyzable transactions after filtering"),
    }

    if args.batching {
        print_batching(&data, impl_kind);
    }
    if args.latency {
        let breakdown = compute_breakdown(&data, &persisted);
        print_breakdown(&breakdown, impl_kind);
    }
    if profile_enabled {
        eprintln!("[profile] analyze/report: {:.3}s", t_report.elapsed().as_secs_f64());
        eprintln!("[profile] total main: {:.3}s", t0.elapsed().as_secs_f64());
    }

    Ok(())
}
