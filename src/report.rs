use prettytable::{Cell, Row, Table};

use crate::analyzer::{BreakdownSamples, Rate, ThroughputReport};
use crate::model::AnalysisData;
use crate::quantile::QuantileImpl;
use crate::stats::{summarize, Summary};

fn print_rate(label: &str, rate: &Rate) {
    match rate.tx_per_sec.is_nan() {
        true => println!(
            "{}: N/A ({} TXs, elapsed is 0)",
            label, rate.count
        ),
        false => println!(
            "{}: {:.2} tx/s ({} TXs in {:.2} seconds)",
            label, rate.tx_per_sec, rate.count, rate.elapsed_secs
        ),
    }
}

/// Always-printed section: the three rates plus the e2e latency summary.
pub fn print_throughput(report: &ThroughputReport, impl_kind: QuantileImpl) {
    print_rate("client sending rate", &report.sending_rate);
    print_rate("real sending rate", &report.real_sending_rate);
    print_rate("throughput", &report.persisted_throughput);

    let s = summarize(&report.e2e_ms, impl_kind);
    println!(
        "e2e latency (ms): avg {:.3} | std {:.3} | med {:.3} | min {:.3} | max {:.3} | p95 {:.3} | p99 {:.3}",
        s.avg, s.std, s.med, s.min, s.max, s.p95, s.p99
    );
}

fn summary_table() -> Table {
    let mut table = Table::new();
    table.set_titles(Row::new(vec![
        Cell::new("metric"),
        Cell::new("Avg"),
        Cell::new("Std"),
        Cell::new("Med"),
        Cell::new("Min"),
        Cell::new("Max"),
        Cell::new("P95"),
        Cell::new("P99"),
        Cell::new("Cnt"),
    ]));
    table
}

fn row_from_summary(name: &str, s: &Summary) -> Row {
    let f = |v: f64| -> String {
        if v.is_nan() {
            return "nan".to_string();
        }
        format!("{:.3}", v)
    };
    Row::new(vec![
        Cell::new(name),
        Cell::new(&f(s.avg)),
        Cell::new(&f(s.std)),
        Cell::new(&f(s.med)),
        Cell::new(&f(s.min)),
        Cell::new(&f(s.max)),
        Cell::new(&f(s.p95)),
        Cell::new(&f(s.p99)),
        Cell::new(&format!("{}", s.cnt)),
    ])
}

/// Optional `-b` section: one row per batching category, zeros when that
/// category never appeared in the logs.
pub fn print_batching(data: &AnalysisData, impl_kind: QuantileImpl) {
    println!("\nbatching statistics:");
    let mut table = summary_table();
    for (label, samples) in crate::analyzer::batching_samples(data) {
        table.add_row(row_from_summary(label, &summarize(samples, impl_kind)));
    }
    table.printstd();
}

/// Optional `-l` section: per-stage latency breakdown in milliseconds.
pub fn print_breakdown(samples: &BreakdownSamples, impl_kind: QuantileImpl) {
    println!("\nlatency breakdown (ms):");
    let mut table = summary_table();
    for (label, values) in samples.labeled() {
        table.add_row(row_from_summary(label, &summarize(values, impl_kind)));
    }
    table.printstd();
}
