//! Throughput, end-to-end latency, per-stage breakdown, batching samples.
//!
//! Everything here consumes the filtered, resolved transaction set
//! read-only. A transaction missing the timestamps for one stage simply
//! contributes no sample to that stage.

use std::collections::HashMap;

use crate::model::{AnalysisData, TxRecord};
use crate::tags::{BatchCategory, WorkerStage};

const NS_PER_SEC: f64 = 1e9;
const NS_PER_MS: f64 = 1e6;

/// One throughput variant: transactions per second over an elapsed span.
#[derive(Debug, Clone, Copy)]
pub struct Rate {
    pub tx_per_sec: f64,
    pub count: usize,
    pub elapsed_secs: f64,
}

impl Rate {
    fn new(count: usize, elapsed_ns: i64) -> Rate {
        let elapsed_secs = elapsed_ns as f64 / NS_PER_SEC;
        let tx_per_sec = match elapsed_ns > 0 {
            true => count as f64 / elapsed_secs,
            false => f64::NAN,
        };
        Rate {
            tx_per_sec,
            count,
            elapsed_secs,
        }
    }
}

#[derive(Debug)]
pub struct ThroughputReport {
    pub sending_rate: Rate,
    pub real_sending_rate: Rate,
    pub persisted_throughput: Rate,
    /// End-to-end latency samples (persisted - transfer-sent), milliseconds.
    pub e2e_ms: Vec<f64>,
}

/// Compute the three throughput variants and the e2e latency samples.
/// `None` when the analyzable set is empty.
pub fn compute_throughput(
    data: &AnalysisData,
    persisted: &HashMap<i64, i64>,
) -> Option<ThroughputReport> {
    if data.txs.is_empty() {
        return None;
    }

    let last_persisted = *persisted.values().max()?;
    let mut first_start = i64::MAX;
    let mut last_start = i64::MIN;
    let mut first_sending = i64::MAX;
    let mut last_sent = i64::MIN;
    let mut e2e_ms = Vec::with_capacity(data.txs.len());

    for (tx_id, rec) in &data.txs {
        if let Some(ts) = rec.transfer_start {
            first_start = first_start.min(ts);
            last_start = last_start.max(ts);
        }
        if let Some(ts) = rec.transfer_sending {
            first_sending = first_sending.min(ts);
        }
        if let Some(sent) = rec.transfer_sent {
            last_sent = last_sent.max(sent);
            if let Some(&p) = persisted.get(tx_id) {
                e2e_ms.push((p - sent) as f64 / NS_PER_MS);
            }
        }
    }

    let count = data.txs.len();
    Some(ThroughputReport {
        sending_rate: Rate::new(count, last_start.saturating_sub(first_start)),
        real_sending_rate: Rate::new(count, last_sent.saturating_sub(first_sending)),
        // Binding baseline: elapsed runs from the earliest transfer-start
        // to the last persisted timestamp.
        persisted_throughput: Rate::new(count, last_persisted.saturating_sub(first_start)),
        e2e_ms,
    })
}

/// Per-stage latency sample lists, milliseconds.
#[derive(Debug, Default)]
pub struct BreakdownSamples {
    pub e2e: Vec<f64>,
    pub handler: Vec<f64>,
    pub queue: Vec<f64>,
    pub thread: Vec<f64>,
    pub stabilization: Vec<f64>,
    pub conflict: Vec<f64>,
    pub wallet: Vec<f64>,
    pub tx_put: Vec<f64>,
    pub forward: Vec<f64>,
    pub backward: Vec<f64>,
}

impl BreakdownSamples {
    pub fn labeled(&self) -> [(&'static str, &Vec<f64>); 10] {
        [
            ("e2e", &self.e2e),
            ("handler", &self.handler),
            ("queue", &self.queue),
            ("thread", &self.thread),
            ("stable", &self.stabilization),
            ("conflict", &self.conflict),
            ("wallet", &self.wallet),
            ("txput", &self.tx_put),
            ("forward", &self.forward),
            ("backward", &self.backward),
        ]
    }
}

/// Duration samples for (worker) pairs holding both endpoints of a stage.
fn worker_durations(rec: &TxRecord, end: WorkerStage, start: WorkerStage, out: &mut Vec<f64>) {
    let (Some(ends), Some(starts)) = (rec.worker_stamps(end), rec.worker_stamps(start)) else {
        return;
    };
    for (worker, &end_ts) in ends {
        if let Some(&start_ts) = starts.get(worker) {
            out.push((end_ts - start_ts) as f64 / NS_PER_MS);
        }
    }
}

pub fn compute_breakdown(data: &AnalysisData, persisted: &HashMap<i64, i64>) -> BreakdownSamples {
    let mut out = BreakdownSamples::default();

    for (tx_id, rec) in &data.txs {
        let p = persisted.get(tx_id).copied();

        if let (Some(p), Some(sent)) = (p, rec.transfer_sent) {
            out.e2e.push((p - sent) as f64 / NS_PER_MS);
        }
        if let (Some(p), Some(end)) = (p, rec.tx_persist_end) {
            out.stabilization.push((p - end) as f64 / NS_PER_MS);
        }
        if let (Some(end), Some(start)) = (rec.tx_persist_end, rec.tx_persist_start) {
            out.tx_put.push((end - start) as f64 / NS_PER_MS);
        }

        worker_durations(rec, WorkerStage::HandlerEnd, WorkerStage::HandlerStart, &mut out.handler);
        // queueing: from handler hand-off to the worker picking it up
        worker_durations(rec, WorkerStage::OperationStart, WorkerStage::HandlerEnd, &mut out.queue);
        worker_durations(rec, WorkerStage::OperationEnd, WorkerStage::OperationStart, &mut out.thread);
        worker_durations(rec, WorkerStage::EnqueueEnd, WorkerStage::NewStart, &mut out.conflict);
        worker_durations(rec, WorkerStage::WalletPersistEnd, WorkerStage::WalletPersistStart, &mut out.wallet);
        worker_durations(rec, WorkerStage::ForwardEnd, WorkerStage::ForwardStart, &mut out.forward);
        worker_durations(rec, WorkerStage::BackwardEnd, WorkerStage::BackwardStart, &mut out.backward);
    }

    out
}

/// Raw batching sample lists in report order.
pub fn batching_samples(data: &AnalysisData) -> Vec<(&'static str, &[f64])> {
    BatchCategory::all_in_order()
        .iter()
        .map(|cat| (cat.label(), data.batch_samples(*cat)))
        .collect()
}
