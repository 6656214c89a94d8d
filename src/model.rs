use std::collections::HashMap;

use crate::tags::{BatchCategory, Tag, WorkerStage};

/// One decoded log record. Ephemeral: produced by the parser, consumed by the
/// aggregator, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub tag: Tag,
    pub timestamp_ns: i64,
    pub node_id: i64,
    pub tx_id: i64,
    pub extra: i64,
    pub extra2: i64,
}

/// Per-transaction timeline, keyed by tx id in [`AnalysisData::txs`].
///
/// Scalar stages occur once per transaction; worker stages occur once per
/// (transaction, worker) pair and live in nested maps keyed by the worker
/// index. Any field may be absent for a partially-logged transaction.
#[derive(Debug, Clone, Default)]
pub struct TxRecord {
    pub transfer_start: Option<i64>,
    pub transfer_sending: Option<i64>,
    pub transfer_sent: Option<i64>,
    pub tx_persist_start: Option<i64>,
    pub tx_persist_end: Option<i64>,
    pub committed_version: Option<i64>,
    pub shard_id: Option<i64>,
    worker: HashMap<WorkerStage, HashMap<i64, i64>>,
}

impl TxRecord {
    pub fn record_worker(&mut self, stage: WorkerStage, worker: i64, ts: i64) {
        self.worker.entry(stage).or_default().insert(worker, ts);
    }

    /// Per-worker timestamps for one stage; `None` if the stage never
    /// occurred for this transaction.
    pub fn worker_stamps(&self, stage: WorkerStage) -> Option<&HashMap<i64, i64>> {
        self.worker.get(&stage)
    }

    pub fn take_worker_maps(&mut self) -> HashMap<WorkerStage, HashMap<i64, i64>> {
        std::mem::take(&mut self.worker)
    }
}

/// Per-node send-time extrema, updated on every transfer-sent event.
#[derive(Debug, Clone, Copy)]
pub struct NodeActivity {
    pub first_sent: i64,
    pub last_sent: i64,
}

impl NodeActivity {
    pub fn observe(&mut self, ts: i64) {
        self.first_sent = self.first_sent.min(ts);
        self.last_sent = self.last_sent.max(ts);
    }

    pub fn merge(&mut self, other: NodeActivity) {
        self.first_sent = self.first_sent.min(other.first_sent);
        self.last_sent = self.last_sent.max(other.last_sent);
    }
}

impl Default for NodeActivity {
    fn default() -> Self {
        NodeActivity {
            first_sent: i64::MAX,
            last_sent: i64::MIN,
        }
    }
}

/// Everything accumulated during the single ingestion pass. Owned and
/// mutated only by the aggregator; downstream stages take it by reference
/// (or, for the filter and resolver, by `&mut` to drop transactions).
#[derive(Debug, Default)]
pub struct AnalysisData {
    pub txs: HashMap<i64, TxRecord>,
    /// node id -> shard id, from deployment-info events.
    pub node_shard: HashMap<i64, i64>,
    pub node_activity: HashMap<i64, NodeActivity>,
    /// node id -> raw (version, persisted ts) observations, unsorted.
    pub persisted_obs: HashMap<i64, Vec<(i64, i64)>>,
    /// (transfer-start ts, tx id) in arrival order; the trim filter sorts it.
    pub start_order: Vec<(i64, i64)>,
    client_batching: Vec<f64>,
    wallet_batching: Vec<f64>,
    chain_batching: Vec<f64>,
    tx_batching: Vec<f64>,
}

impl AnalysisData {
    pub fn tx_mut(&mut self, tx_id: i64) -> &mut TxRecord {
        self.txs.entry(tx_id).or_default()
    }

    pub fn batch_samples(&self, cat: BatchCategory) -> &[f64] {
        match cat {
            BatchCategory::Client => &self.client_batching,
            BatchCategory::Wallet => &self.wallet_batching,
            BatchCategory::Chain => &self.chain_batching,
            BatchCategory::TxPersist => &self.tx_batching,
        }
    }

    pub fn push_batch_sample(&mut self, cat: BatchCategory, size: f64) {
        let bucket = match cat {
            BatchCategory::Client => &mut self.client_batching,
            BatchCategory::Wallet => &mut self.wallet_batching,
            BatchCategory::Chain => &mut self.chain_batching,
            BatchCategory::TxPersist => &mut self.tx_batching,
        };
        bucket.push(size);
    }

    pub fn take_batch_samples(&mut self, cat: BatchCategory) -> Vec<f64> {
        let bucket = match cat {
            BatchCategory::Client => &mut self.client_batching,
            BatchCategory::Wallet => &mut self.wallet_batching,
            BatchCategory::Chain => &mut self.chain_batching,
            BatchCategory::TxPersist => &mut self.tx_batching,
        };
        std::mem::take(bucket)
    }
}
