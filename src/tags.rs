//! Log tag enumeration and per-tag routing.
//!
//! Tags come in two numeric families (client tier 100xxx, UDL tier 200xxx)
//! plus the storage tier's persistence notification (5001). Each tag maps to
//! exactly one routing rule consumed by the aggregator; recognized tags with
//! no routing are ignored so future tags can be added without breaking old
//! analyzers.

/// Semantic meaning of one log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    ClientDeploymentInfo,
    ClientTransferStart,
    ClientTransferQueue,
    ClientTransferSending,
    ClientTransferSent,
    ClientStatus,
    ClientBatching,
    HandlerStart,
    HandlerQueuing,
    HandlerEnd,
    OperationStart,
    OperationEnd,
    EnqueueEnd,
    WalletPersistStart,
    WalletPersistEnd,
    TxPersistStart,
    TxPersistEnd,
    NewStart,
    RunStart,
    CommitStart,
    AbortStart,
    ForwardStart,
    ForwardEnd,
    BackwardStart,
    BackwardEnd,
    WalletBatching,
    ChainBatching,
    TxBatching,
    Persisted,
}

/// Single-occurrence timestamps stored directly on a transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStage {
    TransferStart,
    TransferSending,
    TransferSent,
    TxPersistStart,
    TxPersistEnd,
}

/// Multi-occurrence timestamps keyed by the worker index carried in `extra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerStage {
    HandlerStart,
    HandlerQueuing,
    HandlerEnd,
    OperationStart,
    OperationEnd,
    EnqueueEnd,
    WalletPersistStart,
    WalletPersistEnd,
    NewStart,
    RunStart,
    CommitStart,
    AbortStart,
    ForwardStart,
    ForwardEnd,
    BackwardStart,
    BackwardEnd,
}

/// Send-side coalescing categories with their own batching sample lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchCategory {
    Client,
    Wallet,
    Chain,
    TxPersist,
}

impl BatchCategory {
    pub fn all_in_order() -> &'static [BatchCategory] {
        use BatchCategory::*;
        &[Client, Wallet, Chain, TxPersist]
    }

    pub fn label(self) -> &'static str {
        match self {
            BatchCategory::Client => "client_batching",
            BatchCategory::Wallet => "wallet_batching",
            BatchCategory::Chain => "chain_batching",
            BatchCategory::TxPersist => "tx_batching",
        }
    }
}

/// How the aggregator consumes one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Scalar timestamp on the owning transaction record.
    TxScalar(ScalarStage),
    /// Per-worker timestamp map on the owning transaction record.
    TxWorker(WorkerStage),
    /// Committed version of the transaction, carried in `extra`.
    CommittedVersion,
    /// Node to shard association, shard id carried in the tx-id field.
    DeploymentInfo,
    /// Per-node `(version, timestamp)` persistence observation.
    PersistedVersion,
    /// Batching size sample, size carried in the tx-id field.
    Batching(BatchCategory),
    /// Recognized but not consumed.
    Ignore,
}

impl Tag {
    pub fn from_code(code: i64) -> Option<Tag> {
        let tag = match code {
            100005 => Tag::ClientDeploymentInfo,
            100010 => Tag::ClientTransferStart,
            100020 => Tag::ClientTransferQueue,
            100050 => Tag::ClientTransferSending,
            100080 => Tag::ClientTransferSent,
            100100 => Tag::ClientStatus,
            100110 => Tag::ClientBatching,
            200010 => Tag::HandlerStart,
            200020 => Tag::HandlerQueuing,
            200030 => Tag::HandlerEnd,
            200040 => Tag::OperationStart,
            200050 => Tag::OperationEnd,
            200060 => Tag::EnqueueEnd,
            200070 => Tag::WalletPersistStart,
            200080 => Tag::WalletPersistEnd,
            200090 => Tag::TxPersistStart,
            200100 => Tag::TxPersistEnd,
            200110 => Tag::NewStart,
            200115 => Tag::RunStart,
            200120 => Tag::CommitStart,
            200130 => Tag::AbortStart,
            200140 => Tag::ForwardStart,
            200150 => Tag::ForwardEnd,
            200160 => Tag::BackwardStart,
            200170 => Tag::BackwardEnd,
            200180 => Tag::WalletBatching,
            200190 => Tag::ChainBatching,
            200200 => Tag::TxBatching,
            5001 => Tag::Persisted,
            _ => return None,
        };
        Some(tag)
    }

    pub fn route(self) -> Route {
        match self {
            Tag::ClientDeploymentInfo => Route::DeploymentInfo,
            Tag::ClientTransferStart => Route::TxScalar(ScalarStage::TransferStart),
            Tag::ClientTransferQueue => Route::Ignore,
            Tag::ClientTransferSending => Route::TxScalar(ScalarStage::TransferSending),
            Tag::ClientTransferSent => Route::TxScalar(ScalarStage::TransferSent),
            Tag::ClientStatus => Route::CommittedVersion,
            Tag::ClientBatching => Route::Batching(BatchCategory::Client),
            Tag::HandlerStart => Route::TxWorker(WorkerStage::HandlerStart),
            Tag::HandlerQueuing => Route::TxWorker(WorkerStage::HandlerQueuing),
            Tag::HandlerEnd => Route::TxWorker(WorkerStage::HandlerEnd),
            Tag::OperationStart => Route::TxWorker(WorkerStage::OperationStart),
            Tag::OperationEnd => Route::TxWorker(WorkerStage::OperationEnd),
            Tag::EnqueueEnd => Route::TxWorker(WorkerStage::EnqueueEnd),
            Tag::WalletPersistStart => Route::TxWorker(WorkerStage::WalletPersistStart),
            Tag::WalletPersistEnd => Route::TxWorker(WorkerStage::WalletPersistEnd),
            Tag::TxPersistStart => Route::TxScalar(ScalarStage::TxPersistStart),
            Tag::TxPersistEnd => Route::TxScalar(ScalarStage::TxPersistEnd),
            Tag::NewStart => Route::TxWorker(WorkerStage::NewStart),
            Tag::RunStart => Route::TxWorker(WorkerStage::RunStart),
            Tag::CommitStart => Route::TxWorker(WorkerStage::CommitStart),
            Tag::AbortStart => Route::TxWorker(WorkerStage::AbortStart),
            Tag::ForwardStart => Route::TxWorker(WorkerStage::ForwardStart),
            Tag::ForwardEnd => Route::TxWorker(WorkerStage::ForwardEnd),
            Tag::BackwardStart => Route::TxWorker(WorkerStage::BackwardStart),
            Tag::BackwardEnd => Route::TxWorker(WorkerStage::BackwardEnd),
            Tag::WalletBatching => Route::Batching(BatchCategory::Wallet),
            Tag::ChainBatching => Route::Batching(BatchCategory::Chain),
            Tag::TxBatching => Route::Batching(BatchCategory::TxPersist),
            Tag::Persisted => Route::PersistedVersion,
        }
    }
}
