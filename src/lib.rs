//! Causal-timeline reconstruction and metrics for CBDC benchmark logs.
//!
//! The pipeline runs in strict stages over static, completed log files:
//! parse -> aggregate -> window/trim filter -> persisted-version
//! reconstruction -> statistics. Each stage owns its output and hands a
//! read-only view to the next; nothing persists across runs.

pub mod analyzer;
pub mod args;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod parse;
pub mod quantile;
pub mod report;
pub mod stats;
pub mod tags;
pub mod timeline;
