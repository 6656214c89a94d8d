//! Log ingestion: file discovery, per-file aggregation, deterministic merge.
//!
//! Each input file is parsed independently into a partial [`AnalysisData`];
//! partials are merged in input order, so the result does not depend on
//! which file finishes first. Accumulation is order-insensitive for every
//! derived statistic: scalar timestamps are unique per (tag, tx), extrema
//! merge by min/max, and observation lists are sorted downstream.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::model::{AnalysisData, LogEvent};
use crate::parse::parse_line;
use crate::tags::{Route, ScalarStage};

/// Expand the command-line paths into a flat, sorted list of log files.
/// A directory is scanned recursively for `*.log` files; a plain file is
/// taken as-is.
pub fn collect_log_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry?;
                if entry.file_type().is_file()
                    && entry.path().extension() == Some(OsStr::new("log"))
                {
                    found.push(entry.path().to_path_buf());
                }
            }
            if found.is_empty() {
                return Err(anyhow!("no *.log files found under {}", path.display()));
            }
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(anyhow!("log path not found: {}", path.display()));
        }
    }
    Ok(files)
}

/// Route one event into the accumulation state.
fn apply_event(data: &mut AnalysisData, ev: &LogEvent) {
    match ev.tag.route() {
        Route::TxScalar(stage) => {
            let ts = ev.timestamp_ns;
            let rec = data.tx_mut(ev.tx_id);
            match stage {
                ScalarStage::TransferStart => rec.transfer_start = Some(ts),
                ScalarStage::TransferSending => rec.transfer_sending = Some(ts),
                ScalarStage::TransferSent => rec.transfer_sent = Some(ts),
                ScalarStage::TxPersistStart => {
                    rec.tx_persist_start = Some(ts);
                    rec.shard_id = Some(ev.extra);
                }
                ScalarStage::TxPersistEnd => rec.tx_persist_end = Some(ts),
            }
            match stage {
                ScalarStage::TransferStart => data.start_order.push((ts, ev.tx_id)),
                ScalarStage::TransferSent => {
                    data.node_activity.entry(ev.node_id).or_default().observe(ts)
                }
                _ => {}
            }
        }
        Route::TxWorker(stage) => {
            data.tx_mut(ev.tx_id)
                .record_worker(stage, ev.extra, ev.timestamp_ns);
        }
        Route::CommittedVersion => {
            data.tx_mut(ev.tx_id).committed_version = Some(ev.extra);
        }
        // Deployment records carry the shard id in the tx-id field.
        Route::DeploymentInfo => {
            data.node_shard.insert(ev.node_id, ev.tx_id);
        }
        Route::PersistedVersion => {
            data.persisted_obs
                .entry(ev.node_id)
                .or_default()
                .push((ev.extra, ev.timestamp_ns));
        }
        // Batching records carry the batch size in the tx-id field.
        Route::Batching(cat) => {
            data.push_batch_sample(cat, ev.tx_id as f64);
        }
        Route::Ignore => {}
    }
}

/// Parse one file into a partial aggregate. Any malformed line fails the
/// whole run, reported with path and line number.
pub fn load_file(path: &Path) -> Result<AnalysisData> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut data = AnalysisData::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        let ev = parse_line(&line)
            .map_err(|e| anyhow!("{}:{}: {}", path.display(), idx + 1, e))?;
        if let Some(ev) = ev {
            apply_event(&mut data, &ev);
        }
    }
    Ok(data)
}

fn merge_partial(data: &mut AnalysisData, mut partial: AnalysisData) {
    for (tx_id, mut incoming) in partial.txs.drain() {
        let rec = data.tx_mut(tx_id);
        rec.transfer_start = rec.transfer_start.or(incoming.transfer_start);
        rec.transfer_sending = rec.transfer_sending.or(incoming.transfer_sending);
        rec.transfer_sent = rec.transfer_sent.or(incoming.transfer_sent);
        rec.tx_persist_start = rec.tx_persist_start.or(incoming.tx_persist_start);
        rec.tx_persist_end = rec.tx_persist_end.or(incoming.tx_persist_end);
        rec.committed_version = rec.committed_version.or(incoming.committed_version);
        rec.shard_id = rec.shard_id.or(incoming.shard_id);
        for (stage, stamps) in incoming.take_worker_maps() {
            for (worker, ts) in stamps {
                rec.record_worker(stage, worker, ts);
            }
        }
    }
    for (node, shard) in partial.node_shard.drain() {
        data.node_shard.entry(node).or_insert(shard);
    }
    for (node, activity) in partial.node_activity.drain() {
        data.node_activity.entry(node).or_default().merge(activity);
    }
    for (node, mut obs) in partial.persisted_obs.drain() {
        data.persisted_obs
            .entry(node)
            .or_default()
            .append(&mut obs);
    }
    data.start_order.append(&mut partial.start_order);
    for cat in crate::tags::BatchCategory::all_in_order() {
        let samples = partial.take_batch_samples(*cat);
        for s in samples {
            data.push_batch_sample(*cat, s);
        }
    }
}

/// Single ingestion pass over all files. Files are parsed in parallel;
/// partial aggregates merge in input order.
pub fn load_and_merge(files: &[PathBuf]) -> Result<AnalysisData> {
    let partials: Vec<Result<AnalysisData>> =
        files.par_iter().map(|p| load_file(p)).collect();

    let mut data = AnalysisData::default();
    for (path, partial) in files.iter().zip(partials) {
        let partial = partial?;
        log::debug!("ingested {}", path.display());
        merge_partial(&mut data, partial);
    }
    log::info!(
        "ingested {} files: {} transactions, {} nodes",
        files.len(),
        data.txs.len(),
        data.node_activity.len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Tag;

    fn ev(tag: Tag, ts: i64, node: i64, tx: i64, extra: i64) -> LogEvent {
        LogEvent {
            tag,
            timestamp_ns: ts,
            node_id: node,
            tx_id: tx,
            extra,
            extra2: 0,
        }
    }

    #[test]
    fn scalar_tags_set_fields_and_side_lists() {
        let mut data = AnalysisData::default();
        apply_event(&mut data, &ev(Tag::ClientTransferStart, 100, 1, 7, 0));
        apply_event(&mut data, &ev(Tag::ClientTransferSent, 120, 1, 7, 0));
        apply_event(&mut data, &ev(Tag::ClientStatus, 130, 1, 7, 42));
        apply_event(&mut data, &ev(Tag::TxPersistStart, 140, 1, 7, 2));

        let rec = &data.txs[&7];
        assert_eq!(rec.transfer_start, Some(100));
        assert_eq!(rec.transfer_sent, Some(120));
        assert_eq!(rec.committed_version, Some(42));
        assert_eq!(rec.shard_id, Some(2));
        assert_eq!(data.start_order, vec![(100, 7)]);
        let act = &data.node_activity[&1];
        assert_eq!((act.first_sent, act.last_sent), (120, 120));
    }

    #[test]
    fn worker_tags_key_by_extra() {
        let mut data = AnalysisData::default();
        apply_event(&mut data, &ev(Tag::HandlerStart, 10, 1, 7, 3));
        apply_event(&mut data, &ev(Tag::HandlerStart, 20, 1, 7, 4));
        let stamps = data.txs[&7]
            .worker_stamps(crate::tags::WorkerStage::HandlerStart)
            .unwrap();
        assert_eq!(stamps.len(), 2);
        assert_eq!(stamps[&3], 10);
        assert_eq!(stamps[&4], 20);
    }

    #[test]
    fn deployment_batching_and_persisted_routing() {
        let mut data = AnalysisData::default();
        apply_event(&mut data, &ev(Tag::ClientDeploymentInfo, 0, 5, 2, 0));
        apply_event(&mut data, &ev(Tag::ClientBatching, 0, 5, 16, 0));
        apply_event(&mut data, &ev(Tag::Persisted, 900, 5, 0, 33));

        assert_eq!(data.node_shard[&5], 2);
        assert_eq!(
            data.batch_samples(crate::tags::BatchCategory::Client),
            &[16.0]
        );
        assert_eq!(data.persisted_obs[&5], vec![(33, 900)]);
        // no transaction record is created by any of these
        assert!(data.txs.is_empty());
    }

    #[test]
    fn merge_is_field_wise_and_keeps_extrema() {
        let mut a = AnalysisData::default();
        apply_event(&mut a, &ev(Tag::ClientTransferStart, 100, 1, 7, 0));
        apply_event(&mut a, &ev(Tag::ClientTransferSent, 150, 1, 7, 0));

        let mut b = AnalysisData::default();
        apply_event(&mut b, &ev(Tag::HandlerStart, 160, 2, 7, 0));
        apply_event(&mut b, &ev(Tag::ClientTransferSent, 300, 1, 8, 0));
        apply_event(&mut b, &ev(Tag::Persisted, 500, 2, 0, 10));

        merge_partial(&mut a, b);
        let rec = &a.txs[&7];
        assert_eq!(rec.transfer_start, Some(100));
        assert!(rec
            .worker_stamps(crate::tags::WorkerStage::HandlerStart)
            .is_some());
        let act = &a.node_activity[&1];
        assert_eq!((act.first_sent, act.last_sent), (150, 300));
        assert_eq!(a.persisted_obs[&2], vec![(10, 500)]);
    }
}
