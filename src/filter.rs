//! Steady-state window computation and ramp trimming.
//!
//! A transaction is analyzable only if every participating node was still
//! actively sending when the client finished its send. The window is the
//! intersection of per-node send activity; it can invert when node activity
//! periods do not overlap, in which case nothing survives.

use std::collections::HashMap;

use crate::model::{AnalysisData, NodeActivity};

/// Default fraction of earliest/latest-started transactions trimmed away.
pub const DEFAULT_SKIP_FRACTION: f64 = 0.1;

/// `[first_ts, last_ts]` during which every node was actively sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteadyStateWindow {
    pub first_ts: i64,
    pub last_ts: i64,
}

impl SteadyStateWindow {
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.first_ts && ts <= self.last_ts
    }
}

/// Intersection of per-node send extrema. `None` when no node ever sent.
pub fn steady_state_window(
    node_activity: &HashMap<i64, NodeActivity>,
) -> Option<SteadyStateWindow> {
    if node_activity.is_empty() {
        return None;
    }
    let first_ts = node_activity.values().map(|a| a.first_sent).max()?;
    let last_ts = node_activity.values().map(|a| a.last_sent).min()?;
    Some(SteadyStateWindow { first_ts, last_ts })
}

/// Drop transactions that are incomplete, outside the steady-state window,
/// or inside the warm-up/cool-down ramp. Never fails: an empty survivor set
/// is a valid outcome, surfaced downstream as "no data".
pub fn filter_transactions(data: &mut AnalysisData, skip_fraction: f64) {
    let before = data.txs.len();
    data.txs.retain(|_, rec| rec.transfer_start.is_some());
    let incomplete = before - data.txs.len();

    let window = steady_state_window(&data.node_activity);
    let before = data.txs.len();
    match window {
        Some(w) => {
            data.txs
                .retain(|_, rec| matches!(rec.transfer_sent, Some(ts) if w.contains(ts)));
        }
        None => data.txs.clear(),
    }
    let out_of_window = before - data.txs.len();

    let trimmed = trim_ramp(data, skip_fraction);
    log::info!(
        "filtered transactions: {} incomplete, {} outside window, {} ramp-trimmed, {} remain",
        incomplete,
        out_of_window,
        trimmed,
        data.txs.len()
    );
}

/// Remove the earliest and latest `floor(k/2)` transactions by transfer-start
/// time, where `k = floor(skip_fraction * N)` over the N current survivors.
/// Ties break on tx id so the ordering is deterministic. A fraction large
/// enough to cover the whole population trims everything and nothing more.
fn trim_ramp(data: &mut AnalysisData, skip_fraction: f64) -> usize {
    let mut order: Vec<(i64, i64)> = data
        .start_order
        .iter()
        .copied()
        .filter(|(_, tx_id)| data.txs.contains_key(tx_id))
        .collect();
    order.sort();

    let n = order.len();
    let k = (skip_fraction * n as f64) as usize;
    let half = (k / 2).min(n / 2);
    if half == 0 {
        return 0;
    }

    for (_, tx_id) in order[..half].iter().chain(order[n - half..].iter()) {
        data.txs.remove(tx_id);
    }
    2 * half
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TxRecord;

    fn activity(first: i64, last: i64) -> NodeActivity {
        NodeActivity {
            first_sent: first,
            last_sent: last,
        }
    }

    fn data_with_txs(sent: &[(i64, i64, i64)]) -> AnalysisData {
        // (tx_id, start, sent)
        let mut data = AnalysisData::default();
        for &(tx_id, start, sent_ts) in sent {
            let rec = data.tx_mut(tx_id);
            rec.transfer_start = Some(start);
            rec.transfer_sent = Some(sent_ts);
            data.start_order.push((start, tx_id));
        }
        data
    }

    #[test]
    fn window_is_intersection_of_node_activity() {
        let mut nodes = HashMap::new();
        nodes.insert(1, activity(100, 900));
        nodes.insert(2, activity(200, 800));
        let w = steady_state_window(&nodes).unwrap();
        assert_eq!(w, SteadyStateWindow { first_ts: 200, last_ts: 800 });
        assert!(w.contains(200) && w.contains(800));
        assert!(!w.contains(199) && !w.contains(801));
    }

    #[test]
    fn inverted_window_drops_everything() {
        let mut data = data_with_txs(&[(1, 100, 150), (2, 600, 650)]);
        data.node_activity.insert(1, activity(100, 200));
        data.node_activity.insert(2, activity(500, 700));
        // intersection is [500, 200]: inverted, nothing can be inside
        let w = steady_state_window(&data.node_activity).unwrap();
        assert!(w.first_ts > w.last_ts);
        filter_transactions(&mut data, 0.0);
        assert!(data.txs.is_empty());
    }

    #[test]
    fn missing_transfer_start_is_dropped() {
        let mut data = data_with_txs(&[(1, 100, 150)]);
        let rec = data.tx_mut(2);
        rec.transfer_sent = Some(160);
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 0.0);
        assert!(data.txs.contains_key(&1));
        assert!(!data.txs.contains_key(&2));
    }

    #[test]
    fn missing_transfer_sent_is_dropped() {
        let mut data = AnalysisData::default();
        data.tx_mut(1).transfer_start = Some(100);
        data.start_order.push((100, 1));
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 0.0);
        assert!(data.txs.is_empty());
    }

    #[test]
    fn trim_removes_exactly_twice_half_k() {
        // N = 25, skip 0.1 -> k = 2, half = 1: earliest and latest go.
        let txs: Vec<(i64, i64, i64)> = (0..25).map(|i| (i, i * 10, i * 10 + 1)).collect();
        let mut data = data_with_txs(&txs);
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 0.1);
        assert_eq!(data.txs.len(), 23);
        assert!(!data.txs.contains_key(&0));
        assert!(!data.txs.contains_key(&24));
    }

    #[test]
    fn small_population_is_not_trimmed() {
        let txs: Vec<(i64, i64, i64)> = (0..9).map(|i| (i, i * 10, i * 10 + 1)).collect();
        let mut data = data_with_txs(&txs);
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 0.1);
        assert_eq!(data.txs.len(), 9);
    }

    #[test]
    fn oversized_skip_fraction_trims_everything_without_panicking() {
        let txs: Vec<(i64, i64, i64)> = (0..10).map(|i| (i, i * 10, i * 10 + 1)).collect();
        let mut data = data_with_txs(&txs);
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 3.0);
        assert!(data.txs.is_empty());
    }

    #[test]
    fn odd_k_trims_floor_of_half() {
        // N = 30, skip 0.1 -> k = 3, half = 1: two removed, not three.
        let txs: Vec<(i64, i64, i64)> = (0..30).map(|i| (i, i * 10, i * 10 + 1)).collect();
        let mut data = data_with_txs(&txs);
        data.node_activity.insert(1, activity(0, 1000));
        filter_transactions(&mut data, 0.1);
        assert_eq!(data.txs.len(), 28);
    }
}
