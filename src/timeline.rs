//! Persisted-version timeline reconstruction.
//!
//! Persistence is batched, so only a sparse subset of versions is ever
//! logged with a persisted timestamp. The reconstruction ceiling-fills the
//! gaps: an unobserved version between observed versions `v1 < v2` is
//! assigned the timestamp of `v2`. Under the monotonicity invariant
//! (persisted timestamp non-decreasing in version) this is an upper bound
//! on the true persist time, never an underestimate.

use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashMap};

use crate::model::AnalysisData;

/// Complete version -> persisted-timestamp mapping for one shard, covering
/// every version in `[min observed, max observed]`. Discarded after
/// resolution.
#[derive(Debug, Default)]
pub struct ShardTimeline {
    versions: BTreeMap<i64, i64>,
}

impl ShardTimeline {
    /// Build from raw observations by sorting on version and ceiling-filling
    /// every gap between consecutive observed versions.
    fn from_observations(observed: BTreeMap<i64, i64>) -> ShardTimeline {
        let mut versions = BTreeMap::new();
        let mut prev: Option<(i64, i64)> = None;
        for (&ver, &ts) in &observed {
            if let Some((prev_ver, prev_ts)) = prev {
                if ts < prev_ts {
                    log::warn!(
                        "persisted timestamp regressed: version {} at {} after version {} at {}",
                        ver,
                        ts,
                        prev_ver,
                        prev_ts
                    );
                }
                for gap in prev_ver + 1..ver {
                    versions.insert(gap, ts);
                }
            }
            versions.insert(ver, ts);
            prev = Some((ver, ts));
        }
        ShardTimeline { versions }
    }

    /// Persisted timestamp of `version`, or `None` when the version was
    /// never reached within the observed range.
    pub fn lookup(&self, version: i64) -> Option<i64> {
        self.versions.get(&version).copied()
    }

    #[cfg(test)]
    fn min_version(&self) -> Option<i64> {
        self.versions.keys().next().copied()
    }

    #[cfg(test)]
    fn max_version(&self) -> Option<i64> {
        self.versions.keys().next_back().copied()
    }
}

/// Group per-node observations by shard and reconstruct one timeline per
/// shard. A node with observations but no shard association is fatal: the
/// observations cannot be attributed.
pub fn reconstruct_timelines(data: &AnalysisData) -> Result<HashMap<i64, ShardTimeline>> {
    let mut shard_obs: HashMap<i64, BTreeMap<i64, i64>> = HashMap::new();

    let mut nodes: Vec<i64> = data.persisted_obs.keys().copied().collect();
    nodes.sort_unstable();
    for node in nodes {
        let shard = data
            .node_shard
            .get(&node)
            .copied()
            .ok_or_else(|| anyhow!("no shard association for node {}", node))?;
        let observed = shard_obs.entry(shard).or_default();
        for &(ver, ts) in &data.persisted_obs[&node] {
            // Duplicate observations of one version keep the latest
            // timestamp; max is order-insensitive across nodes and files.
            observed
                .entry(ver)
                .and_modify(|cur| *cur = (*cur).max(ts))
                .or_insert(ts);
        }
    }

    Ok(shard_obs
        .into_iter()
        .map(|(shard, observed)| (shard, ShardTimeline::from_observations(observed)))
        .collect())
}

/// Resolve each surviving transaction's committed version to a persisted
/// timestamp. Transactions whose version never persisted within their
/// shard's observed range (or that lack a version or shard) are dropped
/// from the analyzable set rather than guessed at.
pub fn resolve_persisted_times(
    data: &mut AnalysisData,
    timelines: &HashMap<i64, ShardTimeline>,
) -> HashMap<i64, i64> {
    let mut resolved = HashMap::with_capacity(data.txs.len());
    let before = data.txs.len();
    data.txs.retain(|tx_id, rec| {
        let persisted = rec
            .committed_version
            .and_then(|ver| {
                let shard = rec.shard_id?;
                timelines.get(&shard)?.lookup(ver)
            });
        match persisted {
            Some(ts) => {
                resolved.insert(*tx_id, ts);
                true
            }
            None => false,
        }
    });
    let dropped = before - data.txs.len();
    if dropped > 0 {
        log::info!("dropped {} transactions with unresolved persisted time", dropped);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(obs: &[(i64, i64)]) -> ShardTimeline {
        ShardTimeline::from_observations(obs.iter().copied().collect())
    }

    #[test]
    fn ceiling_fill_assigns_next_observed_timestamp() {
        let tl = timeline(&[(10, 100), (20, 200), (25, 250)]);
        // observed versions keep their own timestamp
        assert_eq!(tl.lookup(10), Some(100));
        assert_eq!(tl.lookup(20), Some(200));
        // every gap version takes the next observed timestamp
        for v in 11..=19 {
            assert_eq!(tl.lookup(v), Some(200));
        }
        for v in 21..=24 {
            assert_eq!(tl.lookup(v), Some(250));
        }
    }

    #[test]
    fn reconstructed_timeline_is_monotonic() {
        let tl = timeline(&[(1, 10), (5, 50), (9, 90)]);
        let mut last = i64::MIN;
        for v in tl.min_version().unwrap()..=tl.max_version().unwrap() {
            let ts = tl.lookup(v).unwrap();
            assert!(ts >= last, "timestamp regressed at version {}", v);
            last = ts;
        }
    }

    #[test]
    fn out_of_range_versions_unresolved() {
        let tl = timeline(&[(10, 100), (20, 200)]);
        assert_eq!(tl.lookup(9), None);
        assert_eq!(tl.lookup(21), None);
    }

    #[test]
    fn missing_shard_association_is_fatal() {
        let mut data = AnalysisData::default();
        data.persisted_obs.insert(3, vec![(1, 100)]);
        assert!(reconstruct_timelines(&data).is_err());
    }

    #[test]
    fn observations_from_all_nodes_of_a_shard_merge() {
        let mut data = AnalysisData::default();
        data.node_shard.insert(1, 7);
        data.node_shard.insert(2, 7);
        data.persisted_obs.insert(1, vec![(10, 100)]);
        data.persisted_obs.insert(2, vec![(12, 120)]);
        let timelines = reconstruct_timelines(&data).unwrap();
        let tl = &timelines[&7];
        assert_eq!(tl.lookup(10), Some(100));
        assert_eq!(tl.lookup(11), Some(120));
        assert_eq!(tl.lookup(12), Some(120));
    }

    #[test]
    fn unresolved_transactions_are_dropped() {
        let mut data = AnalysisData::default();
        data.node_shard.insert(1, 0);
        data.persisted_obs.insert(1, vec![(10, 100), (20, 200)]);

        let in_range = data.tx_mut(1);
        in_range.committed_version = Some(15);
        in_range.shard_id = Some(0);
        let beyond_range = data.tx_mut(2);
        beyond_range.committed_version = Some(21);
        beyond_range.shard_id = Some(0);
        let no_version = data.tx_mut(3);
        no_version.shard_id = Some(0);

        let timelines = reconstruct_timelines(&data).unwrap();
        let resolved = resolve_persisted_times(&mut data, &timelines);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[&1], 200);
        assert!(data.txs.contains_key(&1));
        assert!(!data.txs.contains_key(&2));
        assert!(!data.txs.contains_key(&3));
    }
}
