use std::cmp::Ordering;
use tdigests::TDigest;

/// Quantile backend: exact sorted-select, or t-digest estimate when sample
/// counts are large enough that exactness stops mattering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantileImpl {
    Brute,
    TDigest,
}

fn exact_quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let idx = ((sorted.len() - 1) as f64 * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Streaming accumulator for one sample list: count, mean, population
/// standard deviation, extrema, and quantiles via the selected backend.
#[derive(Debug)]
pub struct QuantileAgg {
    count: usize,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
    impl_kind: QuantileImpl,
    values: Vec<f64>,
    digest: Option<TDigest>,
}

impl QuantileAgg {
    pub fn new(impl_kind: QuantileImpl) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            impl_kind,
            values: Vec::new(),
            digest: None,
        }
    }

    pub fn insert(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        match self.impl_kind {
            QuantileImpl::Brute => self.values.push(x),
            QuantileImpl::TDigest => {
                let incoming = TDigest::from_values(vec![x]);
                let mut merged = match self.digest.take() {
                    Some(existing) => existing.merge(&incoming),
                    None => incoming,
                };
                if self.count % 1024 == 0 {
                    merged.compress(200);
                }
                self.digest = Some(merged);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            _ => self.sum / (self.count as f64),
        }
    }

    /// Population standard deviation (matches numpy's default ddof = 0).
    pub fn std_dev(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            _ => {
                let mean = self.sum / (self.count as f64);
                (self.sum_sq / (self.count as f64) - mean * mean).max(0.0).sqrt()
            }
        }
    }

    pub fn quantile(&self, q: f64) -> f64 {
        match self.impl_kind {
            QuantileImpl::Brute => exact_quantile(&self.values, q),
            QuantileImpl::TDigest => self
                .digest
                .as_ref()
                .map(|d| d.estimate_quantile(q))
                .unwrap_or(f64::NAN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_quantiles_select_by_nearest_rank() {
        let mut agg = QuantileAgg::new(QuantileImpl::Brute);
        for x in [5.0, 1.0, 3.0, 2.0, 4.0] {
            agg.insert(x);
        }
        assert_eq!(agg.quantile(0.5), 3.0);
        assert_eq!(agg.quantile(0.0), 1.0);
        assert_eq!(agg.quantile(1.0), 5.0);
        assert_eq!(agg.min(), 1.0);
        assert_eq!(agg.max(), 5.0);
        assert_eq!(agg.count(), 5);
        assert!((agg.mean() - 3.0).abs() < 1e-12);
        // population std of 1..5 is sqrt(2)
        assert!((agg.std_dev() - 2.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn empty_aggregate_yields_nan() {
        let agg = QuantileAgg::new(QuantileImpl::Brute);
        assert!(agg.mean().is_nan());
        assert!(agg.std_dev().is_nan());
        assert!(agg.quantile(0.5).is_nan());
    }

    #[test]
    fn nan_samples_are_ignored() {
        let mut agg = QuantileAgg::new(QuantileImpl::Brute);
        agg.insert(f64::NAN);
        agg.insert(2.0);
        assert_eq!(agg.count(), 1);
        assert_eq!(agg.quantile(0.5), 2.0);
    }

    #[test]
    fn tdigest_estimates_are_close_on_uniform_data() {
        let mut agg = QuantileAgg::new(QuantileImpl::TDigest);
        for i in 0..1000 {
            agg.insert(i as f64);
        }
        let p50 = agg.quantile(0.5);
        assert!((p50 - 500.0).abs() < 25.0, "p50 estimate too far: {}", p50);
    }
}
