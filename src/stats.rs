use crate::quantile::{QuantileAgg, QuantileImpl};

/// Descriptive statistics over one sample list, uniform across every
/// latency and batching metric.
#[derive(Debug, Clone)]
pub struct Summary {
    pub avg: f64,
    pub std: f64,
    pub med: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    pub cnt: usize,
}

impl Summary {
    /// An empty sample list reports zeros, not an error.
    pub fn zero() -> Summary {
        Summary {
            avg: 0.0,
            std: 0.0,
            med: 0.0,
            min: 0.0,
            max: 0.0,
            p95: 0.0,
            p99: 0.0,
            cnt: 0,
        }
    }
}

pub fn summarize(values: &[f64], impl_kind: QuantileImpl) -> Summary {
    if values.is_empty() {
        return Summary::zero();
    }
    let mut agg = QuantileAgg::new(impl_kind);
    for &x in values {
        agg.insert(x);
    }
    Summary {
        avg: agg.mean(),
        std: agg.std_dev(),
        med: agg.quantile(0.5),
        min: agg.min(),
        max: agg.max(),
        p95: agg.quantile(0.95),
        p99: agg.quantile(0.99),
        cnt: agg.count(),
    }
}
