use thiserror::Error;

/// Static configuration rejected at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },
    #[error("weight `{name}` must be finite and non-negative, got {weight}")]
    InvalidWeight { name: &'static str, weight: f64 },
    #[error("quality thresholds inverted or out of range: medium={medium}, high={high}")]
    InvertedThresholds { medium: f64, high: f64 },
    #[error("prefilter salary tolerance must be within 0..=1, got {0}")]
    SalaryTolerance(f64),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("match store unavailable: {0}")]
    Unavailable(String),
    #[error("match store rejected result: {0}")]
    Rejected(String),
}

/// Failure of a single (candidate, vacancy) pair. Never aborts sibling pairs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("{side} record has no id; cannot persist match")]
    MissingId { side: &'static str },
    #[error("failed to persist match: {0}")]
    Store(#[from] StoreError),
    #[error("match computation panicked: {0}")]
    Panicked(String),
    #[error("batch cancelled before this pair was scored")]
    Cancelled,
}

/// Batch-wide setup failure; no pair has been scored.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
