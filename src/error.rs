//! Error taxonomy for experiment analysis
//!
//! Three failure categories, all surfaced immediately to the caller:
//! configuration problems (bad thresholds, bad metric roles), data problems
//! (missing columns, samples too small to estimate variance), and numeric
//! problems (degenerate or non-finite statistics). Computation is
//! deterministic, so none of these are retried.

use thiserror::Error;

use crate::statistics::StatisticsError;

/// Errors surfaced by report construction and evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid experiment or metric configuration
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Source data cannot support the analysis
    #[error("data error for metric '{metric_id}': {reason}")]
    Data { metric_id: String, reason: String },

    /// A statistic is undefined for the given samples
    #[error("numeric error for metric '{metric_id}': {reason}")]
    Numeric { metric_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Attach the offending metric id to a statistics-layer error
    pub(crate) fn from_statistics(metric_id: &str, err: StatisticsError) -> Self {
        match err {
            StatisticsError::InsufficientSamples { .. } => AnalysisError::Data {
                metric_id: metric_id.to_string(),
                reason: err.to_string(),
            },
            StatisticsError::LevelOutOfRange(_) => AnalysisError::Configuration(err.to_string()),
            StatisticsError::DegenerateVariance | StatisticsError::NonFiniteStatistic => {
                AnalysisError::Numeric {
                    metric_id: metric_id.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
