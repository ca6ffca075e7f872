// Configuration for experiment evaluation
//
// Thresholds are an explicit structure passed into each component, never
// module-level constants: one process can evaluate several experiments with
// different policies at the same time.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Statistical thresholds for a single experiment evaluation
///
/// # Example
/// ```
/// use veredicto::config::ExperimentConfig;
///
/// let config = ExperimentConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// P-value threshold for the primary metric
    ///
    /// - 0.05 (default): 95% confidence level
    /// - 0.01: stricter (fewer false positives, more false negatives)
    pub significance_level: f64,

    /// P-value threshold for guardrail metrics
    ///
    /// Looser than the primary threshold (default 0.10): a guardrail
    /// regression should be flagged earlier than a win is declared.
    pub guardrail_significance_level: f64,

    /// Minimum relative lift for the primary metric to count as a win
    ///
    /// Expressed as a fraction (0.02 = 2% lift). Lifts below this are not
    /// worth shipping even when statistically significant.
    pub min_effect_size: f64,

    /// Maximum tolerated relative regression for a guardrail metric
    ///
    /// Expressed as a fraction (0.01 = 1%). A guardrail is degraded when it
    /// moves past this tolerance in its harmful direction AND the move is
    /// statistically significant.
    pub max_guardrail_degradation: f64,

    /// Probability mass captured by each reported confidence interval
    pub confidence_level: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            guardrail_significance_level: 0.10,
            min_effect_size: 0.02,
            max_guardrail_degradation: 0.01,
            confidence_level: 0.95,
        }
    }
}

impl ExperimentConfig {
    /// Validate threshold ranges
    ///
    /// Probability levels must lie strictly inside (0, 1); effect-size and
    /// degradation tolerances must lie in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("significance_level", self.significance_level),
            (
                "guardrail_significance_level",
                self.guardrail_significance_level,
            ),
            ("confidence_level", self.confidence_level),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(AnalysisError::Configuration(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
        }

        for (name, value) in [
            ("min_effect_size", self.min_effect_size),
            ("max_guardrail_degradation", self.max_guardrail_degradation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::Configuration(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}
