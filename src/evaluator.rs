// Role-aware metric evaluation
//
// Turns raw two-sample statistics into an annotated MetricResult by applying
// the experiment policy: the per-role significance threshold, the minimum
// effect size, and the guardrail degradation tolerance.

use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::statistics::BaseStats;

/// Role a metric plays in the ship decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricRole {
    /// The single metric whose positive, significant lift is required to ship
    Primary,
    /// A secondary metric monitored for unacceptable regression
    Guardrail,
}

impl MetricRole {
    #[must_use]
    pub fn is_primary(self) -> bool {
        matches!(self, MetricRole::Primary)
    }
}

/// Fully annotated result for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResult {
    pub metric_id: String,
    pub role: MetricRole,

    /// The underlying two-sample statistics
    pub stats: BaseStats,

    /// p-value below the role's significance threshold
    pub is_significant: bool,

    /// |relative_lift| at or above the minimum effect size
    ///
    /// Computed for every metric; the decision engine only consults it for
    /// the primary metric.
    pub meets_threshold: bool,

    /// Statistically significant move past the degradation tolerance in the
    /// metric's harmful direction. Always false for the primary metric.
    pub is_degraded: bool,
}

/// Apply the experiment policy to raw statistics
///
/// The significance threshold is `config.significance_level` for the primary
/// metric and the looser `config.guardrail_significance_level` for
/// guardrails. The harmful direction for a guardrail is given by the
/// explicit `higher_is_worse` flag, never inferred from the metric name.
#[must_use]
pub fn evaluate(
    stats: BaseStats,
    role: MetricRole,
    metric_id: &str,
    higher_is_worse: bool,
    config: &ExperimentConfig,
) -> MetricResult {
    let significance_level = if role.is_primary() {
        config.significance_level
    } else {
        config.guardrail_significance_level
    };
    let is_significant = stats.p_value < significance_level;
    let meets_threshold = stats.relative_lift.abs() >= config.min_effect_size;

    let is_degraded = match role {
        MetricRole::Primary => false,
        MetricRole::Guardrail => {
            let harmful_move = if higher_is_worse {
                stats.relative_lift > config.max_guardrail_degradation
            } else {
                stats.relative_lift < -config.max_guardrail_degradation
            };
            harmful_move && is_significant
        }
    };

    MetricResult {
        metric_id: metric_id.to_string(),
        role,
        stats,
        is_significant,
        meets_threshold,
        is_degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(p_value: f64, relative_lift: f64) -> BaseStats {
        BaseStats {
            control_mean: 10.0,
            variant_mean: 10.0 * (1.0 + relative_lift),
            control_se: 0.5,
            variant_se: 0.5,
            control_ci_lower: 9.0,
            control_ci_upper: 11.0,
            variant_ci_lower: 9.0 + relative_lift * 10.0,
            variant_ci_upper: 11.0 + relative_lift * 10.0,
            t_statistic: if relative_lift >= 0.0 { 2.0 } else { -2.0 },
            p_value,
            cohens_d: relative_lift * 5.0,
            relative_lift,
            sample_size_control: 100,
            sample_size_variant: 100,
        }
    }

    #[test]
    fn test_primary_uses_strict_threshold() {
        let config = ExperimentConfig::default();
        // p = 0.07: significant at the 0.10 guardrail level only
        let primary = evaluate(
            stats_with(0.07, 0.05),
            MetricRole::Primary,
            "session_duration",
            false,
            &config,
        );
        let guardrail = evaluate(
            stats_with(0.07, 0.05),
            MetricRole::Guardrail,
            "sessions_per_user",
            false,
            &config,
        );
        assert!(!primary.is_significant);
        assert!(guardrail.is_significant);
    }

    #[test]
    fn test_meets_threshold_uses_absolute_lift() {
        let config = ExperimentConfig::default();
        let negative = evaluate(
            stats_with(0.01, -0.05),
            MetricRole::Primary,
            "session_duration",
            false,
            &config,
        );
        let tiny = evaluate(
            stats_with(0.01, 0.01),
            MetricRole::Primary,
            "session_duration",
            false,
            &config,
        );
        assert!(negative.meets_threshold);
        assert!(!tiny.meets_threshold);
    }

    #[test]
    fn test_primary_never_degraded() {
        let config = ExperimentConfig::default();
        let result = evaluate(
            stats_with(0.001, -0.30),
            MetricRole::Primary,
            "session_duration",
            true,
            &config,
        );
        assert!(!result.is_degraded);
    }

    #[test]
    fn test_guardrail_degraded_when_higher_is_worse() {
        let config = ExperimentConfig::default();
        // Skip rate up 5%, significant: degraded
        let result = evaluate(
            stats_with(0.02, 0.05),
            MetricRole::Guardrail,
            "skip_rate",
            true,
            &config,
        );
        assert!(result.is_degraded);
    }

    #[test]
    fn test_guardrail_improvement_not_degraded_when_higher_is_worse() {
        let config = ExperimentConfig::default();
        // Skip rate down 5%: an improvement
        let result = evaluate(
            stats_with(0.02, -0.05),
            MetricRole::Guardrail,
            "skip_rate",
            true,
            &config,
        );
        assert!(!result.is_degraded);
    }

    #[test]
    fn test_guardrail_degraded_when_lower_is_worse() {
        let config = ExperimentConfig::default();
        let result = evaluate(
            stats_with(0.02, -0.05),
            MetricRole::Guardrail,
            "retention_d1",
            false,
            &config,
        );
        assert!(result.is_degraded);
    }

    #[test]
    fn test_insignificant_move_not_degraded() {
        let config = ExperimentConfig::default();
        // Large harmful move but p above the guardrail threshold
        let result = evaluate(
            stats_with(0.50, -0.05),
            MetricRole::Guardrail,
            "retention_d1",
            false,
            &config,
        );
        assert!(!result.is_degraded);
    }

    #[test]
    fn test_move_within_tolerance_not_degraded() {
        let config = ExperimentConfig::default();
        // Significant but within the 1% degradation tolerance
        let result = evaluate(
            stats_with(0.02, -0.005),
            MetricRole::Guardrail,
            "retention_d1",
            false,
            &config,
        );
        assert!(!result.is_degraded);
    }
}
