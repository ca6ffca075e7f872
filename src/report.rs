//! Experiment report assembly
//!
//! Draws per-metric samples from a `DataProvider`, runs the statistical
//! comparison and policy evaluation for each configured metric, and collects
//! the results into an ordered `ExperimentReport` (primary metric first,
//! guardrails in configured order). Construction is fail-fast: the first
//! metric failure aborts the run and no partial report is returned.

use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::error::{AnalysisError, Result};
use crate::evaluator::{self, MetricResult, MetricRole};
use crate::statistics;

/// A single observation as exposed by a data provider
///
/// Binary metrics (retention flags and the like) arrive as booleans and are
/// coerced to 0/1 during report construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Numeric(f64),
    Flag(bool),
}

impl Observation {
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Observation::Numeric(value) => value,
            Observation::Flag(true) => 1.0,
            Observation::Flag(false) => 0.0,
        }
    }
}

impl From<f64> for Observation {
    fn from(value: f64) -> Self {
        Observation::Numeric(value)
    }
}

impl From<bool> for Observation {
    fn from(value: bool) -> Self {
        Observation::Flag(value)
    }
}

/// Observations for one metric column, split by experiment variant
#[derive(Debug, Clone, Default)]
pub struct VariantSamples {
    pub control: Vec<Observation>,
    pub variant: Vec<Observation>,
}

/// Source of per-metric, per-variant samples
///
/// Implementations are read-only for the duration of a run; missing values
/// are excluded before the samples are handed over. Returns `None` when the
/// column is absent from the provider's schema.
pub trait DataProvider {
    fn metric_samples(&self, column: &str) -> Option<VariantSamples>;
}

/// Configuration for one metric in the analyzed set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Identifier used in the report and in decision reasoning
    pub metric_id: String,
    /// Source column in the provider's schema
    pub column: String,
    pub role: MetricRole,
    /// Harmful direction for guardrail degradation (explicit, never inferred
    /// from the metric name)
    #[serde(default)]
    pub higher_is_worse: bool,
}

impl MetricSpec {
    pub fn primary(metric_id: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            metric_id: metric_id.into(),
            column: column.into(),
            role: MetricRole::Primary,
            higher_is_worse: false,
        }
    }

    pub fn guardrail(
        metric_id: impl Into<String>,
        column: impl Into<String>,
        higher_is_worse: bool,
    ) -> Self {
        Self {
            metric_id: metric_id.into(),
            column: column.into(),
            role: MetricRole::Guardrail,
            higher_is_worse,
        }
    }
}

/// Evaluated metric set for one experiment run
///
/// Holds exactly one primary metric (always first) followed by guardrails in
/// configured order, plus the configuration the metrics were evaluated
/// under, so the decision layer can cite thresholds in its reasoning.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    experiment_id: String,
    config: ExperimentConfig,
    metrics: Vec<MetricResult>,
}

impl ExperimentReport {
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    #[must_use]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// All metric results, primary first
    #[must_use]
    pub fn metrics(&self) -> &[MetricResult] {
        &self.metrics
    }

    #[must_use]
    pub fn get(&self, metric_id: &str) -> Option<&MetricResult> {
        self.metrics.iter().find(|m| m.metric_id == metric_id)
    }

    /// The primary metric result (construction guarantees exactly one,
    /// stored first)
    #[must_use]
    pub fn primary(&self) -> &MetricResult {
        &self.metrics[0]
    }

    pub fn guardrails(&self) -> impl Iterator<Item = &MetricResult> + '_ {
        self.metrics.iter().filter(|m| !m.role.is_primary())
    }

    /// Ids of degraded guardrails, in report order
    #[must_use]
    pub fn degraded_guardrails(&self) -> Vec<String> {
        self.guardrails()
            .filter(|m| m.is_degraded)
            .map(|m| m.metric_id.clone())
            .collect()
    }
}

/// Build an experiment report from a provider and a metric configuration
///
/// # Errors
/// * `Configuration` - invalid thresholds, no primary metric, more than one
///   primary metric, or duplicate metric ids
/// * `Data` - a configured column is absent, or a sample is empty or too
///   small after filtering
/// * `Numeric` - a statistic is undefined for a metric's samples
pub fn build_report(
    provider: &dyn DataProvider,
    experiment_id: &str,
    specs: &[MetricSpec],
    config: &ExperimentConfig,
) -> Result<ExperimentReport> {
    config.validate()?;
    validate_specs(specs)?;

    tracing::info!(
        "building report for experiment '{}' with {} metric(s)",
        experiment_id,
        specs.len()
    );

    // Primary first, then guardrails in configured order
    let ordered = specs
        .iter()
        .filter(|s| s.role.is_primary())
        .chain(specs.iter().filter(|s| !s.role.is_primary()));

    let mut metrics = Vec::with_capacity(specs.len());
    for spec in ordered {
        let samples = provider.metric_samples(&spec.column).ok_or_else(|| {
            AnalysisError::Data {
                metric_id: spec.metric_id.clone(),
                reason: format!("column '{}' not found in provider schema", spec.column),
            }
        })?;

        let control = coerce_observations(&samples.control);
        let variant = coerce_observations(&samples.variant);
        for (side, sample) in [("control", &control), ("variant", &variant)] {
            if sample.is_empty() {
                return Err(AnalysisError::Data {
                    metric_id: spec.metric_id.clone(),
                    reason: format!("{side} sample is empty after filtering"),
                });
            }
        }

        let stats = statistics::compute(&control, &variant, config.confidence_level)
            .map_err(|e| AnalysisError::from_statistics(&spec.metric_id, e))?;
        let result = evaluator::evaluate(
            stats,
            spec.role,
            &spec.metric_id,
            spec.higher_is_worse,
            config,
        );
        tracing::debug!(
            "evaluated '{}': lift {:.4}, p-value {:.4}, significant: {}",
            result.metric_id,
            result.stats.relative_lift,
            result.stats.p_value,
            result.is_significant
        );
        metrics.push(result);
    }

    Ok(ExperimentReport {
        experiment_id: experiment_id.to_string(),
        config: config.clone(),
        metrics,
    })
}

/// Coerce provider observations to numeric samples, dropping non-finite
/// values
fn coerce_observations(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .map(|o| o.as_f64())
        .filter(|v| v.is_finite())
        .collect()
}

fn validate_specs(specs: &[MetricSpec]) -> Result<()> {
    let primary_count = specs.iter().filter(|s| s.role.is_primary()).count();
    if primary_count != 1 {
        return Err(AnalysisError::Configuration(format!(
            "metric set must name exactly one primary metric, got {primary_count}"
        )));
    }

    for (i, spec) in specs.iter().enumerate() {
        if specs[..i].iter().any(|s| s.metric_id == spec.metric_id) {
            return Err(AnalysisError::Configuration(format!(
                "duplicate metric id '{}'",
                spec.metric_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_coercion() {
        let observations = [
            Observation::Numeric(2.5),
            Observation::Flag(true),
            Observation::Flag(false),
            Observation::Numeric(f64::NAN),
        ];
        let values = coerce_observations(&observations);
        assert_eq!(values, vec![2.5, 1.0, 0.0]);
    }

    #[test]
    fn test_validate_specs_requires_one_primary() {
        let no_primary = [MetricSpec::guardrail("skip_rate", "avg_skip_rate", true)];
        assert!(validate_specs(&no_primary).is_err());

        let two_primaries = [
            MetricSpec::primary("a", "col_a"),
            MetricSpec::primary("b", "col_b"),
        ];
        assert!(validate_specs(&two_primaries).is_err());

        let ok = [
            MetricSpec::primary("a", "col_a"),
            MetricSpec::guardrail("b", "col_b", false),
        ];
        assert!(validate_specs(&ok).is_ok());
    }

    #[test]
    fn test_validate_specs_rejects_duplicate_ids() {
        let specs = [
            MetricSpec::primary("session_duration", "avg_session_duration"),
            MetricSpec::guardrail("session_duration", "avg_skip_rate", true),
        ];
        let err = validate_specs(&specs).unwrap_err();
        assert!(err.to_string().contains("duplicate metric id"));
    }

    #[test]
    fn test_metric_spec_serde_defaults_higher_is_worse() {
        let spec: MetricSpec = serde_json::from_str(
            r#"{"metric_id": "retention_d1", "column": "retention_d1", "role": "guardrail"}"#,
        )
        .expect("spec should deserialize");
        assert!(!spec.higher_is_worse);
        assert_eq!(spec.role, MetricRole::Guardrail);
    }
}
