//! JSON report document for downstream presentation
//!
//! The field names and value conventions here are a compatibility contract
//! with the dashboard collaborator and must be preserved exactly. Metrics
//! are keyed by metric id in report order (primary first), which relies on
//! serde_json's `preserve_order` feature.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decision::{Confidence, Decision, Verdict};
use crate::evaluator::MetricResult;
use crate::report::ExperimentReport;

/// Serialized form of one metric result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonMetricResult {
    pub control_mean: f64,
    pub variant_mean: f64,
    pub control_se: f64,
    pub variant_se: f64,
    pub control_ci_lower: f64,
    pub control_ci_upper: f64,
    pub variant_ci_lower: f64,
    pub variant_ci_upper: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub cohens_d: f64,
    pub relative_lift: f64,
    pub sample_size_control: usize,
    pub sample_size_variant: usize,
    pub is_primary: bool,
    pub is_significant: bool,
    pub meets_threshold: bool,
    pub is_degraded: bool,
}

impl From<&MetricResult> for JsonMetricResult {
    fn from(result: &MetricResult) -> Self {
        Self {
            control_mean: result.stats.control_mean,
            variant_mean: result.stats.variant_mean,
            control_se: result.stats.control_se,
            variant_se: result.stats.variant_se,
            control_ci_lower: result.stats.control_ci_lower,
            control_ci_upper: result.stats.control_ci_upper,
            variant_ci_lower: result.stats.variant_ci_lower,
            variant_ci_upper: result.stats.variant_ci_upper,
            t_statistic: result.stats.t_statistic,
            p_value: result.stats.p_value,
            cohens_d: result.stats.cohens_d,
            relative_lift: result.stats.relative_lift,
            sample_size_control: result.stats.sample_size_control,
            sample_size_variant: result.stats.sample_size_variant,
            is_primary: result.role.is_primary(),
            is_significant: result.is_significant,
            meets_threshold: result.meets_threshold,
            is_degraded: result.is_degraded,
        }
    }
}

/// Serialized form of the ship decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDecision {
    pub decision: Verdict,
    pub confidence: Confidence,
    pub reasoning: Vec<String>,
    pub primary_metric_lift: f64,
    pub primary_metric_pvalue: f64,
    pub degraded_guardrails: Vec<String>,
}

impl From<&Decision> for JsonDecision {
    fn from(decision: &Decision) -> Self {
        Self {
            decision: decision.verdict,
            confidence: decision.confidence,
            reasoning: decision.reasoning.clone(),
            primary_metric_lift: decision.primary_metric_lift,
            primary_metric_pvalue: decision.primary_metric_p_value,
            degraded_guardrails: decision.degraded_guardrails.clone(),
        }
    }
}

/// Root report document consumed by the result sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub experiment_id: String,
    /// Metric results keyed by metric id, primary first
    pub metrics: Map<String, Value>,
    pub decision: JsonDecision,
}

impl ReportDocument {
    /// Assemble the document from an evaluated report and its decision
    pub fn from_report(report: &ExperimentReport, decision: &Decision) -> anyhow::Result<Self> {
        let mut metrics = Map::new();
        for result in report.metrics() {
            let value = serde_json::to_value(JsonMetricResult::from(result))?;
            metrics.insert(result.metric_id.clone(), value);
        }

        Ok(Self {
            experiment_id: report.experiment_id().to_string(),
            metrics,
            decision: JsonDecision::from(decision),
        })
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
