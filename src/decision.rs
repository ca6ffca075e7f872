// Ship decision engine
//
// A pure state machine over a completed ExperimentReport: a fixed-priority
// list of mutually exclusive paths over the primary metric result and the
// set of degraded guardrails, first match wins. Identical reports always
// yield identical decisions, including the order of reasoning strings.

use serde::{Deserialize, Serialize};

use crate::report::ExperimentReport;

/// Ship recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "SHIP")]
    Ship,
    #[serde(rename = "DON'T SHIP")]
    NoShip,
}

/// How strongly the evidence supports the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
}

/// Decision derived from one completed report
///
/// Owns no state across runs; reasoning strings are generated
/// deterministically from the primary result and the degraded-guardrail set.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub reasoning: Vec<String>,
    pub primary_metric_lift: f64,
    pub primary_metric_p_value: f64,
    pub degraded_guardrails: Vec<String>,
}

/// Derive the ship decision from an evaluated report
///
/// Paths, in priority order:
/// 1. Primary significant, meets threshold, positive lift, no guardrail
///    degraded: Ship with high confidence.
/// 2. Same primary evidence but at least one guardrail degraded: no ship,
///    medium confidence, reasoning enumerates the degraded guardrails.
/// 3. Primary significant with negative lift: no ship, high confidence.
/// 4. Everything else (not significant, or lift below threshold): no ship,
///    medium confidence.
#[must_use]
pub fn decide(report: &ExperimentReport) -> Decision {
    let primary = report.primary();
    let lift = primary.stats.relative_lift;
    let p_value = primary.stats.p_value;
    let degraded_guardrails = report.degraded_guardrails();

    let primary_success = primary.is_significant && primary.meets_threshold && lift > 0.0;

    let (verdict, confidence, reasoning) = if primary_success && degraded_guardrails.is_empty() {
        (
            Verdict::Ship,
            Confidence::High,
            vec![
                format!(
                    "Primary metric ({}) shows significant positive lift of {:.2}%",
                    primary.metric_id,
                    lift * 100.0
                ),
                format!(
                    "Statistical significance achieved (p = {})",
                    format_p_value(p_value)
                ),
                format!(
                    "Effect size is {} (Cohen's d = {:.3})",
                    interpret_effect_size(primary.stats.cohens_d),
                    primary.stats.cohens_d
                ),
                "No guardrail metrics degraded".to_string(),
            ],
        )
    } else if primary_success {
        (
            Verdict::NoShip,
            Confidence::Medium,
            vec![
                format!("Primary metric shows positive lift of {:.2}%", lift * 100.0),
                format!(
                    "BUT guardrail metric(s) degraded: {}",
                    degraded_guardrails.join(", ")
                ),
                "Risk of harming user experience outweighs primary metric gains".to_string(),
            ],
        )
    } else if primary.is_significant && lift < 0.0 {
        (
            Verdict::NoShip,
            Confidence::High,
            vec![
                format!("Primary metric shows NEGATIVE lift of {:.2}%", lift * 100.0),
                "Variant is worse than control".to_string(),
            ],
        )
    } else {
        let mut reasoning = vec![
            format!(
                "Primary metric lift ({:.2}%) is not statistically significant",
                lift * 100.0
            ),
            format!(
                "p-value = {} (threshold: {})",
                format_p_value(p_value),
                report.config().significance_level
            ),
            "Insufficient evidence to conclude variant is better".to_string(),
        ];
        if !primary.meets_threshold {
            reasoning.push(format!(
                "Lift does not meet minimum threshold of {:.2}%",
                report.config().min_effect_size * 100.0
            ));
        }
        (Verdict::NoShip, Confidence::Medium, reasoning)
    };

    tracing::info!(
        "experiment '{}': {:?} ({:?} confidence)",
        report.experiment_id(),
        verdict,
        confidence
    );

    Decision {
        verdict,
        confidence,
        reasoning,
        primary_metric_lift: lift,
        primary_metric_p_value: p_value,
        degraded_guardrails,
    }
}

/// Format a p-value for display: floored below 0.001, else three decimals
#[must_use]
pub fn format_p_value(p_value: f64) -> String {
    if p_value < 0.001 {
        "< 0.001".to_string()
    } else {
        format!("{p_value:.3}")
    }
}

/// Interpret Cohen's d magnitude using the conventional bands
#[must_use]
pub fn interpret_effect_size(cohens_d: f64) -> &'static str {
    let abs_d = cohens_d.abs();
    if abs_d < 0.2 {
        "negligible"
    } else if abs_d < 0.5 {
        "small"
    } else if abs_d < 0.8 {
        "medium"
    } else {
        "large"
    }
}
