// Two-sample statistics for experiment metric comparison
//
// Pooled-variance (Student's) two-tailed t-test between control and variant,
// per-group t confidence intervals, Cohen's d effect size, and relative lift.
//
// Scientific Foundation:
// - Student's t-test assumes equal population variances; the pooled estimator
//   sqrt(((n_c-1)var_c + (n_v-1)var_v) / (n_c+n_v-2)) uses sample (ddof=1)
//   variances.
// - Cohen (1988): standardized mean difference d = (mean_v - mean_c) / s_p,
//   an effect size independent of sample size.
// - Distribution functions (t CDF and quantiles, normal quantiles) come from
//   statrs.
//
// Sign convention: variant minus control is positive. A positive t-statistic
// or lift means the variant is larger.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use thiserror::Error;

/// Minimum observations per sample: variance is undefined below this
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Errors for two-sample statistical computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticsError {
    #[error("need at least {required} observations per sample to estimate variance, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("probability level {0} is outside (0, 1)")]
    LevelOutOfRange(f64),

    #[error("pooled standard deviation is zero or non-finite")]
    DegenerateVariance,

    #[error("t-statistic or p-value is undefined for the given samples")]
    NonFiniteStatistic,
}

/// Descriptive and inferential statistics for one control/variant pair
///
/// All fields are fully determined by the two input samples and the
/// confidence level; identical inputs always produce identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStats {
    pub control_mean: f64,
    pub variant_mean: f64,

    /// Standard error of each group mean (sample std dev / sqrt(n))
    pub control_se: f64,
    pub variant_se: f64,

    /// Student's t interval around each group mean, df = n - 1
    pub control_ci_lower: f64,
    pub control_ci_upper: f64,
    pub variant_ci_lower: f64,
    pub variant_ci_upper: f64,

    /// Pooled-variance two-sample t-statistic (variant minus control)
    pub t_statistic: f64,

    /// Two-tailed p-value
    pub p_value: f64,

    /// Cohen's d standardized mean difference
    pub cohens_d: f64,

    /// (variant_mean - control_mean) / control_mean
    ///
    /// Defined as exactly 0 when control_mean == 0. Not a true ratio in that
    /// case, but downstream consumers rely on a finite value.
    pub relative_lift: f64,

    pub sample_size_control: usize,
    pub sample_size_variant: usize,
}

/// Compare a control and a variant sample
///
/// # Arguments
/// * `control` - observations for the control group, missing values removed
/// * `variant` - observations for the variant group, missing values removed
/// * `confidence_level` - probability mass for the per-group intervals
///
/// # Errors
/// * `InsufficientSamples` - either sample has fewer than 2 observations
/// * `DegenerateVariance` - all observations identical across both groups
/// * `NonFiniteStatistic` - the test statistic or p-value is undefined
///
/// # Example
/// ```
/// use veredicto::statistics::compute;
///
/// let control = [10.0, 12.0, 11.0, 13.0, 12.0];
/// let variant = [14.0, 15.0, 13.0, 16.0, 15.0];
///
/// let stats = compute(&control, &variant, 0.95).unwrap();
/// assert!(stats.p_value < 0.05);
/// assert!(stats.relative_lift > 0.0);
/// ```
pub fn compute(
    control: &[f64],
    variant: &[f64],
    confidence_level: f64,
) -> Result<BaseStats, StatisticsError> {
    for sample in [control, variant] {
        if sample.len() < MIN_SAMPLE_SIZE {
            return Err(StatisticsError::InsufficientSamples {
                required: MIN_SAMPLE_SIZE,
                actual: sample.len(),
            });
        }
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatisticsError::LevelOutOfRange(confidence_level));
    }

    let n_c = control.len() as f64;
    let n_v = variant.len() as f64;

    let control_mean = mean(control);
    let variant_mean = mean(variant);
    let var_c = sample_variance(control, control_mean);
    let var_v = sample_variance(variant, variant_mean);

    let pooled_std = (((n_c - 1.0) * var_c + (n_v - 1.0) * var_v) / (n_c + n_v - 2.0)).sqrt();
    if pooled_std == 0.0 || !pooled_std.is_finite() {
        return Err(StatisticsError::DegenerateVariance);
    }

    let t_statistic = (variant_mean - control_mean) / (pooled_std * (1.0 / n_c + 1.0 / n_v).sqrt());
    let df = n_c + n_v - 2.0;
    let t_dist =
        StudentsT::new(0.0, 1.0, df).map_err(|_| StatisticsError::NonFiniteStatistic)?;
    let p_value = (2.0 * (1.0 - t_dist.cdf(t_statistic.abs()))).clamp(0.0, 1.0);

    if !t_statistic.is_finite() || !p_value.is_finite() {
        return Err(StatisticsError::NonFiniteStatistic);
    }

    let control_se = (var_c / n_c).sqrt();
    let variant_se = (var_v / n_v).sqrt();
    let (control_ci_lower, control_ci_upper) =
        t_interval(control_mean, control_se, control.len(), confidence_level)?;
    let (variant_ci_lower, variant_ci_upper) =
        t_interval(variant_mean, variant_se, variant.len(), confidence_level)?;

    let cohens_d = (variant_mean - control_mean) / pooled_std;
    let relative_lift = if control_mean == 0.0 {
        0.0
    } else {
        (variant_mean - control_mean) / control_mean
    };

    Ok(BaseStats {
        control_mean,
        variant_mean,
        control_se,
        variant_se,
        control_ci_lower,
        control_ci_upper,
        variant_ci_lower,
        variant_ci_upper,
        t_statistic,
        p_value,
        cohens_d,
        relative_lift,
        sample_size_control: control.len(),
        sample_size_variant: variant.len(),
    })
}

/// Minimum detectable relative effect for an experiment sizing check
///
/// `(z_{1-alpha/2} + z_power) * std * sqrt(2 / n) / mean`, the smallest
/// relative lift a two-sample test of size `n` per arm can reliably detect.
/// Returns 0 when the baseline mean is 0 (relative effect undefined).
pub fn minimum_detectable_effect(
    baseline_mean: f64,
    baseline_std: f64,
    sample_size: usize,
    alpha: f64,
    power: f64,
) -> Result<f64, StatisticsError> {
    for level in [alpha, power] {
        if !(level > 0.0 && level < 1.0) {
            return Err(StatisticsError::LevelOutOfRange(level));
        }
    }

    let normal = Normal::new(0.0, 1.0).map_err(|_| StatisticsError::NonFiniteStatistic)?;
    let z_alpha = normal.inverse_cdf(1.0 - alpha / 2.0);
    let z_beta = normal.inverse_cdf(power);

    let mde_absolute = (z_alpha + z_beta) * baseline_std * (2.0 / sample_size as f64).sqrt();
    if baseline_mean == 0.0 {
        Ok(0.0)
    } else {
        Ok(mde_absolute / baseline_mean)
    }
}

fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample variance with ddof = 1
fn sample_variance(sample: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = sample.iter().map(|x| (x - mean).powi(2)).sum();
    sum_sq / (sample.len() - 1) as f64
}

/// Student's t interval around a group mean, df = n - 1
fn t_interval(
    mean: f64,
    se: f64,
    n: usize,
    confidence_level: f64,
) -> Result<(f64, f64), StatisticsError> {
    let t_dist = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map_err(|_| StatisticsError::NonFiniteStatistic)?;
    let alpha = 1.0 - confidence_level;
    let t_crit = t_dist.inverse_cdf(1.0 - alpha / 2.0);
    let half_width = t_crit * se;
    Ok((mean - half_width, mean + half_width))
}
