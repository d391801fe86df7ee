//! Statistics over inhibition zone diameters
//!
//! # Welch t-test
//!
//! Two antibiotics are compared without assuming equal variances:
//!
//! t = (mean_a - mean_b) / sqrt(var_a / n_a + var_b / n_b)
//!
//! Degrees of freedom follow Welch-Satterthwaite equation and are generally
//! non-integer. Two-tailed p-value for Student distribution with `df` degrees
//! of freedom is the regularized incomplete beta function
//! I_x(df / 2, 1 / 2) at x = df / (df + t^2).

use probability::distribution::{Beta, Distribution};
use serde::Serialize;

/// Minimal number of measurements in each group for the t-test
pub const MIN_GROUP_SIZE: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,

    pub mean: f64,

    /// Standard deviation of the measured set itself (N in denominator)
    pub population_std: f64,

    /// Estimate of the standard deviation of the population the measurements
    /// are drawn from (N - 1 in denominator). Undefined for single
    /// measurement.
    pub sample_std: Option<f64>,
}

/// Mean and standard deviations; `None` if there is no data or some value
/// is not finite.
///
/// Sample standard deviation is also `None` if it exceeds `f64` range, which
/// could only happen for diameters close to `f64::MAX`.
pub fn descriptive_stats(diameters: &[f64]) -> Option<DescriptiveStats> {
    if diameters.is_empty() {
        return None;
    }
    let scale = scale_for(&[diameters])?;
    let scaled = scaled_set(diameters, scale);

    let count = diameters.len();
    let n = count as f64;
    let mean = scaled.iter().sum::<f64>() / n;
    let sum_deviation_squares = sum_deviation_squares(&scaled, mean);

    let sample_std = if count > 1 {
        Some(scale * (sum_deviation_squares / (n - 1.0)).sqrt()).filter(|std| std.is_finite())
    } else {
        None
    };

    Some(DescriptiveStats {
        count,
        mean: scale * mean,
        population_std: scale * (sum_deviation_squares / n).sqrt(),
        sample_std,
    })
}

fn sum_deviation_squares(set: &[f64], mean: f64) -> f64 {
    set.iter().map(|value| (value - mean).powi(2)).sum()
}

/// Power of two, at least 1, that brings the largest magnitude in sets
/// below 2. Division by it is exact. `None` if some value is not finite.
fn scale_for(sets: &[&[f64]]) -> Option<f64> {
    let mut largest = 0f64;
    for value in sets.iter().flat_map(|set| set.iter()) {
        if !value.is_finite() {
            return None;
        }
        largest = largest.max(value.abs());
    }
    if largest < 2.0 {
        Some(1.0)
    } else {
        let exponent = (largest.log2().floor() as i32).min(f64::MAX_EXP - 1);
        Some(2f64.powi(exponent))
    }
}

fn scaled_set(set: &[f64], scale: f64) -> Vec<f64> {
    set.iter().map(|value| value / scale).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WelchTest {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

/// Welch t-test; `None` unless both groups have at least two finite
/// measurements.
///
/// If both groups have zero variance, `t` is infinite with zero p-value when
/// the means differ, and zero with p-value 1 when the means coincide.
pub fn compare(diameters_a: &[f64], diameters_b: &[f64]) -> Option<WelchTest> {
    if diameters_a.len() < MIN_GROUP_SIZE || diameters_b.len() < MIN_GROUP_SIZE {
        return None;
    }
    // t and degrees of freedom do not depend on common scale
    let scale = scale_for(&[diameters_a, diameters_b])?;
    let scaled_a = scaled_set(diameters_a, scale);
    let scaled_b = scaled_set(diameters_b, scale);

    let n_a = scaled_a.len() as f64;
    let n_b = scaled_b.len() as f64;

    let mean_a = scaled_a.iter().sum::<f64>() / n_a;
    let mean_b = scaled_b.iter().sum::<f64>() / n_b;

    // variance of the mean, for each group
    let var_mean_a = sum_deviation_squares(&scaled_a, mean_a) / (n_a - 1.0) / n_a;
    let var_mean_b = sum_deviation_squares(&scaled_b, mean_b) / (n_b - 1.0) / n_b;

    let standard_error_squared = var_mean_a + var_mean_b;
    let difference = mean_a - mean_b;

    if standard_error_squared == 0.0 {
        let degrees_of_freedom = n_a + n_b - 2.0;
        return if difference == 0.0 {
            Some(WelchTest {
                t_statistic: 0.0,
                p_value: 1.0,
                degrees_of_freedom,
            })
        } else {
            Some(WelchTest {
                t_statistic: f64::INFINITY.copysign(difference),
                p_value: 0.0,
                degrees_of_freedom,
            })
        };
    }

    let t_statistic = difference / standard_error_squared.sqrt();

    // Welch-Satterthwaite, variances relative to the larger one
    let largest = var_mean_a.max(var_mean_b);
    let ratio_a = var_mean_a / largest;
    let ratio_b = var_mean_b / largest;
    let degrees_of_freedom = (ratio_a + ratio_b).powi(2)
        / (ratio_a.powi(2) / (n_a - 1.0) + ratio_b.powi(2) / (n_b - 1.0));

    Some(WelchTest {
        t_statistic,
        p_value: student_two_tailed_p_value(t_statistic, degrees_of_freedom),
        degrees_of_freedom,
    })
}

/// Probability for Student-distributed value to be further from zero than
/// `t`. Degrees of freedom must be positive and finite.
fn student_two_tailed_p_value(t: f64, degrees_of_freedom: f64) -> f64 {
    let t_squared = t.powi(2);
    if t_squared.is_infinite() {
        return 0.0;
    }
    let x = degrees_of_freedom / (degrees_of_freedom + t_squared);
    Beta::new(0.5 * degrees_of_freedom, 0.5, 0.0, 1.0)
        .distribution(x)
        .clamp(0.0, 1.0)
}
