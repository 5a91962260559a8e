//! Numeric kernel: time-value-of-money primitives, descriptive statistics,
//! and a pinned, reproducible normal RNG.
//!
//! Every function here is pure and total over its declared domain, and
//! free of IO. Formulas match canonical spreadsheet functions (FV, PV,
//! PMT) to at least two decimal places.

use crate::error::{EngineError, Result};

/// Future value: `FV = PV * (1+r)^n`.
pub fn future_value(pv: f64, rate: f64, periods: f64) -> Result<f64> {
    if pv < 0.0 {
        return Err(EngineError::validation("pv", "must be non-negative"));
    }
    if periods < 0.0 {
        return Err(EngineError::validation("periods", "must be non-negative"));
    }
    Ok(pv * (1.0 + rate).powf(periods))
}

/// Present value: the inverse of [`future_value`].
pub fn present_value(fv: f64, rate: f64, periods: f64) -> Result<f64> {
    if periods < 0.0 {
        return Err(EngineError::validation("periods", "must be non-negative"));
    }
    Ok(fv / (1.0 + rate).powf(periods))
}

/// Whether annuity payments land at the start (`Due`) or end
/// (`Ordinary`) of each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnuityTiming {
    Due,
    Ordinary,
}

/// Future value of an annuity. Falls back to `payment * periods` at a
/// zero rate, since the compounding formula has a removable singularity
/// there.
pub fn future_value_annuity(payment: f64, rate: f64, periods: f64, timing: AnnuityTiming) -> f64 {
    if rate == 0.0 {
        return payment * periods;
    }
    let ordinary = payment * (((1.0 + rate).powf(periods) - 1.0) / rate);
    match timing {
        AnnuityTiming::Due => ordinary * (1.0 + rate),
        AnnuityTiming::Ordinary => ordinary,
    }
}

/// Present value of an (ordinary) annuity. Falls back to `payment * periods`
/// at a zero rate.
pub fn present_value_annuity(payment: f64, rate: f64, periods: f64) -> f64 {
    if rate == 0.0 {
        return payment * periods;
    }
    payment * (1.0 - (1.0 + rate).powf(-periods)) / rate
}

/// The periodic payment (annuity due) required to accumulate `target` over
/// `years`, sampled `periods_per_year` times a year at annual `rate`.
pub fn required_payment(target: f64, rate: f64, years: f64, periods_per_year: f64) -> Result<f64> {
    if target <= 0.0 {
        return Err(EngineError::validation("target", "must be positive"));
    }
    if years <= 0.0 {
        return Err(EngineError::validation("years", "must be positive"));
    }
    let periods = years * periods_per_year;
    let period_rate = rate / periods_per_year;
    if period_rate == 0.0 {
        return Ok(target / periods);
    }
    // Invert future_value_annuity(payment, period_rate, periods, Due) = target.
    let growth = (1.0 + period_rate).powf(periods) - 1.0;
    Ok(target * period_rate / (growth * (1.0 + period_rate)))
}

/// Exact Fisher identity: `(1 + r_real) = (1 + r_nom) / (1 + inflation)`.
/// Subtraction-based approximations are not used.
pub fn nominal_to_real(nominal_rate: f64, inflation: f64) -> f64 {
    (1.0 + nominal_rate) / (1.0 + inflation) - 1.0
}

/// Inverse of [`nominal_to_real`].
pub fn real_to_nominal(real_rate: f64, inflation: f64) -> f64 {
    (1.0 + real_rate) * (1.0 + inflation) - 1.0
}

/// Compound annual growth rate between two values over `years`.
pub fn cagr(start: f64, end: f64, years: f64) -> Result<f64> {
    if start <= 0.0 || end <= 0.0 {
        return Err(EngineError::validation(
            "start",
            "start and end values must be positive",
        ));
    }
    if years <= 0.0 {
        return Err(EngineError::validation("years", "must be positive"));
    }
    Ok((end / start).powf(1.0 / years) - 1.0)
}

/// Arithmetic mean. Empty input returns 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median via sorted-copy + linear interpolation at the midpoint. Empty
/// input returns 0.
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0).unwrap_or(0.0)
}

/// Population standard deviation (divisor N). Empty input returns 0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between adjacent ranks.
/// `p=0` returns the minimum, `p=100` the maximum. `values` need not be
/// pre-sorted. Empty input returns `Ok(0.0)`.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(EngineError::validation("p", "must be in [0, 100]"));
    }
    if values.is_empty() {
        return Ok(0.0);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Ok(sorted[lower]);
    }
    let frac = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Pearson correlation coefficient over two equal-length vectors. Returns
/// 0 when either vector has zero variance.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// A reproducible linear-congruential generator.
///
/// The multiplier and increment are the constants from Knuth's MMIX
/// generator, operating on a 64-bit state with wrapping arithmetic —
/// exact and platform-independent, so a given seed produces an
/// identical sequence on every build. This is deliberately *not*
/// backed by the `rand` crate: pinning the recurrence itself, rather
/// than delegating to whatever algorithm `rand`'s default generator
/// happens to use, keeps a given seed's sequence stable across `rand`
/// version bumps and platforms.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    pub fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }

    /// Next raw 64-bit state.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(Self::MULTIPLIER).wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Uniform variate in the open interval (0, 1), using the top 53 bits
    /// for full `f64` mantissa precision.
    pub fn next_uniform(&mut self) -> f64 {
        let bits = self.next_u64() >> 11;
        let u = bits as f64 / (1u64 << 53) as f64;
        u.clamp(1e-12, 1.0 - 1e-12)
    }

    /// Standard normal variate via the Box-Muller transform
    /// `Z = sqrt(-2 ln u1) * cos(2*pi*u2)`.
    pub fn next_standard_normal(&mut self) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Normal variate with the given mean and volatility.
    pub fn next_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.next_standard_normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_value_matches_spreadsheet() {
        // =FV(0.07, 10, 0, -10000) = 19671.51
        let fv = future_value(10_000.0, 0.07, 10.0).unwrap();
        assert!((fv - 19_671.51).abs() < 0.01);
    }

    #[test]
    fn present_value_is_inverse_of_future_value() {
        let fv = future_value(12_345.0, 0.063, 22.0).unwrap();
        let pv = present_value(fv, 0.063, 22.0).unwrap();
        assert!((pv - 12_345.0).abs() / 12_345.0 < 1e-6);
    }

    #[test]
    fn future_value_rejects_negative_pv() {
        assert!(future_value(-1.0, 0.05, 1.0).is_err());
    }

    #[test]
    fn annuity_due_is_ordinary_times_one_plus_rate() {
        let ordinary = future_value_annuity(1_000.0, 0.05, 10.0, AnnuityTiming::Ordinary);
        let due = future_value_annuity(1_000.0, 0.05, 10.0, AnnuityTiming::Due);
        assert!((due - ordinary * 1.05).abs() < 1e-6);
    }

    #[test]
    fn annuity_zero_rate_falls_back_to_payment_times_periods() {
        assert_eq!(future_value_annuity(500.0, 0.0, 24.0, AnnuityTiming::Due), 12_000.0);
        assert_eq!(present_value_annuity(500.0, 0.0, 24.0), 12_000.0);
    }

    #[test]
    fn required_payment_round_trips_through_future_value_annuity() {
        let target = 1_000_000.0;
        let rate = 0.08;
        let years = 20.0;
        let monthly = required_payment(target, rate, years, 12.0).unwrap();
        let accumulated =
            future_value_annuity(monthly, rate / 12.0, years * 12.0, AnnuityTiming::Due);
        assert!((accumulated - target).abs() / target < 1e-3);
    }

    #[test]
    fn fisher_identity_round_trips() {
        let nominal = 0.08;
        let inflation = 0.035;
        let real = nominal_to_real(nominal, inflation);
        let back = real_to_nominal(real, inflation);
        assert!((back - nominal).abs() < 1e-10);
    }

    #[test]
    fn cagr_matches_known_example() {
        // 10,000 -> 20,000 over 10 years ~= 7.177%
        let rate = cagr(10_000.0, 20_000.0, 10.0).unwrap();
        assert!((rate - 0.071_773).abs() < 1e-4);
    }

    #[test]
    fn stats_on_empty_input_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn percentile_endpoints_are_min_and_max() {
        let values = [5.0, 1.0, 9.0, 3.0];
        assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&values, 100.0).unwrap(), 9.0);
    }

    #[test]
    fn percentile_rejects_out_of_range() {
        assert!(percentile(&[1.0, 2.0], 101.0).is_err());
    }

    #[test]
    fn pearson_correlation_is_zero_for_constant_series() {
        assert_eq!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn pearson_correlation_of_perfectly_linear_series_is_one() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson_correlation(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lcg_is_deterministic_for_a_fixed_seed() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        let seq_a: Vec<f64> = (0..10).map(|_| a.next_standard_normal()).collect();
        let seq_b: Vec<f64> = (0..10).map(|_| b.next_standard_normal()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn lcg_differs_across_seeds() {
        let mut a = Lcg::new(1);
        let mut b = Lcg::new(2);
        assert_ne!(a.next_standard_normal(), b.next_standard_normal());
    }
}
