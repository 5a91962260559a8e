//! Monte Carlo Simulator: N independent stochastic paths aggregated into
//! percentile bands and a shortfall-risk summary.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::assumptions::Assumptions;
use crate::error::{EngineError, Result};
use crate::numeric::{self, Lcg};
use crate::projector::{ProjectionInputs, ProjectionResult, SuccessMetric};
use crate::timeline::{self, TimelineOutcome};

/// Only `Annual` is implemented today; `Monthly` is reserved for
/// a future sub-annual stepping scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStep {
    Annual,
    Monthly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub num_simulations: usize,
    pub seed: u64,
    pub time_step: TimeStep,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            num_simulations: 1_000,
            seed: 42,
            time_step: TimeStep::Annual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalDistribution {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortfallRisk {
    pub probability: f64,
    pub average_shortfall: f64,
    pub worst_case: f64,
}

/// The full timeline of the single simulated path whose terminal value
/// sits at each percentile, not an element-wise aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentilePaths {
    pub p10: ProjectionResult,
    pub p25: ProjectionResult,
    pub p50: ProjectionResult,
    pub p75: ProjectionResult,
    pub p90: ProjectionResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub success_probability: f64,
    pub median_outcome: f64,
    pub percentile_paths: PercentilePaths,
    pub distribution: TerminalDistribution,
    pub shortfall_risk: ShortfallRisk,
}

/// Simulates one path with independently-sampled per-asset annual
/// returns — correlation is deliberately not applied (reserved for a
/// future Cholesky-based sampler; see `DESIGN.md` on per-path
/// independence vs correlation).
fn simulate_path(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
    seed: u64,
) -> TimelineOutcome {
    let mut rng = Lcg::new(seed);
    // Asset draws are regenerated from `rng` every call to the return
    // closure, in allocation-sorted order, so floating-point
    // accumulation order — and therefore the result — never depends on
    // map iteration order or thread scheduling.
    timeline::run(inputs, assumptions, |_year| {
        inputs
            .asset_allocation
            .iter()
            .map(|(&asset, &weight)| {
                let params = assumptions.asset(asset).expect("validated allocation");
                let sampled = rng.next_normal(
                    params.nominal.mean_fraction(),
                    params.nominal.volatility_fraction(),
                );
                (weight / 100.0) * sampled
            })
            .sum()
    })
}

fn terminal_value(outcome: &TimelineOutcome) -> f64 {
    outcome.timeline.last().map(|y| y.portfolio_value).unwrap_or(0.0)
}

fn to_projection_result(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
    outcome: TimelineOutcome,
) -> ProjectionResult {
    let inflation = assumptions.inflation.mean_fraction();
    let retirement_year = outcome.timeline.iter().find(|y| y.age == inputs.retirement_age);
    let projected_corpus_at_retirement = retirement_year.map(|y| y.portfolio_value).unwrap_or(0.0);
    // Discount at the assumption-implied expected return, the same basis
    // the deterministic projector uses, so `retirement_corpus_needed` is
    // one fixed planning target every path is judged against rather than
    // a path-specific figure that would make paths incomparable.
    let real_return =
        numeric::nominal_to_real(inputs.expected_nominal_return(assumptions), inflation);

    let retirement_year_expenses = retirement_year.map(|y| y.expenses).unwrap_or(0.0);
    let retirement_years_in_retirement = (inputs.life_expectancy - inputs.retirement_age) as f64;
    let retirement_corpus_needed = if real_return == 0.0 {
        retirement_year_expenses * retirement_years_in_retirement
    } else {
        crate::numeric::present_value_annuity(
            retirement_year_expenses,
            real_return,
            retirement_years_in_retirement,
        )
    };

    let final_portfolio_value = outcome.timeline.last().map(|y| y.portfolio_value).unwrap_or(0.0);
    let success_metric = if outcome.depletion_age.is_some() {
        SuccessMetric::Depletion
    } else if projected_corpus_at_retirement > retirement_corpus_needed {
        SuccessMetric::Surplus
    } else {
        let shortfall_ratio = if retirement_corpus_needed > 0.0 {
            (retirement_corpus_needed - projected_corpus_at_retirement) / retirement_corpus_needed
        } else {
            0.0
        };
        if shortfall_ratio <= 0.10 {
            SuccessMetric::OnTrack
        } else {
            SuccessMetric::Shortfall
        }
    };

    ProjectionResult {
        timeline: outcome.timeline,
        summary: crate::projector::ProjectionSummary {
            retirement_corpus_needed,
            projected_corpus_at_retirement,
            final_portfolio_value,
            depletion_age: outcome.depletion_age,
            success_metric,
        },
    }
}

/// Runs `config.num_simulations` independent paths and aggregates them
/// into percentile bands and a shortfall-risk summary.
///
/// Determinism: for a fixed `(inputs, assumptions, config)` the result
/// is bit-identical across runs, platforms, and thread counts, because
/// every path is seeded independently as `config.seed + i` and
/// aggregation sorts by terminal value rather than relying on
/// completion order.
pub fn run_monte_carlo(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult> {
    inputs.validate(assumptions)?;
    if config.time_step != TimeStep::Annual {
        return Err(EngineError::validation(
            "time_step",
            "only annual stepping is implemented",
        ));
    }
    if config.num_simulations == 0 {
        return Err(EngineError::validation(
            "num_simulations",
            "must be positive",
        ));
    }

    // Phase 1: terminal value only, for every path (O(N) memory).
    let seeds: Vec<u64> = (0..config.num_simulations as u64)
        .map(|i| config.seed + i)
        .collect();

    #[cfg(feature = "parallel")]
    let mut seed_terminals: Vec<(u64, f64, Option<f64>)> = seeds
        .par_iter()
        .map(|&seed| {
            let outcome = simulate_path(inputs, assumptions, seed);
            (seed, terminal_value(&outcome), outcome.pre_clamp_shortfall)
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut seed_terminals: Vec<(u64, f64, Option<f64>)> = seeds
        .iter()
        .map(|&seed| {
            let outcome = simulate_path(inputs, assumptions, seed);
            (seed, terminal_value(&outcome), outcome.pre_clamp_shortfall)
        })
        .collect();

    seed_terminals.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let n = seed_terminals.len();
    let values: Vec<f64> = seed_terminals.iter().map(|(_, v, _)| *v).collect();
    let success_count = values.iter().filter(|v| **v > 0.0).count();
    let success_probability = success_count as f64 / n as f64;

    let distribution = TerminalDistribution {
        mean: numeric::mean(&values),
        median: numeric::median(&values),
        std_dev: numeric::std_dev(&values),
        values: values.clone(),
    };

    let failed_shortfalls: Vec<f64> = seed_terminals
        .iter()
        .filter(|(_, v, _)| *v <= 0.0)
        .map(|(_, _, shortfall)| shortfall.unwrap_or(0.0))
        .collect();
    let shortfall_risk = ShortfallRisk {
        probability: 1.0 - success_probability,
        average_shortfall: numeric::mean(&failed_shortfalls),
        worst_case: values.first().copied().unwrap_or(0.0),
    };

    // Phase 2: re-run only the five percentile seeds to materialize
    // their full timelines.
    let percentile_index = |p: f64| ((n as f64 * p).floor() as usize).min(n - 1);
    let mut percentile_result = |p: f64| {
        let (seed, _, _) = seed_terminals[percentile_index(p)];
        let outcome = simulate_path(inputs, assumptions, seed);
        to_projection_result(inputs, assumptions, outcome)
    };

    let percentile_paths = PercentilePaths {
        p10: percentile_result(0.10),
        p25: percentile_result(0.25),
        p50: percentile_result(0.50),
        p75: percentile_result(0.75),
        p90: percentile_result(0.90),
    };

    Ok(MonteCarloResult {
        success_probability,
        median_outcome: distribution.median,
        percentile_paths,
        distribution,
        shortfall_risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{self, AssetClass, Region};
    use std::collections::BTreeMap;

    fn bundle() -> Assumptions {
        assumptions::get(Region::In, "2024-Q4").unwrap()
    }

    fn baseline_inputs() -> ProjectionInputs {
        ProjectionInputs {
            current_age: 30,
            retirement_age: 60,
            life_expectancy: 85,
            current_savings: 1_000_000.0,
            monthly_investment: 25_000.0,
            monthly_expenses: 50_000.0,
            investment_growth_rate: None,
            expense_growth_rate: None,
            asset_allocation: BTreeMap::from([
                (AssetClass::EquityIndex, 70.0),
                (AssetClass::Bond, 30.0),
            ]),
            future_expenses: vec![],
        }
    }

    #[test]
    fn is_reproducible_for_a_fixed_seed() {
        let config = MonteCarloConfig {
            num_simulations: 100,
            seed: 12_345,
            time_step: TimeStep::Annual,
        };
        let a = run_monte_carlo(&baseline_inputs(), &bundle(), &config).unwrap();
        let b = run_monte_carlo(&baseline_inputs(), &bundle(), &config).unwrap();
        assert_eq!(a.success_probability, b.success_probability);
        assert_eq!(a.median_outcome, b.median_outcome);
    }

    #[test]
    fn percentiles_are_monotonic() {
        let config = MonteCarloConfig {
            num_simulations: 200,
            seed: 7,
            time_step: TimeStep::Annual,
        };
        let result = run_monte_carlo(&baseline_inputs(), &bundle(), &config).unwrap();
        let p10 = result.percentile_paths.p10.summary.final_portfolio_value;
        let p50 = result.percentile_paths.p50.summary.final_portfolio_value;
        let p90 = result.percentile_paths.p90.summary.final_portfolio_value;
        assert!(p10 <= p50);
        assert!(p50 <= p90);
    }

    #[test]
    fn success_and_shortfall_probability_are_complements() {
        let config = MonteCarloConfig {
            num_simulations: 150,
            seed: 99,
            time_step: TimeStep::Annual,
        };
        let result = run_monte_carlo(&baseline_inputs(), &bundle(), &config).unwrap();
        assert!(
            (result.success_probability + result.shortfall_risk.probability - 1.0).abs() < 1e-12
        );
    }

    #[test]
    fn equity_heavy_allocation_has_higher_terminal_variance() {
        let config = MonteCarloConfig {
            num_simulations: 300,
            seed: 555,
            time_step: TimeStep::Annual,
        };
        let mut conservative = baseline_inputs();
        conservative.asset_allocation =
            BTreeMap::from([(AssetClass::EquityIndex, 30.0), (AssetClass::Bond, 70.0)]);
        let mut aggressive = baseline_inputs();
        aggressive.asset_allocation =
            BTreeMap::from([(AssetClass::EquityIndex, 90.0), (AssetClass::Bond, 10.0)]);

        let conservative_result = run_monte_carlo(&conservative, &bundle(), &config).unwrap();
        let aggressive_result = run_monte_carlo(&aggressive, &bundle(), &config).unwrap();

        assert!(aggressive_result.distribution.std_dev > conservative_result.distribution.std_dev);
    }

    #[test]
    fn monthly_time_step_is_rejected() {
        let config = MonteCarloConfig {
            num_simulations: 10,
            seed: 1,
            time_step: TimeStep::Monthly,
        };
        assert!(run_monte_carlo(&baseline_inputs(), &bundle(), &config).is_err());
    }
}
