//! Intention Adapter: a thin façade sequencing the lower-level
//! components and shaping their results for the UI.
//!
//! Not algorithmically complex — every handler below is a direct call
//! into `projector`, `monte_carlo`, `goals`, or `rebalance` — but it is
//! the engine's actual public surface from the UI's point of view, the
//! same role `finplan_core::analysis::evaluator` plays over
//! `finplan_core::simulation`.

use serde::{Deserialize, Serialize};

use crate::assumptions::{AssetClass, Assumptions};
use crate::error::Result;
use crate::goals::{self, Goal, GoalAllocationResult, GoalAllocatorConfig};
use crate::monte_carlo::{self, MonteCarloConfig, MonteCarloResult};
use crate::projector::{self, ProjectionInputs, ProjectionResult, SuccessMetric};
use crate::rebalance::{self, RebalancingConfig, RebalancingResult};
use std::collections::BTreeMap;

/// A single presentation-layer "thinking step" with a pre-measured
/// duration. Purely cosmetic: no handler's behavior depends on these
/// values, and no handler reads a clock to produce them — "thinking
/// step" durations are presentation artifacts and must not gate any
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub label: &'static str,
    pub duration_ms: u32,
}

/// Uniform envelope every intention handler returns: the steps a UI can
/// animate through, plus the actual `report` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentionResult<T> {
    pub steps: Vec<ThinkingStep>,
    pub report: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementOptimizationReport {
    pub corpus_at_retirement: f64,
    pub corpus_needed: f64,
    pub final_portfolio_value: f64,
    pub success_metric: SuccessMetric,
    pub recommendation: String,
}

/// Runs the deterministic projector and shapes a retirement-focused
/// recommendation.
pub fn retirement_optimization(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
) -> Result<IntentionResult<RetirementOptimizationReport>> {
    let steps = vec![
        ThinkingStep { label: "Reading your profile and plan", duration_ms: 400 },
        ThinkingStep { label: "Projecting year-by-year cashflows", duration_ms: 900 },
        ThinkingStep { label: "Comparing corpus needed against corpus projected", duration_ms: 500 },
    ];

    let result = projector::project_deterministic(inputs, assumptions)?;
    let summary = &result.summary;

    let recommendation = match summary.success_metric {
        SuccessMetric::Surplus => {
            "your projected corpus exceeds what retirement requires; consider redirecting the \
             surplus toward other goals"
                .to_string()
        }
        SuccessMetric::OnTrack => {
            "you're on track: the shortfall against your required corpus is within 10%".to_string()
        }
        SuccessMetric::Shortfall => format!(
            "projected corpus of {:.0} falls short of the {:.0} needed at retirement; consider \
             raising monthly contributions or pushing out retirement age",
            summary.projected_corpus_at_retirement, summary.retirement_corpus_needed
        ),
        SuccessMetric::Depletion => format!(
            "the portfolio depletes at age {}; contributions need to increase materially or \
             expenses need to come down",
            summary.depletion_age.unwrap_or(inputs.life_expectancy)
        ),
    };

    Ok(IntentionResult {
        steps,
        report: RetirementOptimizationReport {
            corpus_at_retirement: summary.projected_corpus_at_retirement,
            corpus_needed: summary.retirement_corpus_needed,
            final_portfolio_value: summary.final_portfolio_value,
            success_metric: summary.success_metric,
            recommendation,
        },
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloRetirementReport {
    pub success_probability: f64,
    pub median_outcome: f64,
    pub p10_terminal: f64,
    pub p90_terminal: f64,
    pub recommendation: Option<String>,
}

/// Runs the simulator at a fixed `N=1000, seed=42` configuration and
/// emits a SIP-increase recommendation when success probability is
/// below 80%.
pub fn monte_carlo_retirement(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
) -> Result<IntentionResult<MonteCarloRetirementReport>> {
    let steps = vec![
        ThinkingStep { label: "Reading your profile and plan", duration_ms: 400 },
        ThinkingStep { label: "Running 1,000 market scenarios", duration_ms: 1_800 },
        ThinkingStep { label: "Ranking outcomes by terminal portfolio value", duration_ms: 600 },
    ];

    let config = MonteCarloConfig { num_simulations: 1_000, seed: 42, ..Default::default() };
    let result: MonteCarloResult = monte_carlo::run_monte_carlo(inputs, assumptions, &config)?;

    let p10_terminal = terminal_value(&result.percentile_paths.p10);
    let p90_terminal = terminal_value(&result.percentile_paths.p90);

    let recommendation = if result.success_probability < 0.8 {
        let p50 = &result.percentile_paths.p50.summary;
        let gap = (p50.retirement_corpus_needed - p50.projected_corpus_at_retirement).max(0.0);
        let months_until_retirement =
            ((inputs.retirement_age - inputs.current_age) as f64 * 12.0).max(1.0);
        let sip_increase = gap / months_until_retirement;
        Some(format!(
            "success probability is {:.0}%; raising the monthly SIP by about {sip_increase:.0} \
             would close the median shortfall by retirement",
            result.success_probability * 100.0
        ))
    } else {
        None
    };

    Ok(IntentionResult {
        steps,
        report: MonteCarloRetirementReport {
            success_probability: result.success_probability,
            median_outcome: result.median_outcome,
            p10_terminal,
            p90_terminal,
            recommendation,
        },
    })
}

fn terminal_value(path: &ProjectionResult) -> f64 {
    path.timeline.last().map(|y| y.portfolio_value).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub age: u32,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioProjectionReport {
    pub result: ProjectionResult,
    pub milestones: Vec<Milestone>,
}

/// Runs the deterministic projector and highlights milestone ages
/// (40, 50, 60).
pub fn portfolio_projection(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
) -> Result<IntentionResult<PortfolioProjectionReport>> {
    const MILESTONE_AGES: [u32; 3] = [40, 50, 60];

    let steps = vec![
        ThinkingStep { label: "Reading your profile and plan", duration_ms: 400 },
        ThinkingStep { label: "Projecting year-by-year cashflows", duration_ms: 900 },
        ThinkingStep { label: "Highlighting milestone ages", duration_ms: 300 },
    ];

    let result = projector::project_deterministic(inputs, assumptions)?;
    let milestones = MILESTONE_AGES
        .iter()
        .filter_map(|&age| {
            result
                .timeline
                .iter()
                .find(|y| y.age == age)
                .map(|y| Milestone { age, portfolio_value: y.portfolio_value })
        })
        .collect();

    Ok(IntentionResult {
        steps,
        report: PortfolioProjectionReport { result, milestones },
    })
}

/// Runs the goal allocator against a provided monthly budget.
pub fn goal_funding(
    goals: &[Goal],
    monthly_budget: f64,
    assumptions: &Assumptions,
    config: &GoalAllocatorConfig,
) -> Result<IntentionResult<GoalAllocationResult>> {
    let steps = vec![
        ThinkingStep { label: "Reading your goals", duration_ms: 300 },
        ThinkingStep { label: "Inflating targets and ranking by priority", duration_ms: 500 },
        ThinkingStep { label: "Allocating the monthly budget", duration_ms: 400 },
    ];

    let report = goals::allocate_goal_budget(goals, monthly_budget, assumptions, config)?;
    Ok(IntentionResult { steps, report })
}

/// Runs the rebalancer against a provided portfolio and target
/// allocation.
pub fn rebalancing(
    holdings: &BTreeMap<AssetClass, f64>,
    target_allocation: &BTreeMap<AssetClass, f64>,
    assumptions: &Assumptions,
    config: &RebalancingConfig,
) -> Result<IntentionResult<RebalancingResult>> {
    let steps = vec![
        ThinkingStep { label: "Reading current holdings", duration_ms: 300 },
        ThinkingStep { label: "Measuring drift against the target allocation", duration_ms: 400 },
        ThinkingStep { label: "Sizing trades", duration_ms: 400 },
    ];

    let report =
        rebalance::generate_rebalancing_trades(holdings, target_allocation, assumptions, config)?;
    Ok(IntentionResult { steps, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{self, AssetClass as Asset, Region};

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
            asset_allocation: BTreeMap::from([(Asset::EquityIndex, 70.0), (Asset::Bond, 30.0)]),
            future_expenses: vec![],
        }
    }

    #[test]
    fn retirement_optimization_reshapes_the_projector_summary() {
        let result = retirement_optimization(&baseline_inputs(), &bundle()).unwrap();
        assert!(!result.steps.is_empty());
        assert!(!result.report.recommendation.is_empty());
        assert!(result.report.corpus_at_retirement > 0.0);
    }

    #[test]
    fn thinking_steps_do_not_affect_the_report() {
        let a = retirement_optimization(&baseline_inputs(), &bundle()).unwrap();
        let b = retirement_optimization(&baseline_inputs(), &bundle()).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.steps, b.steps);
    }

    #[test]
    fn monte_carlo_retirement_uses_the_fixed_configuration() {
        let result = monte_carlo_retirement(&baseline_inputs(), &bundle()).unwrap();
        assert!(result.report.success_probability >= 0.0 && result.report.success_probability <= 1.0);
        assert!(result.report.p10_terminal <= result.report.p90_terminal);
    }

    #[test]
    fn low_success_probability_emits_a_sip_recommendation() {
        let mut inputs = baseline_inputs();
        inputs.current_savings = 50_000.0;
        inputs.monthly_investment = 2_000.0;
        let result = monte_carlo_retirement(&inputs, &bundle()).unwrap();
        if result.report.success_probability < 0.8 {
            assert!(result.report.recommendation.is_some());
        }
    }

    #[test]
    fn portfolio_projection_highlights_milestone_ages() {
        let result = portfolio_projection(&baseline_inputs(), &bundle()).unwrap();
        let ages: Vec<u32> = result.report.milestones.iter().map(|m| m.age).collect();
        assert_eq!(ages, vec![40, 50, 60]);
    }

    #[test]
    fn goal_funding_delegates_to_the_allocator() {
        let goals = vec![Goal {
            id: "g1".to_string(),
            name: "Car".to_string(),
            target_amount: 1_500_000.0,
            target_year: 2030,
            priority: crate::goals::Priority::High,
            current_savings: None,
        }];
        let config = GoalAllocatorConfig::for_year(2026);
        let result = goal_funding(&goals, 30_000.0, &bundle(), &config).unwrap();
        assert_eq!(result.report.allocations.len(), 1);
    }

    #[test]
    fn rebalancing_delegates_to_the_rebalancer() {
        let holdings = BTreeMap::from([(Asset::EquityIndex, 850_000.0), (Asset::Bond, 150_000.0)]);
        let target = BTreeMap::from([(Asset::EquityIndex, 70.0), (Asset::Bond, 30.0)]);
        let result =
            rebalancing(&holdings, &target, &bundle(), &RebalancingConfig::default()).unwrap();
        assert!(result.report.needs_rebalancing);
    }
}
