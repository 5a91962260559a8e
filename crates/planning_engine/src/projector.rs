//! Deterministic Projector: a single expected-value cashflow timeline
//! from `current_age` to `life_expectancy`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assumptions::{AssetClass, Assumptions};
use crate::error::{EngineError, Result};
use crate::numeric::{present_value_annuity, AnnuityTiming};
use crate::timeline::{self, TimelineOutcome};

/// A one-time outflow scheduled at `year_offset`, expressed in today's
/// money and inflated to the scheduled year at the general inflation
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureExpense {
    pub year_offset: u32,
    pub amount_today: f64,
    pub label: String,
}

/// Inputs to the deterministic projector and the Monte Carlo simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub monthly_investment: f64,
    pub monthly_expenses: f64,
    pub investment_growth_rate: Option<f64>,
    pub expense_growth_rate: Option<f64>,
    pub asset_allocation: BTreeMap<AssetClass, f64>,
    pub future_expenses: Vec<FutureExpense>,
}

impl ProjectionInputs {
    /// Validates every field against a loaded assumptions bundle.
    /// Called before any projection runs.
    pub fn validate(&self, assumptions: &Assumptions) -> Result<()> {
        if !(18..=100).contains(&self.current_age) {
            return Err(EngineError::validation(
                "current_age",
                "must be between 18 and 100",
            ));
        }
        if self.retirement_age <= self.current_age {
            return Err(EngineError::validation(
                "retirement_age",
                "must be greater than current_age",
            ));
        }
        if self.life_expectancy <= self.retirement_age {
            return Err(EngineError::validation(
                "life_expectancy",
                "must be greater than retirement_age",
            ));
        }
        if self.current_savings < 0.0 {
            return Err(EngineError::validation("current_savings", "must be non-negative"));
        }
        if self.monthly_investment < 0.0 {
            return Err(EngineError::validation(
                "monthly_investment",
                "must be non-negative",
            ));
        }
        if self.monthly_expenses < 0.0 {
            return Err(EngineError::validation("monthly_expenses", "must be non-negative"));
        }
        if self.asset_allocation.is_empty() {
            return Err(EngineError::validation(
                "asset_allocation",
                "must contain at least one asset",
            ));
        }
        for (&asset, &weight) in &self.asset_allocation {
            if !(0.0..=100.0).contains(&weight) {
                return Err(EngineError::validation(
                    "asset_allocation",
                    format!("weight for {asset} must be in [0, 100]"),
                ));
            }
            if assumptions.asset(asset).is_none() {
                return Err(EngineError::validation(
                    "asset_allocation",
                    format!("unknown asset {asset} not present in assumptions bundle"),
                ));
            }
        }
        let total: f64 = self.asset_allocation.values().sum();
        if (total - 100.0).abs() > 0.01 {
            return Err(EngineError::validation(
                "asset_allocation",
                format!("weights must sum to 100% (got {total:.4}%)"),
            ));
        }
        Ok(())
    }

    /// Weight-weighted sum of per-asset nominal means. Iterates the
    /// allocation in sorted asset-id order so the
    /// accumulation order is fixed, per the determinism design note.
    pub fn expected_nominal_return(&self, assumptions: &Assumptions) -> f64 {
        self.asset_allocation
            .iter()
            .map(|(&asset, &weight)| {
                let params = assumptions.asset(asset).expect("validated allocation");
                (weight / 100.0) * params.nominal.mean_fraction()
            })
            .sum()
    }
}

/// A single simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year_offset: u32,
    pub age: u32,
    pub portfolio_value: f64,
    pub income: f64,
    pub expenses: f64,
    pub net_cashflow: f64,
    pub contributions: f64,
    pub withdrawals: f64,
    pub investment_return: f64,
    pub real_return: f64,
    pub withdrawal_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuccessMetric {
    Surplus,
    OnTrack,
    Shortfall,
    Depletion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub retirement_corpus_needed: f64,
    pub projected_corpus_at_retirement: f64,
    pub final_portfolio_value: f64,
    pub depletion_age: Option<u32>,
    pub success_metric: SuccessMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub timeline: Vec<YearlyProjection>,
    pub summary: ProjectionSummary,
}

/// Runs the deterministic, expected-value projection.
pub fn project_deterministic(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
) -> Result<ProjectionResult> {
    inputs.validate(assumptions)?;

    let portfolio_return = inputs.expected_nominal_return(assumptions);
    let TimelineOutcome {
        timeline,
        depletion_age,
        ..
    } = timeline::run(inputs, assumptions, |_year| portfolio_return);

    let summary = summarize(inputs, assumptions, &timeline, depletion_age, portfolio_return);

    Ok(ProjectionResult { timeline, summary })
}

fn summarize(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
    timeline: &[YearlyProjection],
    depletion_age: Option<u32>,
    portfolio_return: f64,
) -> ProjectionSummary {
    let inflation = assumptions.inflation.mean_fraction();
    let real_return = crate::numeric::nominal_to_real(portfolio_return, inflation);

    let retirement_year = timeline.iter().find(|y| y.age == inputs.retirement_age);
    let projected_corpus_at_retirement = retirement_year.map(|y| y.portfolio_value).unwrap_or(0.0);

    let retirement_years_in_retirement = (inputs.life_expectancy - inputs.retirement_age) as f64;
    let retirement_year_expenses = retirement_year.map(|y| y.expenses).unwrap_or_else(|| {
        let t = (inputs.retirement_age - inputs.current_age) as f64;
        let expense_growth = inputs.expense_growth_rate.unwrap_or(inflation);
        inputs.monthly_expenses * 12.0 * (1.0 + expense_growth).powf(t)
    });
    let retirement_corpus_needed = if real_return == 0.0 {
        retirement_year_expenses * retirement_years_in_retirement
    } else {
        present_value_annuity(retirement_year_expenses, real_return, retirement_years_in_retirement)
    };

    let final_portfolio_value = timeline.last().map(|y| y.portfolio_value).unwrap_or(0.0);

    let success_metric = if depletion_age.is_some() {
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

    ProjectionSummary {
        retirement_corpus_needed,
        projected_corpus_at_retirement,
        final_portfolio_value,
        depletion_age,
        success_metric,
    }
}

/// Future value an annuity-due SIP would reach — re-exported here for
/// the goal allocator, which needs the identical annuity convention to
/// grow `current_savings`/SIPs the same way the main projection does.
pub(crate) fn annuity_due_future_value(payment: f64, rate: f64, periods: f64) -> f64 {
    crate::numeric::future_value_annuity(payment, rate, periods, AnnuityTiming::Due)
}
