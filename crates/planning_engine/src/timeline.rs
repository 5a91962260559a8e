//! Shared year-by-year stepping logic behind both the deterministic
//! projector and the Monte Carlo simulator. The only
//! difference between the two callers is how a given year's portfolio
//! return is produced — a fixed expected value for the projector, a
//! sampled draw for Monte Carlo — so that's the one thing factored out
//! as a closure argument.

use crate::assumptions::Assumptions;
use crate::projector::{ProjectionInputs, YearlyProjection};

pub(crate) struct TimelineOutcome {
    pub timeline: Vec<YearlyProjection>,
    pub depletion_age: Option<u32>,
    /// Magnitude of the portfolio balance that would have gone negative
    /// at the depletion year, before being clamped to zero. `None` if
    /// the path never depleted. See `DESIGN.md` for why Monte Carlo's
    /// shortfall-risk metric needs this rather than the (always-zero)
    /// clamped terminal value.
    pub pre_clamp_shortfall: Option<f64>,
}

pub(crate) fn run<F>(
    inputs: &ProjectionInputs,
    assumptions: &Assumptions,
    mut portfolio_return_for_year: F,
) -> TimelineOutcome
where
    F: FnMut(usize) -> f64,
{
    let inflation = assumptions.inflation.mean_fraction();
    let expense_growth = inputs.expense_growth_rate.unwrap_or(inflation);
    let investment_growth = inputs.investment_growth_rate.unwrap_or(inflation + 0.01);

    let total_years = (inputs.life_expectancy - inputs.current_age) as usize;
    let mut timeline = Vec::with_capacity(total_years);
    let mut portfolio = inputs.current_savings;
    let mut depletion_age = None;
    let mut pre_clamp_shortfall = None;

    for t in 0..total_years {
        let age = inputs.current_age + t as u32;
        let is_retired = age >= inputs.retirement_age;

        let mut expenses = inputs.monthly_expenses * 12.0 * (1.0 + expense_growth).powi(t as i32);
        for fe in &inputs.future_expenses {
            if fe.year_offset as usize == t {
                expenses += fe.amount_today * (1.0 + inflation).powi(t as i32);
            }
        }

        let contributions = if is_retired {
            0.0
        } else {
            inputs.monthly_investment * 12.0 * (1.0 + investment_growth).powi(t as i32)
        };
        let withdrawals = if is_retired { expenses } else { 0.0 };

        let return_fraction = portfolio_return_for_year(t);
        let investment_return = portfolio * return_fraction;
        let pre_withdrawal_portfolio = portfolio + investment_return + contributions;

        let withdrawal_rate = if is_retired && pre_withdrawal_portfolio > 0.0 {
            Some(withdrawals / pre_withdrawal_portfolio)
        } else {
            None
        };

        let raw_portfolio = pre_withdrawal_portfolio - withdrawals;
        let depleted_this_year = is_retired && raw_portfolio < 0.0;
        if depleted_this_year {
            pre_clamp_shortfall = Some(raw_portfolio.abs());
        }
        portfolio = raw_portfolio.max(0.0);

        let real_return = investment_return / (1.0 + inflation).powi(t as i32);

        timeline.push(YearlyProjection {
            year_offset: t as u32,
            age,
            portfolio_value: portfolio,
            income: 0.0,
            expenses,
            net_cashflow: contributions - withdrawals,
            contributions,
            withdrawals,
            investment_return,
            real_return,
            withdrawal_rate,
        });

        if portfolio == 0.0 && is_retired {
            depletion_age = Some(age);
            break;
        }
    }

    TimelineOutcome {
        timeline,
        depletion_age,
        pre_clamp_shortfall,
    }
}
