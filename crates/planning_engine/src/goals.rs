//! Goal Allocator: priority-greedy distribution of a monthly budget
//! across competing goals, with feasibility classification.

use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::{EngineError, Result};
use crate::numeric::required_payment;
use crate::projector::annuity_due_future_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub target_year: i32,
    pub priority: Priority,
    pub current_savings: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feasibility {
    OnTrack,
    Tight,
    Underfunded,
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAllocationRecord {
    pub goal_id: String,
    pub monthly_sip: f64,
    pub required_sip: f64,
    pub feasibility: Feasibility,
    pub projected_value: f64,
    pub shortfall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAllocationResult {
    pub allocations: Vec<GoalAllocationRecord>,
    pub total_monthly: f64,
    pub unallocated: f64,
    pub budget_utilization: f64,
    pub conflicts: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The goal allocator's planning return is deliberately decoupled from
/// any user's actual portfolio allocation, so SIPs stay comparable
/// across users with different allocations. `current_year` has no
/// default: the engine never reads the wall clock, so the caller
/// supplies "now" explicitly.
#[derive(Debug, Clone, Copy)]
pub struct GoalAllocatorConfig {
    pub current_year: i32,
    pub planning_return: f64,
}

impl GoalAllocatorConfig {
    pub fn for_year(current_year: i32) -> Self {
        GoalAllocatorConfig {
            current_year,
            planning_return: 0.10,
        }
    }
}

struct GoalPlan<'a> {
    goal: &'a Goal,
    years: f64,
    fv_target: f64,
    grown_current_savings: f64,
    remaining_need: f64,
    required_sip: f64,
}

fn plan_goal(goal: &Goal, assumptions: &Assumptions, config: &GoalAllocatorConfig) -> Result<GoalPlan<'_>> {
    let years = (goal.target_year - config.current_year) as f64;
    if years <= 0.0 {
        return Err(EngineError::validation(
            "target_year",
            "must be strictly in the future",
        ));
    }

    let inflation = assumptions.inflation.mean_fraction();
    let fv_target = goal.target_amount * (1.0 + inflation).powf(years);

    let grown_current_savings = goal
        .current_savings
        .unwrap_or(0.0)
        * (1.0 + config.planning_return).powf(years);

    let remaining_need = (fv_target - grown_current_savings).max(0.0);
    let required_sip = if remaining_need == 0.0 {
        0.0
    } else {
        required_payment(remaining_need, config.planning_return, years, 12.0)?
    };

    Ok(GoalPlan {
        goal,
        years,
        fv_target,
        grown_current_savings,
        remaining_need,
        required_sip,
    })
}

/// Distributes `monthly_budget` across `goals` by priority.
pub fn allocate_goal_budget(
    goals: &[Goal],
    monthly_budget: f64,
    assumptions: &Assumptions,
    config: &GoalAllocatorConfig,
) -> Result<GoalAllocationResult> {
    if monthly_budget < 0.0 {
        return Err(EngineError::validation("monthly_budget", "must be non-negative"));
    }

    if goals.is_empty() {
        return Ok(GoalAllocationResult {
            allocations: vec![],
            total_monthly: 0.0,
            unallocated: monthly_budget,
            budget_utilization: 0.0,
            conflicts: vec![],
            recommendations: vec![],
        });
    }

    let mut plans: Vec<GoalPlan<'_>> = goals
        .iter()
        .map(|g| plan_goal(g, assumptions, config))
        .collect::<Result<Vec<_>>>()?;

    // High > medium > low; ties broken by the shorter (more urgent)
    // timeline.
    plans.sort_by(|a, b| {
        b.goal
            .priority
            .cmp(&a.goal.priority)
            .then(a.years.partial_cmp(&b.years).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut remaining = monthly_budget;
    let mut conflicts = Vec::new();
    let mut allocations = Vec::with_capacity(plans.len());
    let mut total_required = 0.0;

    for plan in &plans {
        total_required += plan.required_sip;

        let (granted, feasibility) = if remaining >= plan.required_sip {
            let granted = plan.required_sip;
            remaining -= granted;
            (granted, Feasibility::OnTrack)
        } else if remaining > 0.0 {
            let granted = remaining;
            let ratio = if plan.required_sip > 0.0 {
                granted / plan.required_sip
            } else {
                1.0
            };
            remaining = 0.0;
            let feasibility = if ratio > 0.70 {
                Feasibility::Tight
            } else {
                Feasibility::Underfunded
            };
            conflicts.push(format!(
                "\"{}\" is only partially funded ({:.0}% of the required SIP)",
                plan.goal.name,
                ratio * 100.0
            ));
            (granted, feasibility)
        } else {
            conflicts.push(format!("\"{}\" cannot be funded from the remaining budget", plan.goal.name));
            (0.0, Feasibility::Impossible)
        };

        let projected_value =
            annuity_due_future_value(granted, config.planning_return / 12.0, plan.years * 12.0)
                + plan.grown_current_savings;
        let shortfall = (plan.fv_target - projected_value).max(0.0);

        allocations.push(GoalAllocationRecord {
            goal_id: plan.goal.id.clone(),
            monthly_sip: granted,
            required_sip: plan.required_sip,
            feasibility,
            projected_value,
            shortfall,
        });
    }

    let total_monthly = monthly_budget - remaining;
    let budget_utilization = if monthly_budget > 0.0 {
        100.0 * total_monthly / monthly_budget
    } else {
        0.0
    };

    let mut recommendations = Vec::new();
    if total_required > monthly_budget {
        let deficit = total_required - monthly_budget;
        recommendations.push(format!(
            "increase the monthly budget by about {deficit:.0} to fully fund every goal, or defer the underfunded goals"
        ));
    }
    if remaining > 0.0 {
        recommendations.push(format!(
            "{remaining:.0} of the monthly budget is unallocated and could be redirected to a lower-priority goal"
        ));
    }

    Ok(GoalAllocationResult {
        allocations,
        total_monthly,
        unallocated: remaining,
        budget_utilization,
        conflicts,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{self, Region};

    fn bundle() -> Assumptions {
        assumptions::get(Region::In, "2024-Q4").unwrap()
    }

    fn goal(id: &str, name: &str, target_amount: f64, target_year: i32, priority: Priority) -> Goal {
        Goal {
            id: id.to_string(),
            name: name.to_string(),
            target_amount,
            target_year,
            priority,
            current_savings: None,
        }
    }

    #[test]
    fn empty_goal_list_returns_budget_as_unallocated() {
        let config = GoalAllocatorConfig::for_year(2026);
        let result = allocate_goal_budget(&[], 50_000.0, &bundle(), &config).unwrap();
        assert!(result.allocations.is_empty());
        assert_eq!(result.unallocated, 50_000.0);
    }

    #[test]
    fn low_priority_goal_is_impossible_when_budget_is_exhausted() {
        let goals = vec![
            goal("g1", "Car", 1_500_000.0, 2029, Priority::High),
            goal("g2", "House down payment", 5_000_000.0, 2032, Priority::High),
            goal("g3", "Vacation", 500_000.0, 2028, Priority::Low),
        ];
        let config = GoalAllocatorConfig::for_year(2026);
        // Budget sufficient for only the two high-priority goals.
        let required_for_first_two: f64 = goals[..2]
            .iter()
            .map(|g| plan_goal(g, &bundle(), &config).unwrap().required_sip)
            .sum();
        let result = allocate_goal_budget(&goals, required_for_first_two, &bundle(), &config).unwrap();

        let low_priority = result.allocations.iter().find(|a| a.goal_id == "g3").unwrap();
        assert_eq!(low_priority.monthly_sip, 0.0);
        assert_eq!(low_priority.feasibility, Feasibility::Impossible);
        assert!(result.conflicts.iter().any(|c| c.contains("Vacation")));
    }

    #[test]
    fn allocation_closure_holds() {
        let goals = vec![
            goal("g1", "Education", 2_000_000.0, 2035, Priority::Medium),
            goal("g2", "Retirement top-up", 8_000_000.0, 2045, Priority::High),
        ];
        let config = GoalAllocatorConfig::for_year(2026);
        let budget = 60_000.0;
        let result = allocate_goal_budget(&goals, budget, &bundle(), &config).unwrap();
        assert!((result.total_monthly + result.unallocated - budget).abs() < 1e-6);
        for allocation in &result.allocations {
            assert!(allocation.monthly_sip >= 0.0);
            assert!(allocation.monthly_sip <= allocation.required_sip + 1e-6);
        }
    }

    #[test]
    fn goal_with_target_year_in_the_past_is_rejected() {
        let goals = vec![goal("g1", "Too late", 100_000.0, 2020, Priority::High)];
        let config = GoalAllocatorConfig::for_year(2026);
        assert!(allocate_goal_budget(&goals, 10_000.0, &bundle(), &config).is_err());
    }

    #[test]
    fn current_savings_already_exceeding_target_yields_zero_sip() {
        let mut g = goal("g1", "Already funded", 100_000.0, 2030, Priority::High);
        g.current_savings = Some(500_000.0);
        let config = GoalAllocatorConfig::for_year(2026);
        let result = allocate_goal_budget(&[g], 50_000.0, &bundle(), &config).unwrap();
        assert_eq!(result.allocations[0].monthly_sip, 0.0);
        assert_eq!(result.allocations[0].feasibility, Feasibility::OnTrack);
    }
}
