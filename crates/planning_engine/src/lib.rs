//! Financial Planning Engine: a pure computational core projecting
//! long-horizon household cashflows, quantifying outcome uncertainty via
//! Monte Carlo simulation, allocating a savings budget across goals, and
//! computing portfolio rebalancing trades.
//!
//! Every component is a pure function of its arguments: given identical
//! inputs and an identical seed, outputs are byte-identical. The engine
//! has no wire protocol, file format, or CLI of its own — its boundary
//! is the function-level API re-exported below, consumed by an
//! in-process UI (out of scope for this crate).

pub mod assumptions;
pub mod error;
pub mod goals;
pub mod intention;
pub mod monte_carlo;
pub mod numeric;
pub mod projector;
pub mod rebalance;
mod timeline;

pub use assumptions::Assumptions;
pub use error::{CalibrationError, EngineError, Result};
pub use goals::{allocate_goal_budget, GoalAllocatorConfig};
pub use monte_carlo::{run_monte_carlo, MonteCarloConfig};
pub use projector::{project_deterministic, ProjectionInputs};
pub use rebalance::{generate_rebalancing_trades, RebalancingConfig};

#[cfg(test)]
mod tests;
