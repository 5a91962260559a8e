//! Integration tests exercised only through the crate's public API
//! (`projector`, `monte_carlo`, `goals`, `rebalance`), covering named
//! end-to-end scenarios such as depletion, surplus, and rebalancing.
//!
//! - `scenarios` - the nine baseline/depletion/surplus/reproducibility/
//!   rebalancer/goal-allocator scenarios.
