//! Rebalancer: drift measurement against a target allocation and the
//! trade list that restores it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assumptions::{AssetClass, Assumptions};
use crate::error::{EngineError, Result};

/// `drift_threshold` is the max-drift trigger (percentage points);
/// `minimum_trade_amount` suppresses trades too small to be worth the
/// friction; `trading_cost_bps_override` replaces every asset's bundled
/// cost when set, rather than requiring a per-asset override map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalancingConfig {
    pub drift_threshold: f64,
    pub minimum_trade_amount: f64,
    pub trading_cost_bps_override: Option<f64>,
}

impl Default for RebalancingConfig {
    fn default() -> Self {
        RebalancingConfig {
            drift_threshold: 5.0,
            minimum_trade_amount: 10_000.0,
            trading_cost_bps_override: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub asset: AssetClass,
    pub side: TradeSide,
    pub amount: f64,
    pub current_value: f64,
    pub target_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingResult {
    pub needs_rebalancing: bool,
    pub drifts: BTreeMap<AssetClass, f64>,
    pub max_drift: f64,
    pub trades: Vec<Trade>,
    pub estimated_cost: f64,
    pub impact_on_return_bps: f64,
}

/// A per-asset drift below this (in percentage points) is left alone
/// even once rebalancing has been triggered overall — fixed at 1pp,
/// not configurable, as the dead-zone floor below which a trade isn't
/// worth placing.
const PER_ASSET_DRIFT_FLOOR: f64 = 1.0;

/// Computes drift against `target_allocation` and, if `max_drift`
/// exceeds `config.drift_threshold`, the trade list that restores it.
pub fn generate_rebalancing_trades(
    holdings: &BTreeMap<AssetClass, f64>,
    target_allocation: &BTreeMap<AssetClass, f64>,
    assumptions: &Assumptions,
    config: &RebalancingConfig,
) -> Result<RebalancingResult> {
    let total: f64 = target_allocation.values().sum();
    if (total - 100.0).abs() > 0.01 {
        return Err(EngineError::validation(
            "target_allocation",
            format!("weights must sum to 100% (got {total:.4}%)"),
        ));
    }
    for &asset in target_allocation.keys() {
        if assumptions.asset(asset).is_none() {
            return Err(EngineError::validation(
                "target_allocation",
                format!("unknown asset {asset} not present in assumptions bundle"),
            ));
        }
    }

    let total_value: f64 = holdings.values().sum();
    if total_value <= 0.0 {
        return Ok(RebalancingResult {
            needs_rebalancing: false,
            drifts: BTreeMap::new(),
            max_drift: 0.0,
            trades: vec![],
            estimated_cost: 0.0,
            impact_on_return_bps: 0.0,
        });
    }

    let mut drifts = BTreeMap::new();
    for (&asset, &target_pct) in target_allocation {
        let current_value = holdings.get(&asset).copied().unwrap_or(0.0);
        let current_pct = 100.0 * current_value / total_value;
        drifts.insert(asset, current_pct - target_pct);
    }

    let max_drift = drifts.values().map(|d| d.abs()).fold(0.0, f64::max);
    if max_drift < config.drift_threshold {
        return Ok(RebalancingResult {
            needs_rebalancing: false,
            drifts,
            max_drift,
            trades: vec![],
            estimated_cost: 0.0,
            impact_on_return_bps: 0.0,
        });
    }

    let mut trades = Vec::new();
    let mut estimated_cost = 0.0;
    for (&asset, &drift) in &drifts {
        if drift.abs() <= PER_ASSET_DRIFT_FLOOR {
            continue;
        }
        let target_pct = target_allocation[&asset];
        let current_value = holdings.get(&asset).copied().unwrap_or(0.0);
        let target_value = (target_pct / 100.0) * total_value;
        let trade_amount = target_value - current_value;
        if trade_amount.abs() < config.minimum_trade_amount {
            continue;
        }

        let cost_bps = config
            .trading_cost_bps_override
            .unwrap_or_else(|| assumptions.asset(asset).expect("validated allocation").trading_cost_bps);
        estimated_cost += trade_amount.abs() * cost_bps / 10_000.0;

        trades.push(Trade {
            asset,
            side: if trade_amount > 0.0 { TradeSide::Buy } else { TradeSide::Sell },
            amount: trade_amount.abs(),
            current_value,
            target_value,
        });
    }

    let impact_on_return_bps = 10_000.0 * estimated_cost / total_value;

    Ok(RebalancingResult {
        needs_rebalancing: true,
        drifts,
        max_drift,
        trades,
        estimated_cost,
        impact_on_return_bps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{self, Region};

    fn bundle() -> Assumptions {
        assumptions::get(Region::In, "2024-Q4").unwrap()
    }

    fn target() -> BTreeMap<AssetClass, f64> {
        BTreeMap::from([(AssetClass::EquityIndex, 70.0), (AssetClass::Bond, 30.0)])
    }

    #[test]
    fn balanced_holdings_need_no_rebalancing() {
        let holdings =
            BTreeMap::from([(AssetClass::EquityIndex, 700_000.0), (AssetClass::Bond, 300_000.0)]);
        let result =
            generate_rebalancing_trades(&holdings, &target(), &bundle(), &RebalancingConfig::default())
                .unwrap();
        assert!(!result.needs_rebalancing);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn drifted_holdings_produce_offsetting_trades() {
        let holdings =
            BTreeMap::from([(AssetClass::EquityIndex, 850_000.0), (AssetClass::Bond, 150_000.0)]);
        let result =
            generate_rebalancing_trades(&holdings, &target(), &bundle(), &RebalancingConfig::default())
                .unwrap();
        assert!(result.needs_rebalancing);
        assert!((result.max_drift - 15.0).abs() < 1e-6);

        let sell = result
            .trades
            .iter()
            .find(|t| t.asset == AssetClass::EquityIndex)
            .unwrap();
        assert_eq!(sell.side, TradeSide::Sell);
        let buy = result.trades.iter().find(|t| t.asset == AssetClass::Bond).unwrap();
        assert_eq!(buy.side, TradeSide::Buy);
        assert!(result.estimated_cost > 0.0);
    }

    #[test]
    fn emitted_trades_restore_drift_within_the_dead_zone() {
        let mut holdings =
            BTreeMap::from([(AssetClass::EquityIndex, 850_000.0), (AssetClass::Bond, 150_000.0)]);
        let config = RebalancingConfig::default();
        let result = generate_rebalancing_trades(&holdings, &target(), &bundle(), &config).unwrap();

        for trade in &result.trades {
            let delta = match trade.side {
                TradeSide::Buy => trade.amount,
                TradeSide::Sell => -trade.amount,
            };
            *holdings.entry(trade.asset).or_insert(0.0) += delta;
        }

        let total: f64 = holdings.values().sum();
        for (&asset, &target_pct) in &target() {
            let current_pct = 100.0 * holdings.get(&asset).copied().unwrap_or(0.0) / total;
            let drift = (current_pct - target_pct).abs();
            let minimum_trade_ratio = 100.0 * config.minimum_trade_amount / total;
            assert!(drift <= PER_ASSET_DRIFT_FLOOR.max(minimum_trade_ratio) + 1e-6);
        }
    }

    #[test]
    fn empty_holdings_need_no_rebalancing() {
        let holdings = BTreeMap::new();
        let result =
            generate_rebalancing_trades(&holdings, &target(), &bundle(), &RebalancingConfig::default())
                .unwrap();
        assert!(!result.needs_rebalancing);
    }

    #[test]
    fn unknown_asset_in_target_allocation_is_rejected() {
        let mut thin_bundle = bundle();
        thin_bundle.assets.remove(&AssetClass::Commodity);
        let holdings = BTreeMap::from([(AssetClass::Commodity, 100_000.0)]);
        let target = BTreeMap::from([(AssetClass::Commodity, 100.0)]);
        let err = generate_rebalancing_trades(
            &holdings,
            &target,
            &thin_bundle,
            &RebalancingConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { field, .. } if field == "target_allocation"));
    }
}
