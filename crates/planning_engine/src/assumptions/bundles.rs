//! Compiled-in calibration data.
//!
//! `in_2024_q4` is the only calibrated bundle shipped so far. Figures
//! are indicative long-run capital-market assumptions for an
//! India-domiciled portfolio, internally consistent (equity > debt
//! nominal return, unit-diagonal correlation) but not sourced from a
//! live data feed — this engine does not ingest real-time market data.

use std::collections::HashMap;

use super::{
    AssetCategory, AssetClass, AssetParameters, Assumptions, CorrelationMap, InflationParameters,
    Region, Regime, RegimeMultiplier, ReturnDistribution,
};

pub(super) fn in_2024_q4() -> Assumptions {
    let mut assets = HashMap::new();
    assets.insert(
        AssetClass::EquityIndex,
        AssetParameters {
            label: "Broad equity index",
            category: AssetCategory::Equity,
            nominal: ReturnDistribution {
                mean_pct: 12.0,
                volatility_pct: 18.0,
            },
            real: ReturnDistribution {
                mean_pct: 6.5,
                volatility_pct: 17.0,
            },
            trading_cost_bps: 10.0,
        },
    );
    assets.insert(
        AssetClass::Bond,
        AssetParameters {
            label: "Government/corporate bond index",
            category: AssetCategory::Debt,
            nominal: ReturnDistribution {
                mean_pct: 7.0,
                volatility_pct: 5.0,
            },
            real: ReturnDistribution {
                mean_pct: 1.8,
                volatility_pct: 4.5,
            },
            trading_cost_bps: 15.0,
        },
    );
    assets.insert(
        AssetClass::Commodity,
        AssetParameters {
            label: "Broad commodity index",
            category: AssetCategory::Commodity,
            nominal: ReturnDistribution {
                mean_pct: 8.0,
                volatility_pct: 20.0,
            },
            real: ReturnDistribution {
                mean_pct: 2.7,
                volatility_pct: 19.5,
            },
            trading_cost_bps: 25.0,
        },
    );
    assets.insert(
        AssetClass::Cash,
        AssetParameters {
            label: "Money market / cash equivalents",
            category: AssetCategory::Cash,
            nominal: ReturnDistribution {
                mean_pct: 5.5,
                volatility_pct: 1.0,
            },
            real: ReturnDistribution {
                mean_pct: 0.4,
                volatility_pct: 1.0,
            },
            trading_cost_bps: 2.0,
        },
    );

    let mut correlations = CorrelationMap::new();
    correlations.insert(AssetClass::EquityIndex, AssetClass::Bond, 0.15);
    correlations.insert(AssetClass::EquityIndex, AssetClass::Commodity, 0.30);
    correlations.insert(AssetClass::EquityIndex, AssetClass::Cash, 0.02);
    correlations.insert(AssetClass::Bond, AssetClass::Commodity, -0.10);
    correlations.insert(AssetClass::Bond, AssetClass::Cash, 0.20);
    correlations.insert(AssetClass::Commodity, AssetClass::Cash, 0.00);

    let regimes = vec![
        Regime {
            name: "normal",
            steady_state_probability: 0.70,
            avg_duration_years: 5.0,
            duration_volatility_years: 1.5,
            multipliers: HashMap::from([
                (
                    AssetClass::EquityIndex,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
                (
                    AssetClass::Bond,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
                (
                    AssetClass::Commodity,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
                (
                    AssetClass::Cash,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
            ]),
        },
        Regime {
            name: "bear",
            steady_state_probability: 0.22,
            avg_duration_years: 1.5,
            duration_volatility_years: 0.7,
            multipliers: HashMap::from([
                (
                    AssetClass::EquityIndex,
                    RegimeMultiplier { return_multiplier: 0.2, volatility_multiplier: 1.6 },
                ),
                (
                    AssetClass::Bond,
                    RegimeMultiplier { return_multiplier: 1.1, volatility_multiplier: 1.2 },
                ),
                (
                    AssetClass::Commodity,
                    RegimeMultiplier { return_multiplier: 0.6, volatility_multiplier: 1.4 },
                ),
                (
                    AssetClass::Cash,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
            ]),
        },
        Regime {
            name: "crisis",
            steady_state_probability: 0.08,
            avg_duration_years: 0.75,
            duration_volatility_years: 0.4,
            multipliers: HashMap::from([
                (
                    AssetClass::EquityIndex,
                    RegimeMultiplier { return_multiplier: -1.5, volatility_multiplier: 2.5 },
                ),
                (
                    AssetClass::Bond,
                    RegimeMultiplier { return_multiplier: 0.8, volatility_multiplier: 1.8 },
                ),
                (
                    AssetClass::Commodity,
                    RegimeMultiplier { return_multiplier: -1.0, volatility_multiplier: 2.2 },
                ),
                (
                    AssetClass::Cash,
                    RegimeMultiplier { return_multiplier: 1.0, volatility_multiplier: 1.0 },
                ),
            ]),
        },
    ];

    let inflation = InflationParameters {
        mean_pct: 5.0,
        volatility_pct: 1.5,
        ar1_persistence: 0.6,
        regime_adjustments_pct: HashMap::from([
            ("bear".to_string(), 0.5),
            ("crisis".to_string(), 2.0),
        ]),
    };

    Assumptions {
        region: Region::In,
        version: "2024-Q4",
        effective_date: (2024, 10, 1),
        assets,
        correlations,
        regimes,
        inflation,
    }
}
