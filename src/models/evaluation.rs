use serde::{Deserialize, Serialize};

use crate::models::{NormalizedEntry, WatchDefinition};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub meets_price: bool,
    pub meets_profit: bool,
    /// Expected resale value minus price; only set when the watch has a
    /// resale value.
    pub profit: Option<f64>,
}

impl EvaluationResult {
    pub fn passed(&self) -> bool {
        self.meets_price && self.meets_profit
    }
}

/// Judge an entry against the watch's thresholds. Pure.
pub fn evaluate(entry: &NormalizedEntry, watch: &WatchDefinition) -> EvaluationResult {
    let price = entry.price;
    let meets_price = watch.max_price.is_none_or(|max| price <= max);

    let profit = watch.expected_resale_value.map(|resale| resale - price);
    let meets_profit = match (profit, watch.min_profit) {
        (Some(profit), Some(min)) => profit >= min,
        _ => true,
    };

    EvaluationResult {
        meets_price,
        meets_profit,
        profit,
    }
}
