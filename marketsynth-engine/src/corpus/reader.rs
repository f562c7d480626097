//! Read-side views of a corpus: known identifiers and per-state comparables.
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{Corpus, record_id};
use crate::market::MarketType;
use crate::numbers::{clamp_i64_to_u32, trunc_f64_to_i64};

/// Identifiers already present anywhere in the corpus.
#[must_use]
pub fn existing_ids(corpus: &Corpus) -> BTreeSet<String> {
    corpus
        .records()
        .filter_map(|(_, record)| record_id(record).map(str::to_string))
        .collect()
}

/// Summary of an existing market used as context for new cities in its state.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparable {
    pub id: String,
    pub name: String,
    pub population: u32,
    pub avg_adr: i64,
    pub occupancy_rate: i64,
    pub monthly_revenue: i64,
    pub median_home_price: i64,
    pub market_type: MarketType,
    pub listings_per_thousand: f64,
    pub str_to_housing_ratio: f64,
    pub yoy_supply_growth: f64,
}

fn integer_at(record: &Value, pointer: &str, default: i64) -> i64 {
    record
        .pointer(pointer)
        .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(trunc_f64_to_i64)))
        .unwrap_or(default)
}

fn float_at(record: &Value, pointer: &str, default: f64) -> f64 {
    record
        .pointer(pointer)
        .and_then(Value::as_f64)
        .unwrap_or(default)
}

impl Comparable {
    /// Summarize a corpus record; missing metrics take neutral defaults.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = record_id(record)?.to_string();
        Some(Self {
            id,
            name: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            population: clamp_i64_to_u32(integer_at(record, "/population", 0)),
            avg_adr: integer_at(record, "/rental/avgADR", 200),
            occupancy_rate: integer_at(record, "/rental/occupancyRate", 55),
            monthly_revenue: integer_at(record, "/rental/monthlyRevenue", 3_000),
            median_home_price: integer_at(record, "/rental/medianHomePrice", 300_000),
            market_type: record
                .pointer("/amenityDelta/marketType")
                .and_then(Value::as_str)
                .map_or(MarketType::Rural, MarketType::from),
            listings_per_thousand: float_at(record, "/saturationRisk/listingsPerThousand", 10.0),
            str_to_housing_ratio: float_at(record, "/saturationRisk/strToHousingRatio", 2.0),
            yoy_supply_growth: float_at(record, "/saturationRisk/yoySupplyGrowth", 5.0),
        })
    }
}

/// Comparables grouped by state code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateComparables {
    by_state: BTreeMap<String, Vec<Comparable>>,
}

impl StateComparables {
    /// Scan the corpus once and group its records by state array.
    #[must_use]
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut by_state: BTreeMap<String, Vec<Comparable>> = BTreeMap::new();
        for (state, record) in corpus.records() {
            if let Some(comparable) = Comparable::from_record(record) {
                by_state
                    .entry(state.to_ascii_uppercase())
                    .or_default()
                    .push(comparable);
            }
        }
        Self { by_state }
    }

    #[must_use]
    pub fn for_state(&self, state: &str) -> &[Comparable] {
        self.by_state
            .get(&state.trim().to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_state(&self, state: &str) -> bool {
        !self.for_state(state).is_empty()
    }

    /// Comparables in a state that share a market type.
    pub fn same_market<'a>(
        &'a self,
        state: &str,
        market: &'a MarketType,
    ) -> impl Iterator<Item = &'a Comparable> + 'a {
        self.for_state(state)
            .iter()
            .filter(move |comparable| &comparable.market_type == market)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_state.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_state.is_empty()
    }
}
