//! Calibration tables: per-state baselines and per-market-type ranges.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::LOG_TARGET_CALIBRATION;
use crate::market::{BedroomSize, MarketType, Priority};
use crate::numbers::i64_to_f64;

const DEFAULT_CALIBRATION_DATA: &str = include_str!("../../assets/data/calibration.json");

/// Errors raised when calibration tables violate their invariants.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: String, value: f64 },
    #[error("{field} range inverted (low {low} > high {high})")]
    InvertedBand { field: String, low: f64, high: f64 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: String,
        min: i32,
        max: i32,
        value: i32,
    },
    #[error("{market} lists no best-performer candidates")]
    EmptyCandidates { market: String },
    #[error("state code {code:?} is not a two-letter code")]
    InvalidStateCode { code: String },
}

/// Inclusive floating-point range, serialized as `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        (self.low + self.high) / 2.0
    }

    fn validate(self, field: &str) -> Result<(), CalibrationError> {
        if self.low <= 0.0 {
            return Err(CalibrationError::NonPositive {
                field: field.to_string(),
                value: self.low,
            });
        }
        if self.low > self.high {
            return Err(CalibrationError::InvertedBand {
                field: field.to_string(),
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

impl From<[f64; 2]> for Band {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<Band> for [f64; 2] {
    fn from(band: Band) -> Self {
        [band.low, band.high]
    }
}

/// Inclusive integer range, serialized as `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct IntBand {
    pub low: i32,
    pub high: i32,
}

impl IntBand {
    #[must_use]
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub const fn contains(self, value: i32) -> bool {
        value >= self.low && value <= self.high
    }

    fn validate_percent(self, field: &str) -> Result<(), CalibrationError> {
        for value in [self.low, self.high] {
            if !(0..=100).contains(&value) {
                return Err(CalibrationError::RangeViolation {
                    field: field.to_string(),
                    min: 0,
                    max: 100,
                    value,
                });
            }
        }
        if self.low > self.high {
            return Err(CalibrationError::InvertedBand {
                field: field.to_string(),
                low: f64::from(self.low),
                high: f64::from(self.high),
            });
        }
        Ok(())
    }
}

impl From<[i32; 2]> for IntBand {
    fn from([low, high]: [i32; 2]) -> Self {
        Self { low, high }
    }
}

impl From<IntBand> for [i32; 2] {
    fn from(band: IntBand) -> Self {
        [band.low, band.high]
    }
}

/// A top-amenity entry for a market type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmenityRecord {
    pub name: String,
    #[serde(alias = "revenue_boost")]
    pub revenue_boost: u8,
    pub priority: Priority,
}

/// Calibration profile for one market type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProfile {
    #[serde(default = "MarketProfile::default_price_multiplier")]
    pub price_multiplier: f64,
    #[serde(default = "MarketProfile::default_adr")]
    pub adr: Band,
    #[serde(default = "MarketProfile::default_occupancy")]
    pub occupancy: IntBand,
    #[serde(default = "MarketProfile::default_seasonality")]
    pub seasonality: IntBand,
    #[serde(default = "MarketProfile::default_best_performers")]
    pub best_performers: Vec<BedroomSize>,
    #[serde(default)]
    pub amenities: Vec<AmenityRecord>,
}

impl MarketProfile {
    const fn default_price_multiplier() -> f64 {
        1.0
    }

    const fn default_adr() -> Band {
        Band::new(120.0, 220.0)
    }

    const fn default_occupancy() -> IntBand {
        IntBand::new(40, 60)
    }

    const fn default_seasonality() -> IntBand {
        IntBand::new(50, 75)
    }

    fn default_best_performers() -> Vec<BedroomSize> {
        vec![BedroomSize::Three, BedroomSize::Four]
    }

    fn validate(&self, market: &str) -> Result<(), CalibrationError> {
        if self.price_multiplier <= 0.0 || !self.price_multiplier.is_finite() {
            return Err(CalibrationError::NonPositive {
                field: format!("markets.{market}.price_multiplier"),
                value: self.price_multiplier,
            });
        }
        self.adr.validate(&format!("markets.{market}.adr"))?;
        self.occupancy
            .validate_percent(&format!("markets.{market}.occupancy"))?;
        self.seasonality
            .validate_percent(&format!("markets.{market}.seasonality"))?;
        if self.best_performers.is_empty() {
            return Err(CalibrationError::EmptyCandidates {
                market: market.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MarketProfile {
    fn default() -> Self {
        Self {
            price_multiplier: Self::default_price_multiplier(),
            adr: Self::default_adr(),
            occupancy: Self::default_occupancy(),
            seasonality: Self::default_seasonality(),
            best_performers: Self::default_best_performers(),
            amenities: Vec::new(),
        }
    }
}

/// Read-only calibration context shared by every synthesis call in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTables {
    #[serde(default = "CalibrationTables::default_state_price")]
    pub default_state_price: i64,
    #[serde(default)]
    pub state_prices: BTreeMap<String, i64>,
    #[serde(default)]
    pub markets: BTreeMap<String, MarketProfile>,
    /// Profile used for market types missing from `markets`.
    #[serde(default)]
    pub fallback: MarketProfile,
    /// Market whose amenity list stands in for markets without one.
    #[serde(default = "CalibrationTables::default_fallback_amenities")]
    pub fallback_amenities: MarketType,
}

impl Default for CalibrationTables {
    fn default() -> Self {
        Self {
            default_state_price: Self::default_state_price(),
            state_prices: BTreeMap::new(),
            markets: BTreeMap::new(),
            fallback: MarketProfile::default(),
            fallback_amenities: Self::default_fallback_amenities(),
        }
    }
}

impl CalibrationTables {
    const fn default_state_price() -> i64 {
        275_000
    }

    const fn default_fallback_amenities() -> MarketType {
        MarketType::Rural
    }

    /// Tables bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CALIBRATION_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Process-wide cached copy of the bundled tables.
    #[must_use]
    pub fn shared() -> &'static Self {
        static TABLES: OnceLock<CalibrationTables> = OnceLock::new();
        TABLES.get_or_init(Self::load_from_static)
    }

    /// Parse and validate tables from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError` when the JSON is malformed or any table
    /// entry violates its bounds.
    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Check every table entry against its documented bounds.
    ///
    /// # Errors
    ///
    /// Returns the first `CalibrationError` encountered.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.default_state_price <= 0 {
            return Err(CalibrationError::NonPositive {
                field: "default_state_price".to_string(),
                value: i64_to_f64(self.default_state_price),
            });
        }
        for (code, price) in &self.state_prices {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(CalibrationError::InvalidStateCode { code: code.clone() });
            }
            if *price <= 0 {
                return Err(CalibrationError::NonPositive {
                    field: format!("state_prices.{code}"),
                    value: i64_to_f64(*price),
                });
            }
        }
        for (market, profile) in &self.markets {
            profile.validate(market)?;
        }
        self.fallback.validate("fallback")
    }

    /// Baseline median home price for a state, falling back to the default.
    #[must_use]
    pub fn state_price(&self, state: &str) -> i64 {
        let code = state.trim().to_ascii_uppercase();
        if let Some(price) = self.state_prices.get(&code) {
            return *price;
        }
        log::debug!(
            target: LOG_TARGET_CALIBRATION,
            "no baseline for state {code}; using default {}",
            self.default_state_price
        );
        self.default_state_price
    }

    /// Calibration profile for a market type, falling back when absent.
    #[must_use]
    pub fn profile(&self, market: &MarketType) -> &MarketProfile {
        if let Some(profile) = self.markets.get(market.as_str()) {
            return profile;
        }
        log::debug!(
            target: LOG_TARGET_CALIBRATION,
            "no profile for market type {market}; using fallback"
        );
        &self.fallback
    }

    /// Top amenities for a market type.
    ///
    /// Markets without a profile borrow the fallback amenity market's list.
    #[must_use]
    pub fn amenities(&self, market: &MarketType) -> &[AmenityRecord] {
        if let Some(profile) = self.markets.get(market.as_str()) {
            return &profile.amenities;
        }
        self.markets
            .get(self.fallback_amenities.as_str())
            .map_or(self.fallback.amenities.as_slice(), |profile| {
                profile.amenities.as_slice()
            })
    }

    /// Whether a market type has its own profile.
    #[must_use]
    pub fn knows_market(&self, market: &MarketType) -> bool {
        self.markets.contains_key(market.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_validate() {
        let tables = CalibrationTables::from_json(DEFAULT_CALIBRATION_DATA).unwrap();
        assert_eq!(tables.state_prices.len(), 51);
        for market in MarketType::LISTED {
            assert!(tables.knows_market(&market), "missing profile for {market}");
            assert_eq!(tables.amenities(&market).len(), 5);
        }
    }

    #[test]
    fn bundled_tables_carry_reference_values() {
        let tables = CalibrationTables::shared();
        assert_eq!(tables.state_price("WV"), 165_000);
        assert_eq!(tables.state_price("wv"), 165_000);
        let rural = tables.profile(&MarketType::Rural);
        assert!((rural.price_multiplier - 0.7).abs() < f64::EPSILON);
        assert_eq!(rural.occupancy, IntBand::new(35, 55));
        assert_eq!(rural.adr, Band::new(95.0, 200.0));
    }

    #[test]
    fn unknown_state_uses_default_baseline() {
        let tables = CalibrationTables::shared();
        assert_eq!(tables.state_price("PR"), 275_000);
    }

    #[test]
    fn unlisted_market_uses_fallback_profile_and_rural_amenities() {
        let tables = CalibrationTables::shared();
        let glacier = MarketType::from("glacier");
        let profile = tables.profile(&glacier);
        assert!((profile.price_multiplier - 1.0).abs() < f64::EPSILON);
        assert_eq!(profile.adr, Band::new(120.0, 220.0));
        assert_eq!(profile.occupancy, IntBand::new(40, 60));
        assert_eq!(profile.seasonality, IntBand::new(50, 75));
        assert_eq!(
            tables.amenities(&glacier),
            tables.amenities(&MarketType::Rural)
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let tables = CalibrationTables::from_json("{}").unwrap();
        assert_eq!(tables.default_state_price, 275_000);
        assert!(tables.markets.is_empty());
        assert!(tables.amenities(&MarketType::Beach).is_empty());
    }

    #[test]
    fn rejects_inverted_bands() {
        let json = r#"{ "markets": { "lake": { "adr": [260, 140] } } }"#;
        assert!(matches!(
            CalibrationTables::from_json(json),
            Err(CalibrationError::InvertedBand { field, .. }) if field == "markets.lake.adr"
        ));
    }

    #[test]
    fn rejects_out_of_range_occupancy() {
        let json = r#"{ "markets": { "urban": { "occupancy": [55, 120] } } }"#;
        assert!(matches!(
            CalibrationTables::from_json(json),
            Err(CalibrationError::RangeViolation { value: 120, .. })
        ));
    }

    #[test]
    fn rejects_lowercase_state_codes() {
        let json = r#"{ "state_prices": { "wv": 165000 } }"#;
        assert!(matches!(
            CalibrationTables::from_json(json),
            Err(CalibrationError::InvalidStateCode { .. })
        ));
    }

    #[test]
    fn rejects_empty_best_performers() {
        let json = r#"{ "markets": { "desert": { "best_performers": [] } } }"#;
        assert!(matches!(
            CalibrationTables::from_json(json),
            Err(CalibrationError::EmptyCandidates { market }) if market == "desert"
        ));
    }
}
