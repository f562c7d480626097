//! Synthesized market records.
//!
//! A record is a plain value: it is built once by the pipeline and never
//! edited afterwards. Regenerating a city produces a fresh value.
use serde::{Deserialize, Serialize};

use crate::calibration::AmenityRecord;
use crate::descriptor::HighlightSet;
use crate::market::{BedroomSize, MarketType, RiskLevel, RprRating, StrStatus, Verdict};

/// Record kind label; synthesized records always describe a city.
pub const CITY_KIND: &str = "city";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    pub id: String,
    pub name: String,
    pub county: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub population: u32,
    pub rpr: f64,
    pub dsi: bool,
    pub market_score: MarketScore,
    pub rental: RentalMetrics,
    pub saturation_risk: SaturationRisk,
    pub investment_metrics: InvestmentMetrics,
    pub str_status: StrStatus,
    pub permit_required: bool,
    pub income_by_size: IncomeBySize,
    pub amenity_delta: AmenityDelta,
    pub highlights: HighlightSet,
}

impl MarketRecord {
    /// Median home price, the anchor every ratio is computed against.
    #[must_use]
    pub const fn median_home_price(&self) -> i64 {
        self.rental.median_home_price
    }

    #[must_use]
    pub const fn overall(&self) -> u8 {
        self.market_score.overall
    }

    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.market_score.verdict
    }
}

/// Sub-scores, their weighted aggregate, and the verdict it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketScore {
    pub overall: u8,
    pub demand: u8,
    pub affordability: u8,
    pub regulation: u8,
    pub seasonality: u8,
    pub saturation: u8,
    pub rpr: u8,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalMetrics {
    #[serde(rename = "avgADR")]
    pub avg_adr: u32,
    pub occupancy_rate: u8,
    pub monthly_revenue: i64,
    pub median_home_price: i64,
    pub revenue_75th_percentile: i64,
    pub revenue_90th_percentile: i64,
    pub mtr_monthly_income: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaturationRisk {
    pub str_to_housing_ratio: f64,
    pub listings_per_thousand: f64,
    pub yoy_supply_growth: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetrics {
    pub rpr: f64,
    pub rpr_rating: RprRating,
    pub dsi: bool,
    pub dsi_details: DsiDetails,
}

/// Monthly cash-flow breakdown behind the debt survivability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsiDetails {
    pub monthly_mortgage: i64,
    pub monthly_expenses: i64,
    pub net_monthly_income: i64,
    pub survives: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBySize {
    #[serde(rename = "oneBR")]
    pub one_br: i64,
    #[serde(rename = "twoBR")]
    pub two_br: i64,
    #[serde(rename = "threeBR")]
    pub three_br: i64,
    #[serde(rename = "fourBR")]
    pub four_br: i64,
    #[serde(rename = "fiveBR")]
    pub five_br: i64,
    #[serde(rename = "sixPlusBR")]
    pub six_plus_br: i64,
    #[serde(rename = "bestPerformer")]
    pub best_performer: BedroomSize,
}

impl IncomeBySize {
    /// Projected income for a bedroom configuration.
    #[must_use]
    pub const fn for_size(&self, size: BedroomSize) -> i64 {
        match size {
            BedroomSize::One => self.one_br,
            BedroomSize::Two => self.two_br,
            BedroomSize::Three => self.three_br,
            BedroomSize::Four => self.four_br,
            BedroomSize::Five => self.five_br,
            BedroomSize::SixPlus => self.six_plus_br,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmenityDelta {
    pub top_amenities: Vec<AmenityRecord>,
    pub market_type: MarketType,
}
