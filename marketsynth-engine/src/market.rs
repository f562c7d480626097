//! Market taxonomy and the closed classifications carried on synthesized records.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    RISK_HIGH_LPT, RISK_MODERATE_LPT, RISK_VERY_HIGH_LPT, RPR_ELITE, RPR_GOOD, RPR_MARGINAL,
    VERDICT_BUY, VERDICT_CAUTION, VERDICT_HOLD, VERDICT_STRONG_BUY,
};

/// Market-type tag driving every calibration lookup.
///
/// Tags outside the known set are kept verbatim as [`MarketType::Unlisted`]
/// so they survive formatting; calibration resolves them through fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketType {
    Mountain,
    Rural,
    Beach,
    Lake,
    Desert,
    Waterfront,
    Suburban,
    Urban,
    Tropical,
    Unlisted(String),
}

impl MarketType {
    /// Every listed market type, in calibration order.
    pub const LISTED: [Self; 9] = [
        Self::Mountain,
        Self::Rural,
        Self::Beach,
        Self::Lake,
        Self::Desert,
        Self::Waterfront,
        Self::Suburban,
        Self::Urban,
        Self::Tropical,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mountain => "mountain",
            Self::Rural => "rural",
            Self::Beach => "beach",
            Self::Lake => "lake",
            Self::Desert => "desert",
            Self::Waterfront => "waterfront",
            Self::Suburban => "suburban",
            Self::Urban => "urban",
            Self::Tropical => "tropical",
            Self::Unlisted(tag) => tag.as_str(),
        }
    }

    /// Destination markets earn an extra demand bonus.
    #[must_use]
    pub const fn is_destination(&self) -> bool {
        matches!(self, Self::Beach | Self::Mountain | Self::Lake)
    }

    #[must_use]
    pub const fn is_listed(&self) -> bool {
        !matches!(self, Self::Unlisted(_))
    }
}

/// An empty unlisted tag, which descriptor validation rejects.
impl Default for MarketType {
    fn default() -> Self {
        Self::Unlisted(String::new())
    }
}

impl From<&str> for MarketType {
    fn from(value: &str) -> Self {
        let tag = value.trim().to_ascii_lowercase();
        Self::LISTED
            .iter()
            .find(|listed| listed.as_str() == tag)
            .cloned()
            .unwrap_or(Self::Unlisted(tag))
    }
}

impl From<String> for MarketType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<MarketType> for String {
    fn from(value: MarketType) -> Self {
        match value {
            MarketType::Unlisted(tag) => tag,
            listed => listed.as_str().to_string(),
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority tier for a top-amenity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    MustHave,
    HighImpact,
    NiceToHave,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MustHave => "must-have",
            Self::HighImpact => "high-impact",
            Self::NiceToHave => "nice-to-have",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Investment verdict derived from the overall market score.
///
/// Variants are declared from weakest to strongest so ordering follows tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Avoid,
    Caution,
    Hold,
    Buy,
    StrongBuy,
}

impl Verdict {
    /// Map an overall score onto its verdict tier.
    #[must_use]
    pub const fn from_overall(overall: u8) -> Self {
        if overall >= VERDICT_STRONG_BUY {
            Self::StrongBuy
        } else if overall >= VERDICT_BUY {
            Self::Buy
        } else if overall >= VERDICT_HOLD {
            Self::Hold
        } else if overall >= VERDICT_CAUTION {
            Self::Caution
        } else {
            Self::Avoid
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "strong-buy",
            Self::Buy => "buy",
            Self::Hold => "hold",
            Self::Caution => "caution",
            Self::Avoid => "avoid",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative saturation tier keyed off listings per thousand residents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    #[must_use]
    pub fn from_listings_per_thousand(listings_per_thousand: f64) -> Self {
        if listings_per_thousand > RISK_VERY_HIGH_LPT {
            Self::VeryHigh
        } else if listings_per_thousand > RISK_HIGH_LPT {
            Self::High
        } else if listings_per_thousand > RISK_MODERATE_LPT {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryHigh => "very-high",
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating band for the revenue-to-price ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RprRating {
    Poor,
    Marginal,
    Good,
    Elite,
}

impl RprRating {
    #[must_use]
    pub fn from_rpr(rpr: f64) -> Self {
        if rpr >= RPR_ELITE {
            Self::Elite
        } else if rpr >= RPR_GOOD {
            Self::Good
        } else if rpr >= RPR_MARGINAL {
            Self::Marginal
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elite => "elite",
            Self::Good => "good",
            Self::Marginal => "marginal",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for RprRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bedroom configuration labels used for the best-performer pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BedroomSize {
    #[serde(rename = "1BR")]
    One,
    #[serde(rename = "2BR")]
    Two,
    #[serde(rename = "3BR")]
    Three,
    #[serde(rename = "4BR")]
    Four,
    #[serde(rename = "5BR")]
    Five,
    #[serde(rename = "6BR+")]
    SixPlus,
}

impl BedroomSize {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1BR",
            Self::Two => "2BR",
            Self::Three => "3BR",
            Self::Four => "4BR",
            Self::Five => "5BR",
            Self::SixPlus => "6BR+",
        }
    }
}

impl fmt::Display for BedroomSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal status of short-term rentals in the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrStatus {
    #[default]
    Legal,
    Restricted,
    Banned,
}

impl StrStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "legal",
            Self::Restricted => "restricted",
            Self::Banned => "banned",
        }
    }
}

impl fmt::Display for StrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_type_parses_known_and_keeps_unknown_tags() {
        assert_eq!(MarketType::from("Mountain"), MarketType::Mountain);
        assert_eq!(MarketType::from(" lake "), MarketType::Lake);
        let unlisted = MarketType::from("glacier");
        assert_eq!(unlisted, MarketType::Unlisted("glacier".to_string()));
        assert!(!unlisted.is_listed());
        assert_eq!(unlisted.to_string(), "glacier");
    }

    #[test]
    fn market_type_serializes_as_plain_tag() {
        let json = serde_json::to_string(&MarketType::Waterfront).unwrap();
        assert_eq!(json, "\"waterfront\"");
        let parsed: MarketType = serde_json::from_str("\"tropical\"").unwrap();
        assert_eq!(parsed, MarketType::Tropical);
    }

    #[test]
    fn verdict_thresholds_match_tiers() {
        assert_eq!(Verdict::from_overall(95), Verdict::StrongBuy);
        assert_eq!(Verdict::from_overall(78), Verdict::StrongBuy);
        assert_eq!(Verdict::from_overall(77), Verdict::Buy);
        assert_eq!(Verdict::from_overall(65), Verdict::Buy);
        assert_eq!(Verdict::from_overall(64), Verdict::Hold);
        assert_eq!(Verdict::from_overall(52), Verdict::Hold);
        assert_eq!(Verdict::from_overall(51), Verdict::Caution);
        assert_eq!(Verdict::from_overall(40), Verdict::Caution);
        assert_eq!(Verdict::from_overall(39), Verdict::Avoid);
    }

    #[test]
    fn verdict_never_drops_as_score_rises() {
        let mut previous = Verdict::from_overall(0);
        for overall in 1..=u8::MAX {
            let current = Verdict::from_overall(overall);
            assert!(current >= previous, "verdict regressed at {overall}");
            previous = current;
        }
    }

    #[test]
    fn risk_level_uses_strict_thresholds() {
        assert_eq!(RiskLevel::from_listings_per_thousand(25.1), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_listings_per_thousand(25.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_listings_per_thousand(15.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_listings_per_thousand(8.0), RiskLevel::Low);
    }

    #[test]
    fn rpr_rating_bands() {
        assert_eq!(RprRating::from_rpr(0.2), RprRating::Elite);
        assert_eq!(RprRating::from_rpr(0.15), RprRating::Good);
        assert_eq!(RprRating::from_rpr(0.125), RprRating::Marginal);
        assert_eq!(RprRating::from_rpr(0.05), RprRating::Poor);
    }

    #[test]
    fn bedroom_labels_roundtrip_through_serde() {
        let json = serde_json::to_string(&BedroomSize::SixPlus).unwrap();
        assert_eq!(json, "\"6BR+\"");
        let parsed: BedroomSize = serde_json::from_str("\"3BR\"").unwrap();
        assert_eq!(parsed, BedroomSize::Three);
    }
}
