//! Sub-scores and the weighted overall score.
use rand::Rng;

use crate::calibration::IntBand;
use crate::constants::{
    AFFORDABILITY_BANDS, AFFORDABILITY_LUXURY_RANGE, DEMAND_BASE, DEMAND_CEILING,
    DEMAND_DESTINATION_BONUS, DEMAND_FLOOR, DEMAND_JITTER, DEMAND_PARK_BONUS, OVERALL_CEILING,
    OVERALL_FLOOR, REGULATION_RANGE, RPR_SCORE_BANDS, RPR_SCORE_POOR_RANGE,
    SATURATION_LOW_RISK_RANGE, SATURATION_SCORE_TIERS, WEIGHT_AFFORDABILITY, WEIGHT_DEMAND,
    WEIGHT_REGULATION, WEIGHT_RPR, WEIGHT_SATURATION, WEIGHT_SEASONALITY,
};
use crate::market::{MarketType, Verdict};
use crate::numbers::{clamp_i32_to_u8, clamp_i64_to_u8, trunc_f64_to_i64};
use crate::record::MarketScore;
use crate::synth::int_between;

/// The six 0-100 sub-scores feeding the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubScores {
    pub demand: u8,
    pub affordability: u8,
    pub regulation: u8,
    pub seasonality: u8,
    pub saturation: u8,
    pub rpr: u8,
}

impl SubScores {
    /// Weighted sum, truncated and clamped.
    #[must_use]
    pub fn overall(&self) -> u8 {
        let weighted = f64::from(self.demand) * WEIGHT_DEMAND
            + f64::from(self.affordability) * WEIGHT_AFFORDABILITY
            + f64::from(self.regulation) * WEIGHT_REGULATION
            + f64::from(self.seasonality) * WEIGHT_SEASONALITY
            + f64::from(self.saturation) * WEIGHT_SATURATION
            + f64::from(self.rpr) * WEIGHT_RPR;
        clamp_i64_to_u8(
            trunc_f64_to_i64(weighted).clamp(i64::from(OVERALL_FLOOR), i64::from(OVERALL_CEILING)),
        )
    }

    #[must_use]
    pub fn into_market_score(self) -> MarketScore {
        let overall = self.overall();
        MarketScore {
            overall,
            demand: self.demand,
            affordability: self.affordability,
            regulation: self.regulation,
            seasonality: self.seasonality,
            saturation: self.saturation,
            rpr: self.rpr,
            verdict: Verdict::from_overall(overall),
        }
    }
}

pub fn demand_score<R: Rng + ?Sized>(rng: &mut R, near_park: bool, market: &MarketType) -> u8 {
    let mut demand = DEMAND_BASE;
    if near_park {
        demand += int_between(rng, DEMAND_PARK_BONUS);
    }
    if market.is_destination() {
        demand += int_between(rng, DEMAND_DESTINATION_BONUS);
    }
    demand += int_between(rng, DEMAND_JITTER);
    clamp_i32_to_u8(demand.clamp(DEMAND_FLOOR, DEMAND_CEILING))
}

/// Affordability range for a price; cheaper markets score higher.
#[must_use]
pub fn affordability_range(median_home_price: i64) -> (i32, i32) {
    AFFORDABILITY_BANDS
        .iter()
        .find(|(ceiling, _)| median_home_price < *ceiling)
        .map_or(AFFORDABILITY_LUXURY_RANGE, |(_, range)| *range)
}

pub fn affordability_score<R: Rng + ?Sized>(rng: &mut R, median_home_price: i64) -> u8 {
    clamp_i32_to_u8(int_between(rng, affordability_range(median_home_price)))
}

pub fn regulation_score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    clamp_i32_to_u8(int_between(rng, REGULATION_RANGE))
}

pub fn seasonality_score<R: Rng + ?Sized>(rng: &mut R, band: IntBand) -> u8 {
    clamp_i32_to_u8(int_between(rng, (band.low, band.high)))
}

/// Saturation range for a listings density; denser markets score lower.
#[must_use]
pub fn saturation_range(listings_per_thousand: f64) -> (i32, i32) {
    SATURATION_SCORE_TIERS
        .iter()
        .find(|(floor, _)| listings_per_thousand > *floor)
        .map_or(SATURATION_LOW_RISK_RANGE, |(_, range)| *range)
}

pub fn saturation_score<R: Rng + ?Sized>(rng: &mut R, listings_per_thousand: f64) -> u8 {
    clamp_i32_to_u8(int_between(rng, saturation_range(listings_per_thousand)))
}

#[must_use]
pub fn rpr_score_range(rpr: f64) -> (i32, i32) {
    RPR_SCORE_BANDS
        .iter()
        .find(|(floor, _)| rpr >= *floor)
        .map_or(RPR_SCORE_POOR_RANGE, |(_, range)| *range)
}

pub fn rpr_score<R: Rng + ?Sized>(rng: &mut R, rpr: f64) -> u8 {
    clamp_i32_to_u8(int_between(rng, rpr_score_range(rpr)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn uniform_scores(value: u8) -> SubScores {
        SubScores {
            demand: value,
            affordability: value,
            regulation: value,
            seasonality: value,
            saturation: value,
            rpr: value,
        }
    }

    #[test]
    fn overall_is_weighted_and_clamped() {
        let near_sixty = SubScores {
            demand: 61,
            ..uniform_scores(60)
        };
        assert_eq!(near_sixty.overall(), 60);
        assert_eq!(uniform_scores(5).overall(), 25);
        assert_eq!(uniform_scores(100).overall(), 95);
        let mixed = SubScores {
            demand: 80,
            affordability: 90,
            regulation: 75,
            seasonality: 60,
            saturation: 40,
            rpr: 85,
        };
        // 20 + 22.5 + 7.5 + 9 + 4 + 12.75 = 75.75
        assert_eq!(mixed.overall(), 75);
        assert_eq!(mixed.into_market_score().verdict, Verdict::Buy);
    }

    #[test]
    fn band_lookups_respect_edges() {
        assert_eq!(affordability_range(199_999), (78, 92));
        assert_eq!(affordability_range(200_000), (65, 82));
        assert_eq!(affordability_range(600_000), AFFORDABILITY_LUXURY_RANGE);
        assert_eq!(saturation_range(25.0), (20, 40));
        assert_eq!(saturation_range(25.1), (10, 25));
        assert_eq!(saturation_range(8.0), SATURATION_LOW_RISK_RANGE);
        assert_eq!(rpr_score_range(0.18), (75, 95));
        assert_eq!(rpr_score_range(0.119), RPR_SCORE_POOR_RANGE);
    }

    #[test]
    fn demand_stays_in_documented_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        for _ in 0..500 {
            let plain = demand_score(&mut rng, false, &MarketType::Urban);
            assert!((45..=65).contains(&plain));
            let boosted = demand_score(&mut rng, true, &MarketType::Mountain);
            assert!((DEMAND_FLOOR..=DEMAND_CEILING).contains(&i32::from(boosted)));
            assert!(boosted >= 60);
        }
    }

    #[test]
    fn drawn_scores_fall_in_their_bands() {
        let mut rng = ChaCha20Rng::seed_from_u64(29);
        for _ in 0..300 {
            assert!((78..=92).contains(&affordability_score(&mut rng, 128_000)));
            assert!((72..=90).contains(&regulation_score(&mut rng)));
            assert!((50..=75).contains(&seasonality_score(&mut rng, IntBand::new(50, 75))));
            assert!((10..=25).contains(&saturation_score(&mut rng, 27.3)));
            assert!((60..=78).contains(&rpr_score(&mut rng, 0.16)));
        }
    }
}
