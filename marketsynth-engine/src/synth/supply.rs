//! Supply-side saturation metrics.
use rand::Rng;

use crate::constants::{SUPPLY_DECIMALS, SUPPLY_METRO_TIER, SUPPLY_TIERS, YOY_SUPPLY_GROWTH_RANGE};
use crate::market::RiskLevel;
use crate::numbers::round_to_places;
use crate::record::SaturationRisk;
use crate::synth::uniform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyMetrics {
    pub listings_per_thousand: f64,
    pub str_to_housing_ratio: f64,
    pub yoy_supply_growth: f64,
}

impl SupplyMetrics {
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_listings_per_thousand(self.listings_per_thousand)
    }

    #[must_use]
    pub fn into_saturation_risk(self) -> SaturationRisk {
        SaturationRisk {
            str_to_housing_ratio: self.str_to_housing_ratio,
            listings_per_thousand: self.listings_per_thousand,
            yoy_supply_growth: self.yoy_supply_growth,
            risk_level: self.risk_level(),
        }
    }
}

/// Listings-per-thousand and STR-ratio ranges for a population tier.
#[must_use]
pub fn supply_ranges(population: u32) -> ((f64, f64), (f64, f64)) {
    SUPPLY_TIERS
        .iter()
        .find(|(ceiling, _, _)| population < *ceiling)
        .map_or(SUPPLY_METRO_TIER, |(_, listings, ratio)| (*listings, *ratio))
}

fn draw_rounded<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    round_to_places(uniform(rng, low, high), SUPPLY_DECIMALS)
}

pub fn draw_supply<R: Rng + ?Sized>(rng: &mut R, population: u32) -> SupplyMetrics {
    let (listings, ratio) = supply_ranges(population);
    let listings_per_thousand = draw_rounded(rng, listings);
    let str_to_housing_ratio = draw_rounded(rng, ratio);
    let yoy_supply_growth = draw_rounded(rng, YOY_SUPPLY_GROWTH_RANGE);
    SupplyMetrics {
        listings_per_thousand,
        str_to_housing_ratio,
        yoy_supply_growth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn has_one_decimal(value: f64) -> bool {
        ((value * 10.0).round() - value * 10.0).abs() < 1e-9
    }

    #[test]
    fn tiers_follow_population() {
        assert_eq!(supply_ranges(999), ((5.0, 30.0), (1.0, 6.0)));
        assert_eq!(supply_ranges(1_000), ((3.0, 20.0), (0.8, 4.0)));
        assert_eq!(supply_ranges(19_999), ((1.0, 10.0), (0.3, 3.0)));
        assert_eq!(supply_ranges(20_000), SUPPLY_METRO_TIER);
    }

    #[test]
    fn draws_are_rounded_and_bounded() {
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        for _ in 0..300 {
            let metrics = draw_supply(&mut rng, 600);
            assert!((5.0..=30.0).contains(&metrics.listings_per_thousand));
            assert!((1.0..=6.0).contains(&metrics.str_to_housing_ratio));
            assert!((1.0..=15.0).contains(&metrics.yoy_supply_growth));
            assert!(has_one_decimal(metrics.listings_per_thousand));
            assert!(has_one_decimal(metrics.yoy_supply_growth));
        }
    }

    #[test]
    fn saturation_risk_reflects_listings() {
        let metrics = SupplyMetrics {
            listings_per_thousand: 26.4,
            str_to_housing_ratio: 3.1,
            yoy_supply_growth: 7.5,
        };
        let risk = metrics.into_saturation_risk();
        assert_eq!(risk.risk_level, RiskLevel::VeryHigh);
        assert!((risk.str_to_housing_ratio - 3.1).abs() < f64::EPSILON);
    }
}
