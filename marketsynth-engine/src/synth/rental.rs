//! Nightly rate, occupancy, and revenue stage.
use rand::Rng;

use crate::calibration::{Band, IntBand};
use crate::constants::{
    BILLABLE_DAYS_PER_MONTH, HAMLET_POPULATION, MTR_INCOME_FACTOR, PARK_ADR_MULTIPLIER,
    PARK_OCCUPANCY_LIFT, REVENUE_P75_FACTOR, REVENUE_P90_FACTOR, SMALL_TOWN_ADR_CEILING_FACTOR,
    SMALL_TOWN_POPULATION, TOWN_ADR_FLOOR_FACTOR,
};
use crate::numbers::{clamp_i64_to_u32, i64_to_f64, trunc_f64_to_i64};
use crate::synth::uniform;

/// How the ADR draw window is carved out of the market's band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdrSampling {
    /// Hamlets draw from the lower half of the band.
    MidpointCapped,
    /// Small towns lose the top of the band.
    SmallTown,
    /// Larger towns lose a little of the bottom of the band.
    Town,
}

impl AdrSampling {
    #[must_use]
    pub const fn for_population(population: u32) -> Self {
        if population < HAMLET_POPULATION {
            Self::MidpointCapped
        } else if population < SMALL_TOWN_POPULATION {
            Self::SmallTown
        } else {
            Self::Town
        }
    }

    #[must_use]
    pub fn window(self, band: Band) -> Band {
        match self {
            Self::MidpointCapped => Band::new(band.low, band.midpoint()),
            Self::SmallTown => Band::new(band.low, band.high * SMALL_TOWN_ADR_CEILING_FACTOR),
            Self::Town => Band::new(band.low * TOWN_ADR_FLOOR_FACTOR, band.high),
        }
    }
}

/// ADR band for the market, lifted and truncated for park gateways.
#[must_use]
pub fn adr_band(band: Band, near_park: bool) -> Band {
    if near_park {
        Band::new(
            (band.low * PARK_ADR_MULTIPLIER).trunc(),
            (band.high * PARK_ADR_MULTIPLIER).trunc(),
        )
    } else {
        band
    }
}

pub fn draw_adr<R: Rng + ?Sized>(rng: &mut R, band: Band, population: u32) -> u32 {
    let window = AdrSampling::for_population(population).window(band);
    clamp_i64_to_u32(trunc_f64_to_i64(uniform(rng, window.low, window.high)))
}

/// Occupancy band for the market; park gateways raise the floor toward the ceiling.
#[must_use]
pub fn occupancy_band(band: IntBand, near_park: bool) -> IntBand {
    if near_park {
        let low = (band.low + PARK_OCCUPANCY_LIFT).min(band.high - PARK_OCCUPANCY_LIFT);
        IntBand::new(low, band.high)
    } else {
        band
    }
}

pub fn draw_occupancy<R: Rng + ?Sized>(rng: &mut R, band: IntBand) -> u8 {
    let drawn = uniform(rng, f64::from(band.low), f64::from(band.high));
    u8::try_from(trunc_f64_to_i64(drawn).clamp(0, 100)).unwrap_or(0)
}

/// Monthly gross: nightly rate times occupied nights in a 30-day month.
#[must_use]
pub fn monthly_revenue(avg_adr: u32, occupancy_rate: u8) -> i64 {
    trunc_f64_to_i64(
        f64::from(avg_adr) * (f64::from(occupancy_rate) / 100.0) * BILLABLE_DAYS_PER_MONTH,
    )
}

/// Revenue figures derived directly from the monthly gross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueExtras {
    pub percentile_75: i64,
    pub percentile_90: i64,
    pub mtr_monthly_income: i64,
}

impl RevenueExtras {
    #[must_use]
    pub fn from_revenue(monthly_revenue: i64) -> Self {
        let revenue = i64_to_f64(monthly_revenue);
        Self {
            percentile_75: trunc_f64_to_i64(revenue * REVENUE_P75_FACTOR),
            percentile_90: trunc_f64_to_i64(revenue * REVENUE_P90_FACTOR),
            mtr_monthly_income: trunc_f64_to_i64(revenue * MTR_INCOME_FACTOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn park_lift_truncates_adr_bounds() {
        let lifted = adr_band(Band::new(95.0, 200.0), true);
        assert_eq!(lifted, Band::new(104.0, 220.0));
        assert_eq!(adr_band(Band::new(95.0, 200.0), false), Band::new(95.0, 200.0));
    }

    #[test]
    fn sampling_window_depends_on_population() {
        let band = Band::new(100.0, 200.0);
        assert_eq!(AdrSampling::for_population(30), AdrSampling::MidpointCapped);
        assert_eq!(AdrSampling::for_population(500), AdrSampling::SmallTown);
        assert_eq!(AdrSampling::for_population(5_000), AdrSampling::Town);
        assert_eq!(AdrSampling::MidpointCapped.window(band), Band::new(100.0, 150.0));
        assert_eq!(AdrSampling::SmallTown.window(band), Band::new(100.0, 170.0));
        assert_eq!(AdrSampling::Town.window(band), Band::new(90.0, 200.0));
    }

    #[test]
    fn hamlet_adr_never_exceeds_midpoint() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for _ in 0..500 {
            let adr = draw_adr(&mut rng, Band::new(95.0, 200.0), 30);
            assert!((95..=147).contains(&adr), "adr {adr} escaped the hamlet window");
        }
    }

    #[test]
    fn park_occupancy_raises_floor_without_crossing_ceiling() {
        assert_eq!(occupancy_band(IntBand::new(35, 55), true), IntBand::new(40, 55));
        assert_eq!(occupancy_band(IntBand::new(50, 58), true), IntBand::new(53, 58));
        assert_eq!(occupancy_band(IntBand::new(35, 55), false), IntBand::new(35, 55));
    }

    #[test]
    fn occupancy_draws_stay_in_band() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..500 {
            let occupancy = draw_occupancy(&mut rng, IntBand::new(40, 55));
            assert!((40..=55).contains(&occupancy));
        }
    }

    #[test]
    fn revenue_and_extras_truncate() {
        assert_eq!(monthly_revenue(168, 47), 2_368);
        assert_eq!(monthly_revenue(0, 60), 0);
        let extras = RevenueExtras::from_revenue(2_368);
        assert_eq!(extras.percentile_75, 3_078);
        assert_eq!(extras.percentile_90, 3_788);
        assert_eq!(extras.mtr_monthly_income, 1_657);
    }
}
