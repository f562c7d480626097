//! Median home price stage.
use rand::Rng;

use crate::constants::{
    METRO_PRICE_MULTIPLIER, PARK_PRICE_MULTIPLIER, POPULATION_PRICE_TIERS, PRICE_CEILING,
    PRICE_FLOOR, PRICE_JITTER_MAX, PRICE_JITTER_MIN, PRICE_ROUNDING_STEP,
};
use crate::numbers::{i64_to_f64, round_to_step};
use crate::synth::uniform;

/// Price multiplier for a population tier; smaller towns are cheaper.
#[must_use]
pub fn population_price_multiplier(population: u32) -> f64 {
    POPULATION_PRICE_TIERS
        .iter()
        .find(|(ceiling, _)| population < *ceiling)
        .map_or(METRO_PRICE_MULTIPLIER, |(_, multiplier)| *multiplier)
}

#[must_use]
pub const fn park_price_multiplier(near_park: bool) -> f64 {
    if near_park { PARK_PRICE_MULTIPLIER } else { 1.0 }
}

/// Price before jitter: state baseline scaled by market, size and park proximity.
#[must_use]
pub fn base_price(
    state_baseline: i64,
    market_multiplier: f64,
    population: u32,
    near_park: bool,
) -> f64 {
    i64_to_f64(state_baseline)
        * market_multiplier
        * population_price_multiplier(population)
        * park_price_multiplier(near_park)
}

/// Round to the nearest thousand and clamp into the supported price range.
#[must_use]
pub fn finalize_price(raw: f64) -> i64 {
    round_to_step(raw, PRICE_ROUNDING_STEP).clamp(PRICE_FLOOR, PRICE_CEILING)
}

/// Lowest and highest prices the jitter can produce for a base price.
#[must_use]
pub fn price_envelope(base: f64) -> (i64, i64) {
    (
        finalize_price(base * PRICE_JITTER_MIN),
        finalize_price(base * PRICE_JITTER_MAX),
    )
}

pub fn draw_median_home_price<R: Rng + ?Sized>(rng: &mut R, base: f64) -> i64 {
    let jitter = uniform(rng, PRICE_JITTER_MIN, PRICE_JITTER_MAX);
    finalize_price(base * jitter)
}
