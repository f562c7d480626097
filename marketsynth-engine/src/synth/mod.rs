//! Metric synthesis pipeline.
//!
//! A descriptor is expanded into a [`MarketRecord`] through a fixed sequence
//! of stages. Each stage reads only the outputs of earlier stages and draws
//! from the same per-identifier stream, so the order of draws below is part
//! of the output contract: reordering stages changes every record.
//!
//! 1. price
//! 2. nightly rate and occupancy
//! 3. monthly revenue and its derived extras
//! 4. investment ratios (no draws)
//! 5. demand, affordability, regulation and seasonality sub-scores
//! 6. supply-side metrics, then the saturation and RPR sub-scores
//! 7. overall score and verdict (no draws)
//! 8. permit flag, best performer, income by size and amenities
pub mod income;
pub mod investment;
pub mod pricing;
pub mod rental;
pub mod scoring;
pub mod supply;

use rand::Rng;

use crate::calibration::CalibrationTables;
use crate::constants::{LOG_TARGET_SYNTH, PERMIT_REQUIRED_ODDS};
use crate::descriptor::{CityDescriptor, DescriptorError};
use crate::market::{RprRating, StrStatus};
use crate::numbers::clamp_i64_to_u32;
use crate::record::{AmenityDelta, CITY_KIND, InvestmentMetrics, MarketRecord, RentalMetrics};
use crate::seed::{HmacSeedSource, SeedSource};

pub use scoring::SubScores;
pub use supply::SupplyMetrics;

/// Continuous uniform draw over `[low, high)`; swapped bounds are reordered.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    low + (high - low) * rng.r#gen::<f64>()
}

/// Inclusive integer draw; swapped bounds are reordered.
pub(crate) fn int_between<R: Rng + ?Sized>(rng: &mut R, (low, high): (i32, i32)) -> i32 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    rng.gen_range(low..=high)
}

/// Synthesizer bound to one set of calibration tables and a seed source.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a, S = HmacSeedSource> {
    tables: &'a CalibrationTables,
    seeds: S,
}

impl<'a> Synthesizer<'a, HmacSeedSource> {
    #[must_use]
    pub const fn new(tables: &'a CalibrationTables) -> Self {
        Self {
            tables,
            seeds: HmacSeedSource,
        }
    }
}

impl<'a, S: SeedSource> Synthesizer<'a, S> {
    #[must_use]
    pub const fn with_seed_source(tables: &'a CalibrationTables, seeds: S) -> Self {
        Self { tables, seeds }
    }

    #[must_use]
    pub const fn tables(&self) -> &'a CalibrationTables {
        self.tables
    }

    /// Validate a descriptor and synthesize its record from the identifier's stream.
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError` when the descriptor fails validation.
    pub fn synthesize(&self, descriptor: &CityDescriptor) -> Result<MarketRecord, DescriptorError> {
        let population = descriptor.validate()?;
        let mut rng = self.seeds.stream_for(descriptor.id.trim());
        Ok(run_pipeline(descriptor, population, self.tables, &mut rng))
    }
}

/// Validate and synthesize with the default identifier-seeded stream.
///
/// # Errors
///
/// Returns `DescriptorError` when the descriptor fails validation.
pub fn synthesize(
    descriptor: &CityDescriptor,
    tables: &CalibrationTables,
) -> Result<MarketRecord, DescriptorError> {
    Synthesizer::new(tables).synthesize(descriptor)
}

/// Run the pipeline over an explicit stream without validating the descriptor.
///
/// Populations outside the `u32` range saturate at its bounds. The record id
/// is the trimmed descriptor id.
pub fn synthesize_with<R: Rng + ?Sized>(
    descriptor: &CityDescriptor,
    tables: &CalibrationTables,
    rng: &mut R,
) -> MarketRecord {
    let population = clamp_i64_to_u32(descriptor.population);
    run_pipeline(descriptor, population, tables, rng)
}

fn run_pipeline<R: Rng + ?Sized>(
    descriptor: &CityDescriptor,
    population: u32,
    tables: &CalibrationTables,
    rng: &mut R,
) -> MarketRecord {
    let market = &descriptor.market_type;
    let profile = tables.profile(market);
    let near_park = descriptor.is_near_park();

    let base_price = pricing::base_price(
        tables.state_price(&descriptor.state),
        profile.price_multiplier,
        population,
        near_park,
    );
    let median_home_price = pricing::draw_median_home_price(rng, base_price);
    log::debug!(
        target: LOG_TARGET_SYNTH,
        "{}: base price {base_price:.0} -> median {median_home_price}",
        descriptor.id
    );

    let adr_band = rental::adr_band(profile.adr, near_park);
    let avg_adr = rental::draw_adr(rng, adr_band, population);
    let occupancy_band = rental::occupancy_band(profile.occupancy, near_park);
    let occupancy_rate = rental::draw_occupancy(rng, occupancy_band);
    let monthly_revenue = rental::monthly_revenue(avg_adr, occupancy_rate);
    let extras = rental::RevenueExtras::from_revenue(monthly_revenue);
    log::debug!(
        target: LOG_TARGET_SYNTH,
        "{}: adr {avg_adr} occupancy {occupancy_rate}% revenue {monthly_revenue}",
        descriptor.id
    );

    let rpr = investment::revenue_to_price_ratio(monthly_revenue, median_home_price);
    let dsi_details = investment::debt_survivability(monthly_revenue, median_home_price);

    let demand = scoring::demand_score(rng, near_park, market);
    let affordability = scoring::affordability_score(rng, median_home_price);
    let regulation = scoring::regulation_score(rng);
    let seasonality = scoring::seasonality_score(rng, profile.seasonality);
    let supply = supply::draw_supply(rng, population);
    let saturation = scoring::saturation_score(rng, supply.listings_per_thousand);
    let rpr_score = scoring::rpr_score(rng, rpr);

    let scores = SubScores {
        demand,
        affordability,
        regulation,
        seasonality,
        saturation,
        rpr: rpr_score,
    };
    let market_score = scores.into_market_score();
    log::debug!(
        target: LOG_TARGET_SYNTH,
        "{}: overall {} ({}) rpr {rpr} dsi {}",
        descriptor.id,
        market_score.overall,
        market_score.verdict,
        dsi_details.survives
    );

    let (numerator, denominator) = PERMIT_REQUIRED_ODDS;
    let permit_required = rng.gen_ratio(numerator, denominator);
    let best_performer = income::draw_best_performer(rng, &profile.best_performers);
    let income_by_size = income::income_by_size(monthly_revenue, best_performer);

    MarketRecord {
        id: descriptor.id.trim().to_string(),
        name: descriptor.name.clone(),
        county: descriptor.county.clone(),
        kind: CITY_KIND.to_string(),
        population,
        rpr,
        dsi: dsi_details.survives,
        market_score,
        rental: RentalMetrics {
            avg_adr,
            occupancy_rate,
            monthly_revenue,
            median_home_price,
            revenue_75th_percentile: extras.percentile_75,
            revenue_90th_percentile: extras.percentile_90,
            mtr_monthly_income: extras.mtr_monthly_income,
        },
        saturation_risk: supply.into_saturation_risk(),
        investment_metrics: InvestmentMetrics {
            rpr,
            rpr_rating: RprRating::from_rpr(rpr),
            dsi: dsi_details.survives,
            dsi_details,
        },
        str_status: StrStatus::Legal,
        permit_required,
        income_by_size,
        amenity_delta: AmenityDelta {
            top_amenities: tables.amenities(market).to_vec(),
            market_type: market.clone(),
        },
        highlights: descriptor.highlights.clone(),
    }
}
