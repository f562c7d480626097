//! Centralized calibration constants for the synthesis pipeline.
//!
//! Table-shaped calibration (per state, per market type) lives in the bundled
//! JSON asset. The values here are the fixed formula parameters: population
//! tiers, score bands, weights, and the mortgage assumptions. Changing them
//! changes every synthesized record, so they only move through code review.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SYNTH: &str = "marketsynth::synth";
pub(crate) const LOG_TARGET_CALIBRATION: &str = "marketsynth::calibration";
pub(crate) const LOG_TARGET_CORPUS: &str = "marketsynth::corpus";

// Price --------------------------------------------------------------------
pub(crate) const PRICE_FLOOR: i64 = 125_000;
pub(crate) const PRICE_CEILING: i64 = 1_200_000;
pub(crate) const PRICE_ROUNDING_STEP: f64 = 1_000.0;
pub(crate) const PRICE_JITTER_MIN: f64 = 0.85;
pub(crate) const PRICE_JITTER_MAX: f64 = 1.15;
pub(crate) const PARK_PRICE_MULTIPLIER: f64 = 1.15;
/// `(exclusive population ceiling, price multiplier)`, smallest towns first.
pub(crate) const POPULATION_PRICE_TIERS: &[(u32, f64)] = &[
    (500, 0.55),
    (2_000, 0.65),
    (5_000, 0.75),
    (15_000, 0.85),
    (50_000, 0.95),
];
pub(crate) const METRO_PRICE_MULTIPLIER: f64 = 1.05;

// Rate & occupancy ---------------------------------------------------------
pub(crate) const PARK_ADR_MULTIPLIER: f64 = 1.1;
pub(crate) const HAMLET_POPULATION: u32 = 500;
pub(crate) const SMALL_TOWN_POPULATION: u32 = 5_000;
pub(crate) const SMALL_TOWN_ADR_CEILING_FACTOR: f64 = 0.85;
pub(crate) const TOWN_ADR_FLOOR_FACTOR: f64 = 0.9;
pub(crate) const PARK_OCCUPANCY_LIFT: i32 = 5;
pub(crate) const BILLABLE_DAYS_PER_MONTH: f64 = 30.0;

// Revenue extras -----------------------------------------------------------
pub(crate) const REVENUE_P75_FACTOR: f64 = 1.30;
pub(crate) const REVENUE_P90_FACTOR: f64 = 1.60;
pub(crate) const MTR_INCOME_FACTOR: f64 = 0.70;

// Investment ratios --------------------------------------------------------
pub(crate) const RPR_FLOOR: f64 = 0.05;
pub(crate) const RPR_CEILING: f64 = 0.35;
pub(crate) const RPR_ZERO_PRICE_FALLBACK: f64 = 0.1;
pub(crate) const RPR_DECIMALS: i32 = 3;
pub(crate) const LOAN_TO_VALUE: f64 = 0.80;
pub(crate) const MORTGAGE_ANNUAL_RATE: f64 = 0.07;
pub(crate) const MORTGAGE_TERM_MONTHS: i32 = 360;
pub(crate) const OPERATING_EXPENSE_RATIO: f64 = 0.35;

// Sub-scores ---------------------------------------------------------------
pub(crate) const DEMAND_BASE: i32 = 55;
pub(crate) const DEMAND_PARK_BONUS: (i32, i32) = (10, 25);
pub(crate) const DEMAND_DESTINATION_BONUS: (i32, i32) = (5, 15);
pub(crate) const DEMAND_JITTER: (i32, i32) = (-10, 10);
pub(crate) const DEMAND_FLOOR: i32 = 30;
pub(crate) const DEMAND_CEILING: i32 = 95;

/// `(exclusive price ceiling, score range)`, cheapest band first.
pub(crate) const AFFORDABILITY_BANDS: &[(i64, (i32, i32))] = &[
    (200_000, (78, 92)),
    (300_000, (65, 82)),
    (450_000, (45, 68)),
    (600_000, (25, 48)),
];
pub(crate) const AFFORDABILITY_LUXURY_RANGE: (i32, i32) = (15, 35);

pub(crate) const REGULATION_RANGE: (i32, i32) = (72, 90);

/// `(exclusive listings-per-thousand floor, score range)`, densest tier first.
pub(crate) const SATURATION_SCORE_TIERS: &[(f64, (i32, i32))] =
    &[(25.0, (10, 25)), (15.0, (20, 40)), (8.0, (35, 60))];
pub(crate) const SATURATION_LOW_RISK_RANGE: (i32, i32) = (55, 80);

/// `(inclusive RPR floor, score range)`, strongest band first.
pub(crate) const RPR_SCORE_BANDS: &[(f64, (i32, i32))] =
    &[(0.18, (75, 95)), (0.15, (60, 78)), (0.12, (35, 62))];
pub(crate) const RPR_SCORE_POOR_RANGE: (i32, i32) = (10, 38);

pub(crate) const WEIGHT_DEMAND: f64 = 0.25;
pub(crate) const WEIGHT_AFFORDABILITY: f64 = 0.25;
pub(crate) const WEIGHT_REGULATION: f64 = 0.10;
pub(crate) const WEIGHT_SEASONALITY: f64 = 0.15;
pub(crate) const WEIGHT_SATURATION: f64 = 0.10;
pub(crate) const WEIGHT_RPR: f64 = 0.15;
pub(crate) const OVERALL_FLOOR: i32 = 25;
pub(crate) const OVERALL_CEILING: i32 = 95;

// Verdict and classification thresholds -----------------------------------
pub(crate) const VERDICT_STRONG_BUY: u8 = 78;
pub(crate) const VERDICT_BUY: u8 = 65;
pub(crate) const VERDICT_HOLD: u8 = 52;
pub(crate) const VERDICT_CAUTION: u8 = 40;
pub(crate) const RISK_VERY_HIGH_LPT: f64 = 25.0;
pub(crate) const RISK_HIGH_LPT: f64 = 15.0;
pub(crate) const RISK_MODERATE_LPT: f64 = 8.0;
pub(crate) const RPR_ELITE: f64 = 0.18;
pub(crate) const RPR_GOOD: f64 = 0.15;
pub(crate) const RPR_MARGINAL: f64 = 0.12;

// Supply -------------------------------------------------------------------
/// `(exclusive population ceiling, listings-per-thousand range, STR ratio range)`.
pub(crate) const SUPPLY_TIERS: &[(u32, (f64, f64), (f64, f64))] = &[
    (1_000, (5.0, 30.0), (1.0, 6.0)),
    (5_000, (3.0, 20.0), (0.8, 4.0)),
    (20_000, (1.0, 10.0), (0.3, 3.0)),
];
pub(crate) const SUPPLY_METRO_TIER: ((f64, f64), (f64, f64)) = ((0.5, 5.0), (0.2, 2.0));
pub(crate) const YOY_SUPPLY_GROWTH_RANGE: (f64, f64) = (1.0, 15.0);
pub(crate) const SUPPLY_DECIMALS: i32 = 1;

// Income by size & regulation ----------------------------------------------
/// Monthly income multiples of the three-bedroom baseline, one through six-plus.
pub(crate) const BEDROOM_REVENUE_MULTIPLIERS: [f64; 6] = [0.35, 0.65, 1.0, 1.45, 1.80, 2.15];
/// Permit requirement odds as `(numerator, denominator)`.
pub(crate) const PERMIT_REQUIRED_ODDS: (u32, u32) = (3, 4);
