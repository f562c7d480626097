//! Investment ratios: revenue-to-price and debt survivability.
//!
//! Nothing here draws from the stream; every value is recomputed from the
//! revenue and price produced by earlier stages.
use crate::constants::{
    LOAN_TO_VALUE, MORTGAGE_ANNUAL_RATE, MORTGAGE_TERM_MONTHS, OPERATING_EXPENSE_RATIO,
    RPR_CEILING, RPR_DECIMALS, RPR_FLOOR, RPR_ZERO_PRICE_FALLBACK,
};
use crate::numbers::{i64_to_f64, round_to_places, trunc_f64_to_i64};
use crate::record::DsiDetails;

/// Annual revenue over price, or `None` when there is no positive price.
#[must_use]
pub fn raw_revenue_to_price(monthly_revenue: i64, median_home_price: i64) -> Option<f64> {
    (median_home_price > 0)
        .then(|| i64_to_f64(monthly_revenue) * 12.0 / i64_to_f64(median_home_price))
}

/// Rounded and clamped revenue-to-price ratio.
#[must_use]
pub fn revenue_to_price_ratio(monthly_revenue: i64, median_home_price: i64) -> f64 {
    raw_revenue_to_price(monthly_revenue, median_home_price)
        .map_or(RPR_ZERO_PRICE_FALLBACK, |ratio| {
            round_to_places(ratio, RPR_DECIMALS)
        })
        .clamp(RPR_FLOOR, RPR_CEILING)
}

/// Fixed-rate amortized payment on the financed share of the price.
#[must_use]
pub fn monthly_mortgage(median_home_price: i64) -> i64 {
    let principal = i64_to_f64(median_home_price) * LOAN_TO_VALUE;
    let rate = MORTGAGE_ANNUAL_RATE / 12.0;
    let growth = (1.0 + rate).powi(MORTGAGE_TERM_MONTHS);
    trunc_f64_to_i64(principal * rate * growth / (growth - 1.0))
}

#[must_use]
pub fn debt_survivability(monthly_revenue: i64, median_home_price: i64) -> DsiDetails {
    let monthly_mortgage = monthly_mortgage(median_home_price);
    let monthly_expenses =
        trunc_f64_to_i64(i64_to_f64(monthly_revenue) * OPERATING_EXPENSE_RATIO);
    let net_monthly_income = monthly_revenue - monthly_mortgage - monthly_expenses;
    DsiDetails {
        monthly_mortgage,
        monthly_expenses,
        net_monthly_income,
        survives: net_monthly_income > 0,
    }
}
