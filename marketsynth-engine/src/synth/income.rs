//! Income by bedroom count.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::BEDROOM_REVENUE_MULTIPLIERS;
use crate::market::BedroomSize;
use crate::numbers::{i64_to_f64, trunc_f64_to_i64};
use crate::record::IncomeBySize;

/// Pick the best-performing configuration from the market's candidates.
pub fn draw_best_performer<R: Rng + ?Sized>(rng: &mut R, candidates: &[BedroomSize]) -> BedroomSize {
    candidates.choose(rng).copied().unwrap_or(BedroomSize::Three)
}

/// Scale the three-bedroom baseline across every configuration.
#[must_use]
pub fn income_by_size(monthly_revenue: i64, best_performer: BedroomSize) -> IncomeBySize {
    let revenue = i64_to_f64(monthly_revenue);
    let [one, two, _, four, five, six] =
        BEDROOM_REVENUE_MULTIPLIERS.map(|multiplier| trunc_f64_to_i64(revenue * multiplier));
    IncomeBySize {
        one_br: one,
        two_br: two,
        three_br: monthly_revenue,
        four_br: four,
        five_br: five,
        six_plus_br: six,
        best_performer,
    }
}
