//! Corpus literal formatting.
//!
//! Records are emitted as single-line object literals with bare keys and
//! single-quoted strings, the layout the corpus file uses for every city.
use serde_json::Value;
use std::fmt::{Display, Write};

use crate::record::{
    AmenityDelta, DsiDetails, IncomeBySize, InvestmentMetrics, MarketRecord, MarketScore,
    RentalMetrics, SaturationRisk,
};

/// Indentation for one record line inside a state array.
pub const RECORD_INDENT: &str = "    ";

/// Escape a string for a single-quoted literal.
#[must_use]
pub fn escape_single_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", escape_single_quoted(value))
}

/// Shortest round-trip form that always keeps a fractional part.
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        "0.0".to_string()
    }
}

const fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Accumulates `key: value` pairs into a `{ ... }` literal.
struct ObjectLiteral {
    out: String,
    empty: bool,
}

impl ObjectLiteral {
    fn new() -> Self {
        Self {
            out: String::from("{ "),
            empty: true,
        }
    }

    fn raw(mut self, key: &str, value: impl Display) -> Self {
        if !self.empty {
            self.out.push_str(", ");
        }
        self.empty = false;
        let _ = write!(self.out, "{key}: {value}");
        self
    }

    fn text(self, key: &str, value: &str) -> Self {
        let quoted = quote(value);
        self.raw(key, quoted)
    }

    fn float(self, key: &str, value: f64) -> Self {
        let formatted = format_float(value);
        self.raw(key, formatted)
    }

    fn flag(self, key: &str, value: bool) -> Self {
        self.raw(key, format_bool(value))
    }

    fn finish(mut self) -> String {
        if self.empty {
            return "{}".to_string();
        }
        self.out.push_str(" }");
        self.out
    }
}

fn list(items: impl IntoIterator<Item = String>) -> String {
    format!("[{}]", items.into_iter().collect::<Vec<_>>().join(", "))
}

fn market_score(score: &MarketScore) -> String {
    ObjectLiteral::new()
        .raw("overall", score.overall)
        .raw("demand", score.demand)
        .raw("affordability", score.affordability)
        .raw("regulation", score.regulation)
        .raw("seasonality", score.seasonality)
        .raw("saturation", score.saturation)
        .raw("rpr", score.rpr)
        .text("verdict", score.verdict.as_str())
        .finish()
}

fn rental(rental: &RentalMetrics) -> String {
    ObjectLiteral::new()
        .raw("avgADR", rental.avg_adr)
        .raw("occupancyRate", rental.occupancy_rate)
        .raw("monthlyRevenue", rental.monthly_revenue)
        .raw("medianHomePrice", rental.median_home_price)
        .raw("revenue75thPercentile", rental.revenue_75th_percentile)
        .raw("revenue90thPercentile", rental.revenue_90th_percentile)
        .raw("mtrMonthlyIncome", rental.mtr_monthly_income)
        .finish()
}

fn saturation_risk(risk: &SaturationRisk) -> String {
    ObjectLiteral::new()
        .float("strToHousingRatio", risk.str_to_housing_ratio)
        .float("listingsPerThousand", risk.listings_per_thousand)
        .float("yoySupplyGrowth", risk.yoy_supply_growth)
        .text("riskLevel", risk.risk_level.as_str())
        .finish()
}

fn dsi_details(details: &DsiDetails) -> String {
    ObjectLiteral::new()
        .raw("monthlyMortgage", details.monthly_mortgage)
        .raw("monthlyExpenses", details.monthly_expenses)
        .raw("netMonthlyIncome", details.net_monthly_income)
        .flag("survives", details.survives)
        .finish()
}

fn investment_metrics(metrics: &InvestmentMetrics) -> String {
    ObjectLiteral::new()
        .float("rpr", metrics.rpr)
        .text("rprRating", metrics.rpr_rating.as_str())
        .flag("dsi", metrics.dsi)
        .raw("dsiDetails", dsi_details(&metrics.dsi_details))
        .finish()
}

fn income_by_size(income: &IncomeBySize) -> String {
    ObjectLiteral::new()
        .raw("oneBR", income.one_br)
        .raw("twoBR", income.two_br)
        .raw("threeBR", income.three_br)
        .raw("fourBR", income.four_br)
        .raw("fiveBR", income.five_br)
        .raw("sixPlusBR", income.six_plus_br)
        .text("bestPerformer", income.best_performer.as_str())
        .finish()
}

fn amenity_delta(delta: &AmenityDelta) -> String {
    let amenities = delta.top_amenities.iter().map(|amenity| {
        ObjectLiteral::new()
            .text("name", &amenity.name)
            .raw("revenueBoost", amenity.revenue_boost)
            .text("priority", amenity.priority.as_str())
            .finish()
    });
    ObjectLiteral::new()
        .raw("topAmenities", list(amenities))
        .text("marketType", delta.market_type.as_str())
        .finish()
}

/// Render a record as one indented corpus line.
#[must_use]
pub fn format_record(record: &MarketRecord) -> String {
    let body = ObjectLiteral::new()
        .text("id", &record.id)
        .text("name", &record.name)
        .text("county", &record.county)
        .text("type", &record.kind)
        .raw("population", record.population)
        .float("rpr", record.rpr)
        .flag("dsi", record.dsi)
        .raw("marketScore", market_score(&record.market_score))
        .raw("rental", rental(&record.rental))
        .raw("saturationRisk", saturation_risk(&record.saturation_risk))
        .raw(
            "investmentMetrics",
            investment_metrics(&record.investment_metrics),
        )
        .text("strStatus", record.str_status.as_str())
        .flag("permitRequired", record.permit_required)
        .raw("incomeBySize", income_by_size(&record.income_by_size))
        .raw("amenityDelta", amenity_delta(&record.amenity_delta))
        .raw("highlights", list(record.highlights.iter().map(|h| quote(h))))
        .finish();
    format!("{RECORD_INDENT}{body}")
}

/// Render an arbitrary parsed value in the same literal syntax.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => format_bool(*flag).to_string(),
        Value::Number(number) => {
            if number.is_f64() {
                number.as_f64().map_or_else(|| number.to_string(), format_float)
            } else {
                number.to_string()
            }
        }
        Value::String(text) => quote(text),
        Value::Array(items) => list(items.iter().map(format_value)),
        Value::Object(fields) => fields
            .iter()
            .fold(ObjectLiteral::new(), |literal, (key, field)| {
                literal.raw(&format_key(key), format_value(field))
            })
            .finish(),
    }
}

/// Bare identifier keys stay bare; anything else is quoted.
#[must_use]
pub fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$');
    if bare { key.to_string() } else { quote(key) }
}
