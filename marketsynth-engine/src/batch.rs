//! Batch driver: synthesize many descriptors and group the results by state.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::LOG_TARGET_SYNTH;
use crate::corpus::StateComparables;
use crate::descriptor::{CityDescriptor, DescriptorError};
use crate::format::format_record;
use crate::record::MarketRecord;
use crate::seed::SeedSource;
use crate::synth::Synthesizer;

/// A synthesized record together with the state it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedCity {
    pub state: String,
    pub record: MarketRecord,
}

/// A descriptor that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub id: String,
    pub error: DescriptorError,
}

/// Outcome of one batch: successes, rejections, and skipped identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub cities: Vec<SynthesizedCity>,
    pub rejections: Vec<Rejection>,
    /// Identifiers already present in the corpus.
    pub skipped: Vec<String>,
}

impl BatchReport {
    #[must_use]
    pub fn has_rejections(&self) -> bool {
        !self.rejections.is_empty()
    }

    /// Records grouped by state code, input order kept within each state.
    #[must_use]
    pub fn by_state(&self) -> BTreeMap<&str, Vec<&MarketRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&MarketRecord>> = BTreeMap::new();
        for city in &self.cities {
            grouped.entry(city.state.as_str()).or_default().push(&city.record);
        }
        grouped
    }

    /// `(state, record)` pairs in input order, ready for corpus insertion.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &MarketRecord)> {
        self.cities
            .iter()
            .map(|city| (city.state.as_str(), &city.record))
    }

    /// Render the grouped block: a `// STATE:` header per state followed by its lines.
    #[must_use]
    pub fn render_entries(&self) -> String {
        let mut lines = Vec::with_capacity(self.cities.len() + 8);
        for (state, records) in self.by_state() {
            lines.push(format!("// STATE: {state} ({} new cities)", records.len()));
            lines.extend(records.into_iter().map(format_record));
        }
        lines.join("\n")
    }
}

/// Synthesize every descriptor not already present in `existing_ids`.
///
/// Invalid descriptors are collected as rejections and never abort the batch.
/// When `comparables` is given, states without any known markets are
/// reported once; the comparables never feed the formulas.
pub fn synthesize_batch<S: SeedSource>(
    synthesizer: &Synthesizer<'_, S>,
    descriptors: &[CityDescriptor],
    existing_ids: &BTreeSet<String>,
    comparables: Option<&StateComparables>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut reported_states = BTreeSet::new();
    for descriptor in descriptors {
        if existing_ids.contains(descriptor.id.trim()) {
            log::debug!(
                target: LOG_TARGET_SYNTH,
                "{}: already in corpus; skipping",
                descriptor.id
            );
            report.skipped.push(descriptor.id.trim().to_string());
            continue;
        }
        let state = descriptor.state_code();
        if let Some(comparables) = comparables {
            note_comparables(comparables, descriptor, &state, &mut reported_states);
        }
        match synthesizer.synthesize(descriptor) {
            Ok(record) => report.cities.push(SynthesizedCity { state, record }),
            Err(error) => {
                log::warn!(target: LOG_TARGET_SYNTH, "rejected descriptor: {error}");
                report.rejections.push(Rejection {
                    id: descriptor.id.clone(),
                    error,
                });
            }
        }
    }
    log::info!(
        target: LOG_TARGET_SYNTH,
        "batch complete: {} synthesized, {} rejected, {} skipped",
        report.cities.len(),
        report.rejections.len(),
        report.skipped.len()
    );
    report
}

fn note_comparables(
    comparables: &StateComparables,
    descriptor: &CityDescriptor,
    state: &str,
    reported_states: &mut BTreeSet<String>,
) {
    if !comparables.has_state(state) {
        if reported_states.insert(state.to_string()) {
            log::warn!(
                target: LOG_TARGET_SYNTH,
                "no comparables in corpus for state {state}; using calibration tables only"
            );
        }
        return;
    }
    let same_market = comparables
        .same_market(state, &descriptor.market_type)
        .count();
    log::debug!(
        target: LOG_TARGET_SYNTH,
        "{}: {} comparables in {state}, {same_market} of type {}",
        descriptor.id,
        comparables.for_state(state).len(),
        descriptor.market_type
    );
}
