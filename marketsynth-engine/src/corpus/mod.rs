//! Existing-corpus collaborators: parse, inspect, extend, and re-emit.
//!
//! The synthesis core never calls into this module. It exists for the batch
//! driver and the CLI, which need to skip identifiers already present, find
//! comparables per state, and splice new records into the corpus file.
mod parser;
pub mod reader;
pub mod writer;

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::format::{RECORD_INDENT, format_key, format_value};
use crate::numbers::trunc_f64_to_i64;

pub use parser::parse_literal;
pub use reader::{Comparable, StateComparables, existing_ids};
pub use writer::{CollisionPolicy, DedupSummary, InsertSummary, dedup_by_score, insert_records};

/// Declaration emitted for corpora built from scratch.
pub const DEFAULT_PREAMBLE: &str = "export const cityData: Record<string, CityData[]> = ";
const DEFAULT_TRAILER: &str = ";\n";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("no `export const <name> = {{ ... }}` declaration found")]
    MissingDeclaration,
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("corpus declaration must be an object keyed by state")]
    NotAnObject,
    #[error("state {state}: expected an array of records")]
    NotAnArray { state: String },
    #[error("failed to convert record: {0}")]
    Convert(#[from] serde_json::Error),
}

/// A parsed corpus file: state arrays plus the text surrounding the declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    /// Everything up to and including `export const NAME ... = `.
    pub preamble: String,
    pub binding: String,
    /// Records per state code; rendering emits states in sorted order.
    pub states: BTreeMap<String, Vec<Value>>,
    /// Everything after the closing brace, usually `;` and later exports.
    pub trailer: String,
}

impl Default for Corpus {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            binding: "cityData".to_string(),
            states: BTreeMap::new(),
            trailer: DEFAULT_TRAILER.to_string(),
        }
    }
}

impl Corpus {
    /// Parse a corpus file.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError` when the declaration is missing, the literal is
    /// malformed, or a state entry is not an array.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let declaration = parser::find_declaration(text)?;
        let (entries, end) = parser::parse_entries_at(text, declaration.body_start)?;
        let mut states: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for (state, records) in entries {
            let Value::Array(records) = records else {
                return Err(CorpusError::NotAnArray { state });
            };
            if let Some(existing) = states.get_mut(&state) {
                log::warn!(
                    target: crate::constants::LOG_TARGET_CORPUS,
                    "state {state} appears more than once; merging its arrays"
                );
                existing.extend(records);
            } else {
                states.insert(state, records);
            }
        }
        log::debug!(
            target: crate::constants::LOG_TARGET_CORPUS,
            "parsed corpus `{}` with {} states",
            declaration.binding,
            states.len()
        );
        Ok(Self {
            preamble: text[..declaration.body_start].to_string(),
            binding: declaration.binding,
            states,
            trailer: text[end..].to_string(),
        })
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.states.values().map(Vec::len).sum()
    }

    /// Every record with its state, in render order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.states
            .iter()
            .flat_map(|(state, records)| records.iter().map(move |record| (state.as_str(), record)))
    }

    /// Locate a record by identifier as `(state, index)`.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<(&str, usize)> {
        self.states.iter().find_map(|(state, records)| {
            records
                .iter()
                .position(|record| record_id(record) == Some(id))
                .map(|index| (state.as_str(), index))
        })
    }

    /// Re-emit the corpus with one record per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.record_count() * 1_024);
        out.push_str(&self.preamble);
        out.push_str("{\n");
        for (state, records) in &self.states {
            out.push_str("  ");
            out.push_str(&format_key(state));
            out.push_str(": [\n");
            for record in records {
                out.push_str(RECORD_INDENT);
                out.push_str(&format_value(record));
                out.push_str(",\n");
            }
            out.push_str("  ],\n");
        }
        out.push('}');
        out.push_str(&self.trailer);
        out
    }
}

/// Render a corpus back to text.
#[must_use]
pub fn render_corpus(corpus: &Corpus) -> String {
    corpus.render()
}

#[must_use]
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// `marketScore.overall`, or zero when the record carries none.
#[must_use]
pub fn record_overall(record: &Value) -> i64 {
    record
        .pointer("/marketScore/overall")
        .and_then(|overall| {
            overall
                .as_i64()
                .or_else(|| overall.as_f64().map(trunc_f64_to_i64))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) const SAMPLE: &str = "import type { CityData } from './types';\n\n\
export const cityData: Record<string, CityData[]> = {\n\
  WV: [\n\
    { id: 'wv-fayetteville', name: 'Fayetteville', population: 2892, rpr: 0.21, marketScore: { overall: 74, verdict: 'buy' }, highlights: ['New River Gorge'] },\n\
    { id: 'wv-ansted', name: 'Ansted', population: 1404, rpr: 0.18, marketScore: { overall: 61, verdict: 'hold' }, highlights: [] },\n\
  ],\n\
  // Florida\n\
  FL: [\n\
    { id: 'fl-micanopy', name: 'Micanopy', population: 600, rpr: 0.15, marketScore: { overall: 58, verdict: 'hold' }, highlights: [] },\n\
  ],\n\
};\n\nexport default cityData;\n";

    #[test]
    fn parses_states_and_surrounding_text() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        assert_eq!(corpus.binding, "cityData");
        assert_eq!(corpus.record_count(), 3);
        assert!(corpus.preamble.starts_with("import type"));
        assert!(corpus.preamble.ends_with("= "));
        assert_eq!(corpus.trailer, ";\n\nexport default cityData;\n");
        assert_eq!(corpus.position_of("wv-ansted"), Some(("WV", 1)));
        assert_eq!(corpus.position_of("ca-nowhere"), None);
    }

    #[test]
    fn render_sorts_states_and_reparses_identically() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        let rendered = corpus.render();
        let fl = rendered.find("  FL: [").unwrap();
        let wv = rendered.find("  WV: [").unwrap();
        assert!(fl < wv);
        assert!(rendered.contains("    { id: 'fl-micanopy', name: 'Micanopy', population: 600, rpr: 0.15, "));
        assert_eq!(Corpus::parse(&rendered).unwrap(), corpus);
    }

    #[test]
    fn repeated_state_arrays_are_merged_in_order() {
        let text = "export const cityData = {\n  WV: [{ id: 'wv-a' }],\n  FL: [{ id: 'fl-b' }],\n  WV: [{ id: 'wv-c' }],\n};\n";
        let corpus = Corpus::parse(text).unwrap();
        assert_eq!(corpus.record_count(), 3);
        assert_eq!(corpus.position_of("wv-a"), Some(("WV", 0)));
        assert_eq!(corpus.position_of("wv-c"), Some(("WV", 1)));
        let rendered = corpus.render();
        assert!(rendered.contains("{ id: 'wv-a' }"));
        assert_eq!(rendered.matches("  WV: [").count(), 1);
    }

    #[test]
    fn rejects_non_array_states() {
        let text = "export const cityData = { WV: { id: 'x' } };";
        assert!(matches!(
            Corpus::parse(text),
            Err(CorpusError::NotAnArray { state }) if state == "WV"
        ));
    }

    #[test]
    fn overall_defaults_to_zero() {
        assert_eq!(record_overall(&json!({ "marketScore": { "overall": 71 } })), 71);
        assert_eq!(record_overall(&json!({ "id": "x" })), 0);
        assert_eq!(record_id(&json!({ "id": "x" })), Some("x"));
    }

    #[test]
    fn default_corpus_renders_an_empty_declaration() {
        assert_eq!(
            render_corpus(&Corpus::default()),
            "export const cityData: Record<string, CityData[]> = {\n};\n"
        );
    }
}
