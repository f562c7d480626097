//! Write-side corpus operations: insertion and merge-by-score cleanup.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Corpus, CorpusError, record_id, record_overall};
use crate::constants::LOG_TARGET_CORPUS;
use crate::record::MarketRecord;

/// What to do when an inserted record's identifier already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep whichever record scores higher; ties keep the existing one.
    #[default]
    KeepHigherScore,
    KeepExisting,
    Replace,
}

impl CollisionPolicy {
    fn replaces(self, existing: &Value, incoming: &Value) -> bool {
        match self {
            Self::KeepHigherScore => record_overall(incoming) > record_overall(existing),
            Self::KeepExisting => false,
            Self::Replace => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    pub inserted: usize,
    pub replaced: Vec<String>,
    pub kept_existing: Vec<String>,
    pub created_states: Vec<String>,
}

/// Append records to their state arrays, creating arrays for new states.
///
/// Identifiers already in the corpus are resolved in place by `policy`.
///
/// # Errors
///
/// Returns `CorpusError::Convert` if a record cannot be converted to a value.
pub fn insert_records<'r, I>(
    corpus: &mut Corpus,
    entries: I,
    policy: CollisionPolicy,
) -> Result<InsertSummary, CorpusError>
where
    I: IntoIterator<Item = (&'r str, &'r MarketRecord)>,
{
    let mut summary = InsertSummary::default();
    for (state, record) in entries {
        let incoming = serde_json::to_value(record)?;
        if let Some((found_state, index)) = corpus
            .position_of(&record.id)
            .map(|(found, index)| (found.to_string(), index))
        {
            let Some(existing) = corpus
                .states
                .get_mut(&found_state)
                .and_then(|records| records.get_mut(index))
            else {
                continue;
            };
            if policy.replaces(existing, &incoming) {
                *existing = incoming;
                summary.replaced.push(record.id.clone());
            } else {
                summary.kept_existing.push(record.id.clone());
            }
            continue;
        }
        let code = state.trim().to_ascii_uppercase();
        if !corpus.states.contains_key(&code) {
            log::warn!(
                target: LOG_TARGET_CORPUS,
                "state {code} not present in corpus; creating it"
            );
            summary.created_states.push(code.clone());
        }
        corpus.states.entry(code).or_default().push(incoming);
        summary.inserted += 1;
    }
    log::info!(
        target: LOG_TARGET_CORPUS,
        "inserted {} records ({} replaced, {} kept existing)",
        summary.inserted,
        summary.replaced.len(),
        summary.kept_existing.len()
    );
    Ok(summary)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupSummary {
    /// Identifiers that had more than one record.
    pub duplicated_ids: Vec<String>,
    pub removed: usize,
}

/// Collapse duplicate identifiers to their highest-scoring record.
///
/// Ties keep the earliest record in render order. Surviving records keep
/// their positions; records without an identifier are never touched.
pub fn dedup_by_score(corpus: &mut Corpus) -> DedupSummary {
    let mut best: HashMap<String, ((usize, usize), i64)> = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (state_index, records) in corpus.states.values().enumerate() {
        for (index, record) in records.iter().enumerate() {
            let Some(id) = record_id(record) else {
                continue;
            };
            *counts.entry(id.to_string()).or_default() += 1;
            let score = record_overall(record);
            best.entry(id.to_string())
                .and_modify(|(position, best_score)| {
                    if score > *best_score {
                        *position = (state_index, index);
                        *best_score = score;
                    }
                })
                .or_insert(((state_index, index), score));
        }
    }

    let mut duplicated_ids: Vec<String> = counts
        .into_iter()
        .filter_map(|(id, count)| (count > 1).then_some(id))
        .collect();
    duplicated_ids.sort_unstable();

    let mut removed = 0;
    for (state_index, records) in corpus.states.values_mut().enumerate() {
        let mut index = 0;
        records.retain(|record| {
            let position = (state_index, index);
            index += 1;
            let keep = record_id(record)
                .and_then(|id| best.get(id))
                .is_none_or(|(winner, _)| *winner == position);
            if !keep {
                removed += 1;
            }
            keep
        });
    }
    if removed > 0 {
        log::info!(
            target: LOG_TARGET_CORPUS,
            "removed {removed} duplicate records across {} identifiers",
            duplicated_ids.len()
        );
    }
    DedupSummary {
        duplicated_ids,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationTables;
    use crate::corpus::tests::SAMPLE;
    use crate::corpus::existing_ids;
    use crate::descriptor::CityDescriptor;
    use crate::market::MarketType;
    use crate::synth::synthesize;
    use serde_json::json;

    fn record(id: &str, state: &str) -> MarketRecord {
        let descriptor = CityDescriptor::new(id, "Sample", state, 3_100, MarketType::Mountain);
        synthesize(&descriptor, CalibrationTables::shared()).unwrap()
    }

    fn with_overall(mut record: MarketRecord, overall: u8) -> MarketRecord {
        record.market_score.overall = overall;
        record
    }

    #[test]
    fn inserts_into_existing_and_new_states() {
        let mut corpus = Corpus::parse(SAMPLE).unwrap();
        let thurmond = record("wv-thurmond", "WV");
        let moab = record("ut-moab", "UT");
        let summary = insert_records(
            &mut corpus,
            [("WV", &thurmond), ("ut", &moab)],
            CollisionPolicy::default(),
        )
        .unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.created_states, ["UT"]);
        assert_eq!(corpus.states["WV"].len(), 3);
        assert_eq!(record_id(&corpus.states["WV"][2]), Some("wv-thurmond"));
        assert!(existing_ids(&corpus).contains("ut-moab"));
    }

    #[test]
    fn collisions_follow_policy() {
        let mut corpus = Corpus::parse(SAMPLE).unwrap();
        let weaker = with_overall(record("wv-fayetteville", "WV"), 50);
        let stronger = with_overall(record("wv-fayetteville", "WV"), 90);

        let summary =
            insert_records(&mut corpus, [("WV", &weaker)], CollisionPolicy::KeepHigherScore)
                .unwrap();
        assert_eq!(summary.kept_existing, ["wv-fayetteville"]);
        assert_eq!(record_overall(&corpus.states["WV"][0]), 74);

        let summary =
            insert_records(&mut corpus, [("WV", &stronger)], CollisionPolicy::KeepHigherScore)
                .unwrap();
        assert_eq!(summary.replaced, ["wv-fayetteville"]);
        assert_eq!(record_overall(&corpus.states["WV"][0]), 90);
        assert_eq!(corpus.states["WV"].len(), 2);

        let summary =
            insert_records(&mut corpus, [("WV", &weaker)], CollisionPolicy::Replace).unwrap();
        assert_eq!(summary.replaced.len(), 1);
        assert_eq!(record_overall(&corpus.states["WV"][0]), 50);

        let summary =
            insert_records(&mut corpus, [("WV", &stronger)], CollisionPolicy::KeepExisting)
                .unwrap();
        assert_eq!(summary.kept_existing.len(), 1);
        assert_eq!(record_overall(&corpus.states["WV"][0]), 50);
    }

    #[test]
    fn dedup_keeps_highest_score_and_order() {
        let mut corpus = Corpus::default();
        corpus.states.insert(
            "WV".to_string(),
            vec![
                json!({ "id": "a", "marketScore": { "overall": 60 } }),
                json!({ "id": "b", "marketScore": { "overall": 70 } }),
                json!({ "id": "a", "marketScore": { "overall": 80 } }),
                json!({ "name": "no id" }),
                json!({ "id": "b", "marketScore": { "overall": 70 } }),
                json!({ "id": "c" }),
            ],
        );
        let summary = dedup_by_score(&mut corpus);
        assert_eq!(summary.duplicated_ids, ["a", "b"]);
        assert_eq!(summary.removed, 2);
        let survivors: Vec<_> = corpus.states["WV"]
            .iter()
            .map(|record| (record_id(record), record_overall(record)))
            .collect();
        assert_eq!(
            survivors,
            [(Some("b"), 70), (Some("a"), 80), (None, 0), (Some("c"), 0)]
        );
    }

    #[test]
    fn dedup_spans_states() {
        let mut corpus = Corpus::default();
        corpus
            .states
            .insert("FL".to_string(), vec![json!({ "id": "x", "marketScore": { "overall": 40 } })]);
        corpus
            .states
            .insert("GA".to_string(), vec![json!({ "id": "x", "marketScore": { "overall": 40 } })]);
        let summary = dedup_by_score(&mut corpus);
        assert_eq!(summary.removed, 1);
        assert_eq!(corpus.states["FL"].len(), 1);
        assert!(corpus.states["GA"].is_empty());
    }

    #[test]
    fn dedup_is_a_no_op_without_duplicates() {
        let mut corpus = Corpus::parse(SAMPLE).unwrap();
        let before = corpus.clone();
        let summary = dedup_by_score(&mut corpus);
        assert_eq!(summary, DedupSummary::default());
        assert_eq!(corpus, before);
    }
}
