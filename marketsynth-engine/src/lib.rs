//! Marketsynth Engine
//!
//! Deterministic synthesis of short-term-rental market records for towns that
//! lack curated data. A bare city descriptor is expanded into a complete,
//! internally consistent record using calibration tables and a random stream
//! seeded from the city's identifier. This crate performs no I/O of its own;
//! front-ends supply data through [`DataLoader`] and [`CorpusStorage`].

pub mod batch;
pub mod calibration;
pub mod constants;
pub mod corpus;
pub mod descriptor;
pub mod format;
pub mod market;
pub mod numbers;
pub mod record;
pub mod seed;
pub mod synth;

use serde::Serialize;
use std::collections::BTreeSet;

// Re-export commonly used types
pub use batch::{BatchReport, Rejection, SynthesizedCity, synthesize_batch};
pub use calibration::{AmenityRecord, Band, CalibrationError, CalibrationTables, IntBand, MarketProfile};
pub use corpus::{
    CollisionPolicy, Comparable, Corpus, CorpusError, DedupSummary, InsertSummary,
    StateComparables, dedup_by_score, existing_ids, insert_records, render_corpus,
};
pub use descriptor::{CityDescriptor, DescriptorError, HighlightSet};
pub use format::{format_record, format_value};
pub use market::{BedroomSize, MarketType, Priority, RiskLevel, RprRating, StrStatus, Verdict};
pub use record::{
    AmenityDelta, DsiDetails, IncomeBySize, InvestmentMetrics, MarketRecord, MarketScore,
    RentalMetrics, SaturationRisk,
};
pub use seed::{
    CountingRng, CountingSeedSource, HmacSeedSource, SeedSource, XxHashSeedSource,
    derive_identifier_seed,
};
pub use synth::{Synthesizer, synthesize, synthesize_with};

/// Trait for abstracting where descriptors and calibration come from.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the descriptors to synthesize.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptors cannot be read or parsed.
    fn load_descriptors(&self) -> Result<Vec<CityDescriptor>, Self::Error>;

    /// Load calibration tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be read, parsed, or validated.
    fn load_calibration(&self) -> Result<CalibrationTables, Self::Error>;
}

/// Trait for abstracting where the existing corpus lives.
pub trait CorpusStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the corpus, or `None` when there is none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus exists but cannot be read or parsed.
    fn load_corpus(&self) -> Result<Option<Corpus>, Self::Error>;

    /// Persist the corpus.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be written.
    fn save_corpus(&self, corpus: &Corpus) -> Result<(), Self::Error>;
}

/// Corpus changes to apply after a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub insert: bool,
    pub dedup: bool,
    pub policy: CollisionPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub insert: Option<InsertSummary>,
    pub dedup: Option<DedupSummary>,
    pub saved: bool,
}

/// Result of a generation run along with the corpus it was checked against.
#[derive(Debug, Clone, Default)]
pub struct GenerationRun {
    pub report: BatchReport,
    pub corpus: Option<Corpus>,
}

/// Main engine tying descriptor loading, synthesis, and corpus maintenance together
pub struct MarketEngine<L, C>
where
    L: DataLoader,
    C: CorpusStorage,
{
    data_loader: L,
    storage: C,
}

impl<L, C> MarketEngine<L, C>
where
    L: DataLoader,
    C: CorpusStorage,
{
    /// Create a new engine with the provided data loader and corpus storage
    pub const fn new(data_loader: L, storage: C) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Synthesize every loaded descriptor, optionally restricted to `only`.
    ///
    /// Identifiers already in the stored corpus are skipped, and the corpus
    /// supplies per-state comparables for logging.
    ///
    /// # Errors
    ///
    /// Returns an error if descriptors, calibration, or the corpus cannot be loaded.
    pub fn generate(&self, only: Option<&BTreeSet<String>>) -> anyhow::Result<GenerationRun>
    where
        L::Error: Into<anyhow::Error>,
        C::Error: Into<anyhow::Error>,
    {
        let tables = self.data_loader.load_calibration().map_err(Into::into)?;
        let mut descriptors = self.data_loader.load_descriptors().map_err(Into::into)?;
        if let Some(only) = only {
            descriptors.retain(|descriptor| only.contains(descriptor.id.trim()));
        }
        let corpus = self.storage.load_corpus().map_err(Into::into)?;
        let (known, comparables) = corpus.as_ref().map_or_else(
            || (BTreeSet::new(), None),
            |corpus| {
                (
                    existing_ids(corpus),
                    Some(StateComparables::from_corpus(corpus)),
                )
            },
        );
        let synthesizer = Synthesizer::new(&tables);
        let report = synthesize_batch(&synthesizer, &descriptors, &known, comparables.as_ref());
        Ok(GenerationRun { report, corpus })
    }

    /// Apply insertion and cleanup to the run's corpus and save it if anything was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be converted or the corpus cannot be saved.
    pub fn commit(
        &self,
        run: &mut GenerationRun,
        options: CommitOptions,
    ) -> anyhow::Result<CommitSummary>
    where
        C::Error: Into<anyhow::Error>,
    {
        let mut summary = CommitSummary::default();
        if !options.insert && !options.dedup {
            return Ok(summary);
        }
        let corpus = run.corpus.get_or_insert_with(Corpus::default);
        if options.insert {
            summary.insert = Some(insert_records(
                corpus,
                run.report.entries(),
                options.policy,
            )?);
        }
        if options.dedup {
            summary.dedup = Some(dedup_by_score(corpus));
        }
        self.storage.save_corpus(corpus).map_err(Into::into)?;
        summary.saved = true;
        Ok(summary)
    }
}
