//! City descriptors: the bare inputs the synthesis pipeline expands.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::market::MarketType;

const DEFAULT_DESCRIPTOR_DATA: &str = include_str!("../../assets/data/descriptors.json");

/// Highlight strings stored inline for the common three-item case.
pub type HighlightSet = SmallVec<[String; 4]>;

/// Reasons a descriptor is rejected before synthesis begins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor is missing an identifier")]
    MissingIdentifier,
    #[error("{id}: descriptor is missing a display name")]
    MissingName { id: String },
    #[error("{id}: state code {state:?} is not a two-letter code")]
    InvalidState { id: String, state: String },
    #[error("{id}: population must be non-negative (got {population})")]
    NegativePopulation { id: String, population: i64 },
    #[error("{id}: population {population} exceeds the supported range")]
    PopulationOverflow { id: String, population: i64 },
    #[error("{id}: descriptor is missing a market type")]
    MissingMarketType { id: String },
}

/// Immutable description of a town that needs a synthesized market record.
///
/// Every field decodes with a default so a malformed entry in a batch file
/// reaches `validate()` and is rejected on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub population: i64,
    #[serde(default)]
    pub market_type: MarketType,
    #[serde(default)]
    pub highlights: HighlightSet,
    /// Nearby protected area; empty when the town is not a park gateway.
    #[serde(default)]
    pub near_park: String,
}

impl CityDescriptor {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<String>,
        population: i64,
        market_type: MarketType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            county: String::new(),
            state: state.into(),
            population,
            market_type,
            highlights: HighlightSet::new(),
            near_park: String::new(),
        }
    }

    #[must_use]
    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = county.into();
        self
    }

    #[must_use]
    pub fn with_highlights<I, S>(mut self, highlights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlights = highlights.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_park(mut self, park: impl Into<String>) -> Self {
        self.near_park = park.into();
        self
    }

    /// Whether the town sits next to a protected area.
    #[must_use]
    pub fn is_near_park(&self) -> bool {
        !self.near_park.trim().is_empty()
    }

    /// Upper-cased state code used for calibration lookups.
    #[must_use]
    pub fn state_code(&self) -> String {
        self.state.trim().to_ascii_uppercase()
    }

    /// Validate the descriptor and return its population as an unsigned count.
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError` when the identifier or name is blank, the
    /// state code is not two ASCII letters, or the population is negative or
    /// too large.
    pub fn validate(&self) -> Result<u32, DescriptorError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(DescriptorError::MissingIdentifier);
        }
        if self.name.trim().is_empty() {
            return Err(DescriptorError::MissingName { id: id.to_string() });
        }
        let state = self.state.trim();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DescriptorError::InvalidState {
                id: id.to_string(),
                state: self.state.clone(),
            });
        }
        if self.market_type.as_str().is_empty() {
            return Err(DescriptorError::MissingMarketType { id: id.to_string() });
        }
        if self.population < 0 {
            return Err(DescriptorError::NegativePopulation {
                id: id.to_string(),
                population: self.population,
            });
        }
        u32::try_from(self.population).map_err(|_| DescriptorError::PopulationOverflow {
            id: id.to_string(),
            population: self.population,
        })
    }
}

/// Parse a JSON array of descriptors.
///
/// # Errors
///
/// Returns an error if the JSON is not an array of descriptor objects.
pub fn descriptors_from_json(json: &str) -> Result<Vec<CityDescriptor>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Descriptors bundled with the crate.
#[must_use]
pub fn load_from_static() -> Vec<CityDescriptor> {
    descriptors_from_json(DEFAULT_DESCRIPTOR_DATA).unwrap_or_default()
}
