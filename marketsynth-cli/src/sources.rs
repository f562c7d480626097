use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use marketsynth_engine::descriptor::{descriptors_from_json, load_from_static};
use marketsynth_engine::{
    CalibrationError, CalibrationTables, CityDescriptor, Corpus, CorpusError, CorpusStorage,
    DataLoader,
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid descriptors in {}: {source}", .path.display())]
    Descriptors {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid calibration in {}: {source}", .path.display())]
    Calibration {
        path: PathBuf,
        source: CalibrationError,
    },
    #[error("invalid corpus {}: {source}", .path.display())]
    Corpus { path: PathBuf, source: CorpusError },
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Descriptors and calibration from files, falling back to the bundled data.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    pub descriptors: Option<PathBuf>,
    pub calibration: Option<PathBuf>,
}

impl DataLoader for FileLoader {
    type Error = SourceError;

    fn load_descriptors(&self) -> Result<Vec<CityDescriptor>, Self::Error> {
        let Some(path) = &self.descriptors else {
            return Ok(load_from_static());
        };
        descriptors_from_json(&read(path)?).map_err(|source| SourceError::Descriptors {
            path: path.clone(),
            source,
        })
    }

    fn load_calibration(&self) -> Result<CalibrationTables, Self::Error> {
        let Some(path) = &self.calibration else {
            return Ok(CalibrationTables::default_config());
        };
        CalibrationTables::from_json(&read(path)?).map_err(|source| SourceError::Calibration {
            path: path.clone(),
            source,
        })
    }
}

/// Corpus file on disk. A missing file reads as an empty corpus.
#[derive(Debug, Clone, Default)]
pub struct FileCorpus {
    pub path: Option<PathBuf>,
}

impl CorpusStorage for FileCorpus {
    type Error = SourceError;

    fn load_corpus(&self) -> Result<Option<Corpus>, Self::Error> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::warn!("corpus {} does not exist yet", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(SourceError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };
        Corpus::parse(&text)
            .map(Some)
            .map_err(|source| SourceError::Corpus {
                path: path.clone(),
                source,
            })
    }

    fn save_corpus(&self, corpus: &Corpus) -> Result<(), Self::Error> {
        let Some(path) = &self.path else {
            log::warn!("no corpus path configured; changes were not saved");
            return Ok(());
        };
        fs::write(path, corpus.render()).map_err(|source| SourceError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("wrote {} records to {}", corpus.record_count(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("marketsynth-sources-{label}-{}", std::process::id()))
    }

    #[test]
    fn defaults_use_bundled_data() {
        let loader = FileLoader::default();
        assert!(!loader.load_descriptors().unwrap().is_empty());
        assert!(loader.load_calibration().is_ok());
        assert!(FileCorpus::default().load_corpus().unwrap().is_none());
    }

    #[test]
    fn missing_corpus_file_reads_as_none() {
        let storage = FileCorpus {
            path: Some(temp_path("absent")),
        };
        assert!(storage.load_corpus().unwrap().is_none());
    }

    #[test]
    fn corpus_round_trips_through_disk() {
        let path = temp_path("corpus");
        let storage = FileCorpus {
            path: Some(path.clone()),
        };
        storage.save_corpus(&Corpus::default()).unwrap();
        let loaded = storage.load_corpus().unwrap().unwrap();
        assert_eq!(loaded, Corpus::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_descriptors_name_the_file() {
        let path = temp_path("descriptors.json");
        fs::write(&path, "{ not json").unwrap();
        let loader = FileLoader {
            descriptors: Some(path.clone()),
            calibration: None,
        };
        let error = loader.load_descriptors().unwrap_err();
        assert!(matches!(error, SourceError::Descriptors { .. }));
        assert!(error.to_string().contains("marketsynth-sources-descriptors.json"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unreadable_calibration_is_a_read_error() {
        let loader = FileLoader {
            descriptors: None,
            calibration: Some(temp_path("no-such-calibration")),
        };
        assert!(matches!(
            loader.load_calibration(),
            Err(SourceError::Read { .. })
        ));
    }
}
