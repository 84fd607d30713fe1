use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::Corpus;
use crate::error::{CorpusError, Result};
use crate::language::LanguageCatalog;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCorpus {
    version: u32,
    languages: Corpus,
}

/// File-backed corpus persistence
///
/// Saves go through a temporary file in the same directory that is renamed
/// over the previous version, so a reader never observes a half-written
/// corpus and a failed save leaves the old file in place.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored corpus, or an empty one per catalog language if nothing was saved yet
    pub fn load(&self, catalog: &LanguageCatalog) -> Result<Corpus> {
        if !self.exists() {
            debug!("No corpus at {}, starting empty", self.path.display());
            return Ok(Corpus::empty(catalog));
        }

        let file = File::open(&self.path)?;
        let stored: StoredCorpus = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| self.corrupt(e.to_string()))?;

        if stored.version != FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {} (expected {})",
                stored.version, FORMAT_VERSION
            )));
        }

        let corpus = stored.languages;
        if let Some((code, checksum)) = corpus.orphans().into_iter().next() {
            return Err(self.corrupt(format!(
                "translation {} in '{}' has no English source sentence",
                checksum, code
            )));
        }

        info!(
            "Loaded corpus with {} sentences across {} languages",
            corpus.sentence_count(),
            corpus.languages().count()
        );
        Ok(corpus)
    }

    /// Atomically replace the stored corpus
    pub fn save(&self, corpus: &Corpus) -> Result<()> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let stored = StoredCorpus {
            version: FORMAT_VERSION,
            languages: corpus.clone(),
        };

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer_pretty(&mut writer, &stored)?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| CorpusError::Io(e.error))?;

        debug!("Saved corpus to {}", self.path.display());
        Ok(())
    }

    fn corrupt(&self, reason: String) -> CorpusError {
        CorpusError::StorageCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
