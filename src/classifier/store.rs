use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use super::{Classifier, ModelBuilder, TrainedArtifact};
use crate::error::{CorpusError, Result};

/// File-backed storage for the trained artifact
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
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

    /// Atomically replace the stored artifact
    pub fn save(&self, artifact: &TrainedArtifact) -> Result<()> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            bincode::serialize_into(&mut writer, artifact)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| CorpusError::Io(e.error))?;

        info!("Stored model at {}", self.path.display());
        Ok(())
    }

    /// Load the stored artifact, `None` if nothing has been trained yet
    pub fn load(&self) -> Result<Option<TrainedArtifact>> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let artifact: TrainedArtifact = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| self.corrupt(e.to_string()))?;
        Ok(Some(artifact))
    }

    /// Load the stored artifact and restore it into a classifier
    pub fn load_classifier(
        &self,
        builder: &dyn ModelBuilder,
    ) -> Result<Option<(TrainedArtifact, Box<dyn Classifier>)>> {
        let Some(artifact) = self.load()? else {
            return Ok(None);
        };

        let classifier = builder
            .restore(&artifact)
            .map_err(|e| self.corrupt(e.to_string()))?;
        Ok(Some((artifact, classifier)))
    }

    fn corrupt(&self, reason: String) -> CorpusError {
        CorpusError::StorageCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
