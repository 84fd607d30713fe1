use serde_json::{Map, Value};
use tracing::debug;

use crate::classifier::Classifier;
use crate::error::{CorpusError, Result};
use crate::language::LanguageCode;

/// Answers language queries with a trained classifier
pub struct PredictionService<'a> {
    classifier: &'a dyn Classifier,
}

impl<'a> PredictionService<'a> {
    pub fn new(classifier: &'a dyn Classifier) -> Self {
        Self { classifier }
    }

    /// One language code per input text, in input order
    pub fn predict(&self, texts: &[String]) -> Result<Vec<LanguageCode>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let labels = self.classifier.predict(texts).map_err(|e| match e {
            err @ CorpusError::Prediction(_) => err,
            other => CorpusError::Prediction(other.to_string()),
        })?;

        if labels.len() != texts.len() {
            return Err(CorpusError::Prediction(format!(
                "Classifier returned {} labels for {} inputs",
                labels.len(),
                texts.len()
            )));
        }
        Ok(labels)
    }

    /// Input text to predicted code. Repeated inputs share one key.
    pub fn predict_map(&self, texts: &[String]) -> Result<Map<String, Value>> {
        let labels = self.predict(texts)?;
        Ok(to_result_map(texts, &labels))
    }
}

/// Pair inputs with labels in input order; a repeated input keeps its first
/// position and takes the label of its last occurrence.
pub fn to_result_map(texts: &[String], labels: &[LanguageCode]) -> Map<String, Value> {
    let mut result = Map::new();
    for (text, label) in texts.iter().zip(labels) {
        debug!("Predicted '{}' for: {}", label, text);
        result.insert(text.clone(), Value::String(label.to_string()));
    }
    result
}
