use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Classifier, ModelBuilder, TrainedArtifact};
use crate::error::{CorpusError, Result};
use crate::language::LanguageCode;

const NAME: &str = "naive-bayes";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassStats {
    label: LanguageCode,
    documents: u64,
    tokens: u64,
    counts: BTreeMap<String, u64>,
}

/// Multinomial naive Bayes over lower-cased word tokens with add-one smoothing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    classes: Vec<ClassStats>,
    vocabulary: usize,
    documents: u64,
}

/// Lower-cased runs of alphanumeric characters
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

impl NaiveBayesClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> impl Iterator<Item = &LanguageCode> {
        self.classes.iter().map(|class| &class.label)
    }

    fn log_likelihood(&self, class: &ClassStats, tokens: &[String]) -> f64 {
        let prior = (class.documents as f64 / self.documents as f64).ln();
        let denominator = (class.tokens + self.vocabulary as u64) as f64;
        tokens.iter().fold(prior, |score, token| {
            let count = class.counts.get(token).copied().unwrap_or(0);
            score + ((count + 1) as f64 / denominator).ln()
        })
    }

    fn classify(&self, text: &str) -> Option<&LanguageCode> {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut best: Option<(&LanguageCode, f64)> = None;
        for class in &self.classes {
            let score = self.log_likelihood(class, &tokens);
            if best.map(|(_, top)| score > top).unwrap_or(true) {
                best = Some((&class.label, score));
            }
        }
        best.map(|(label, _)| label)
    }
}

impl Classifier for NaiveBayesClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn train(&mut self, samples: &[String], labels: &[LanguageCode]) -> Result<()> {
        if samples.len() != labels.len() {
            return Err(CorpusError::Training(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if samples.is_empty() {
            return Err(CorpusError::Training("No training samples".to_string()));
        }

        let mut classes: Vec<ClassStats> = Vec::new();
        let mut vocabulary = std::collections::BTreeSet::new();

        for (sample, label) in samples.iter().zip(labels) {
            let index = match classes.iter().position(|class| &class.label == label) {
                Some(index) => index,
                None => {
                    classes.push(ClassStats::new(label));
                    classes.len() - 1
                }
            };

            let class = &mut classes[index];
            class.documents += 1;
            for token in tokenize(sample) {
                class.tokens += 1;
                vocabulary.insert(token.clone());
                *class.counts.entry(token).or_insert(0) += 1;
            }
        }

        self.classes = classes;
        self.vocabulary = vocabulary.len();
        self.documents = samples.len() as u64;
        Ok(())
    }

    fn predict(&self, samples: &[String]) -> Result<Vec<LanguageCode>> {
        if self.classes.is_empty() {
            return Err(CorpusError::Prediction("Classifier has not been trained".to_string()));
        }

        samples
            .iter()
            .map(|sample| {
                self.classify(sample)
                    .cloned()
                    .ok_or_else(|| CorpusError::Prediction(format!("No label for '{}'", sample)))
            })
            .collect()
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CorpusError::Training(format!("Failed to encode model: {}", e)))
    }
}

impl ClassStats {
    fn new(label: &LanguageCode) -> Self {
        Self {
            label: label.clone(),
            documents: 0,
            tokens: 0,
            counts: BTreeMap::new(),
        }
    }
}

/// Builder for [`NaiveBayesClassifier`]
pub struct NaiveBayesBuilder;

impl ModelBuilder for NaiveBayesBuilder {
    fn build(&self) -> Box<dyn Classifier> {
        Box::new(NaiveBayesClassifier::new())
    }

    fn restore(&self, artifact: &TrainedArtifact) -> Result<Box<dyn Classifier>> {
        if artifact.classifier != NAME {
            return Err(CorpusError::Prediction(format!(
                "Artifact was trained by '{}', not '{}'",
                artifact.classifier, NAME
            )));
        }
        let classifier: NaiveBayesClassifier = bincode::deserialize(&artifact.model)
            .map_err(|e| CorpusError::Prediction(format!("Failed to decode model: {}", e)))?;
        Ok(Box::new(classifier))
    }
}
