use std::fmt;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::classifier::{Classifier, ModelBuilder, TrainedArtifact};
use crate::config::TrainingConfig;
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::language::{LanguageCatalog, LanguageCode};

/// Why a model is (re)trained this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainReason {
    NoModel,
    CorpusChanged,
    Forced,
}

impl fmt::Display for RetrainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoModel => f.write_str("no stored model"),
            Self::CorpusChanged => f.write_str("corpus changed"),
            Self::Forced => f.write_str("retrain requested"),
        }
    }
}

/// Decide whether a retrain is due
pub fn retrain_reason(model_exists: bool, corpus_changed: bool, forced: bool) -> Option<RetrainReason> {
    if forced {
        Some(RetrainReason::Forced)
    } else if !model_exists {
        Some(RetrainReason::NoModel)
    } else if corpus_changed {
        Some(RetrainReason::CorpusChanged)
    } else {
        None
    }
}

/// Parallel samples and labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledSamples {
    pub samples: Vec<String>,
    pub labels: Vec<LanguageCode>,
}

impl LabeledSamples {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn push(&mut self, sample: String, label: LanguageCode) {
        self.samples.push(sample);
        self.labels.push(label);
    }
}

/// Stratified train/test partition
#[derive(Debug, Clone, Default)]
pub struct Split {
    pub train: LabeledSamples,
    pub test: LabeledSamples,
}

/// Up to `cap` sentences per language, languages in the given order
pub fn build_samples(
    corpus: &Corpus,
    languages: &[LanguageCode],
    cap: usize,
    catalog: &LanguageCatalog,
) -> LabeledSamples {
    let mut set = LabeledSamples::default();
    for code in languages {
        let Some(sentences) = corpus.language(code) else {
            warn!("No sentences stored for {}, skipping", catalog.name(code));
            continue;
        };

        let before = set.len();
        for text in sentences.values().take(cap) {
            set.push(text.clone(), code.clone());
        }
        info!("Adding samples for {}: {}", catalog.name(code), set.len() - before);
    }
    set
}

/// Hold out `test_fraction` of every label (rounded) for evaluation
pub fn stratified_split<R: Rng + ?Sized>(set: &LabeledSamples, test_fraction: f64, rng: &mut R) -> Split {
    let mut groups: Vec<(&LanguageCode, Vec<usize>)> = Vec::new();
    for (index, label) in set.labels.iter().enumerate() {
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, indices)) => indices.push(index),
            None => groups.push((label, vec![index])),
        }
    }

    let mut split = Split::default();
    for (label, mut indices) in groups {
        indices.shuffle(rng);
        let test_count = (indices.len() as f64 * test_fraction).round() as usize;
        for (position, index) in indices.into_iter().enumerate() {
            let target = if position < test_count {
                &mut split.test
            } else {
                &mut split.train
            };
            target.push(set.samples[index].clone(), label.clone());
        }
    }
    split
}

/// Fraction of predictions equal to the truth; `None` when there is nothing to compare
pub fn accuracy(truth: &[LanguageCode], predicted: &[LanguageCode]) -> Option<f64> {
    if truth.is_empty() || truth.len() != predicted.len() {
        return None;
    }
    let correct = truth.iter().zip(predicted).filter(|(a, b)| a == b).count();
    Some(correct as f64 / truth.len() as f64)
}

/// Builds a training set from the corpus, trains, evaluates and packages the result
pub struct TrainingOrchestrator<'a> {
    builder: &'a dyn ModelBuilder,
    config: &'a TrainingConfig,
    catalog: &'a LanguageCatalog,
}

impl<'a> TrainingOrchestrator<'a> {
    pub fn new(builder: &'a dyn ModelBuilder, config: &'a TrainingConfig, catalog: &'a LanguageCatalog) -> Self {
        Self {
            builder,
            config,
            catalog,
        }
    }

    pub fn train(&self, corpus: &Corpus) -> Result<(TrainedArtifact, Box<dyn Classifier>)> {
        let languages = self
            .config
            .languages
            .iter()
            .map(|code| LanguageCode::new(code.as_str()))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| CorpusError::Training(e.to_string()))?;

        let set = build_samples(corpus, &languages, self.config.samples_per_language, self.catalog);
        if set.is_empty() {
            return Err(CorpusError::Training("Corpus has no sentences for the training languages".to_string()));
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let split = stratified_split(&set, self.config.test_fraction, &mut rng);
        info!(
            "Split {} samples into {} for training and {} for testing",
            set.len(),
            split.train.len(),
            split.test.len()
        );
        if split.train.is_empty() {
            return Err(CorpusError::Training("Training partition is empty".to_string()));
        }

        let mut classifier = self.builder.build();
        info!("Training {} classifier...", classifier.name());
        classifier.train(&split.train.samples, &split.train.labels)?;

        let accuracy = if split.test.is_empty() {
            None
        } else {
            let predicted = classifier
                .predict(&split.test.samples)
                .map_err(|e| CorpusError::Training(format!("Evaluation failed: {}", e)))?;
            accuracy(&split.test.labels, &predicted)
        };
        match accuracy {
            Some(score) => info!("Accuracy: {:.4}", score),
            None => warn!("No held-out samples, accuracy not measured"),
        }

        let artifact = TrainedArtifact {
            classifier: classifier.name().to_string(),
            trained_at: Utc::now(),
            languages,
            train_samples: split.train.len(),
            test_samples: split.test.len(),
            accuracy,
            model: classifier.to_bytes()?,
        };
        Ok((artifact, classifier))
    }
}
