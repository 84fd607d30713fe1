// Language classification capability
//
// Training and prediction are pluggable so the rest of the pipeline only
// deals with samples, labels and an opaque persisted artifact:
// - Classifier: train on (samples, labels), predict labels for samples
// - ModelBuilder: create fresh classifiers and restore persisted ones
// - Bayes: bundled multinomial naive Bayes backend
// - Store: atomic artifact persistence

pub mod bayes;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bayes::{NaiveBayesBuilder, NaiveBayesClassifier};
pub use store::ModelStore;

use crate::error::Result;
use crate::language::LanguageCode;

/// Persisted classifier state plus what it was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact {
    /// Name of the backend that produced `model`
    pub classifier: String,
    pub trained_at: DateTime<Utc>,
    pub languages: Vec<LanguageCode>,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Held-out accuracy; reported only, never gated on
    pub accuracy: Option<f64>,
    /// Backend-specific bytes
    pub model: Vec<u8>,
}

/// A trainable language classifier
pub trait Classifier: Send + Sync {
    /// Backend name recorded in artifacts
    fn name(&self) -> &'static str;

    /// Fit on `samples` labelled with `labels` (same length, same order)
    fn train(&mut self, samples: &[String], labels: &[LanguageCode]) -> Result<()>;

    /// One label per sample, in input order
    fn predict(&self, samples: &[String]) -> Result<Vec<LanguageCode>>;

    /// Backend-specific serialization of the trained state
    fn to_bytes(&self) -> Result<Vec<u8>>;
}

/// Creates classifiers of one backend
pub trait ModelBuilder: Send + Sync {
    fn build(&self) -> Box<dyn Classifier>;

    fn restore(&self, artifact: &TrainedArtifact) -> Result<Box<dyn Classifier>>;
}

/// Factory for the default classification backend
pub struct ClassifierFactory;

impl ClassifierFactory {
    pub fn create_builder() -> Box<dyn ModelBuilder> {
        Box::new(NaiveBayesBuilder)
    }
}
