use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CorpusError, Result};
use crate::language::{LanguageCatalog, LanguageCode};

// Default values for optional configuration keys
fn default_sentences_path() -> PathBuf {
    PathBuf::from("data/sentences.txt")
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/languagedataset.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/model.bin")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("data/log")
}

fn default_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_max_batch_chars() -> usize {
    4500
}

fn default_min_pause_secs() -> u64 {
    1
}

fn default_max_pause_secs() -> u64 {
    5
}

fn default_settle_min_secs() -> u64 {
    5
}

fn default_settle_max_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_enabled() -> bool {
    true
}

fn default_training_languages() -> Vec<String> {
    ["da", "nl", "en", "fi", "fr", "de", "it", "no", "pl", "es", "sv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_samples_per_language() -> usize {
    400
}

fn default_test_fraction() -> f64 {
    0.1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sentences: SentencesConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Canonical English sentence list, one sentence per line
    #[serde(default = "default_sentences_path")]
    pub sentences: PathBuf,
    /// Persisted multilingual corpus
    #[serde(default = "default_corpus_path")]
    pub corpus: PathBuf,
    /// Persisted trained classifier
    #[serde(default = "default_model_path")]
    pub model: PathBuf,
    /// Directory for rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentencesConfig {
    /// Delimiter between canonical sentences. Changing it changes every checksum.
    #[serde(default)]
    pub line_ending: LineEnding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n`, the convention of the legacy sentence file
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl LineEnding {
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Skip translation entirely when false
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Translation endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Language every translation is requested from
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Maximum characters sent in a single request
    #[serde(default = "default_max_batch_chars")]
    pub max_batch_chars: usize,
    /// Lower bound of the randomized pause after each request (seconds)
    #[serde(default = "default_min_pause_secs")]
    pub min_pause_secs: u64,
    /// Upper bound of the randomized pause after each request (seconds)
    #[serde(default = "default_max_pause_secs")]
    pub max_pause_secs: u64,
    /// Lower bound of the pause after a translation round (seconds)
    #[serde(default = "default_settle_min_secs")]
    pub settle_min_secs: u64,
    /// Upper bound of the pause after a translation round (seconds)
    #[serde(default = "default_settle_max_secs")]
    pub settle_max_secs: u64,
    /// HTTP timeout per request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Languages used to train the classifier, in sampling order
    #[serde(default = "default_training_languages")]
    pub languages: Vec<String>,
    /// Maximum number of sentences sampled per language
    #[serde(default = "default_samples_per_language")]
    pub samples_per_language: usize,
    /// Fraction of every language held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the train/test split; random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Replaces the built-in catalog when set (code = display name)
    #[serde(default)]
    pub languages: Option<BTreeMap<String, String>>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sentences: default_sentences_path(),
            corpus: default_corpus_path(),
            model: default_model_path(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            source_language: default_source_language(),
            max_batch_chars: default_max_batch_chars(),
            min_pause_secs: default_min_pause_secs(),
            max_pause_secs: default_max_pause_secs(),
            settle_min_secs: default_settle_min_secs(),
            settle_max_secs: default_settle_max_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            languages: default_training_languages(),
            samples_per_language: default_samples_per_language(),
            test_fraction: default_test_fraction(),
            seed: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CorpusError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CorpusError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CorpusError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CorpusError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Language catalog from the `[catalog]` section, or the built-in one.
    /// Custom catalogs are ordered by language code.
    pub fn catalog(&self) -> Result<LanguageCatalog> {
        match &self.catalog.languages {
            Some(languages) => LanguageCatalog::from_entries(
                languages.iter().map(|(code, name)| (code.clone(), name.clone())),
            ),
            None => Ok(LanguageCatalog::builtin()),
        }
    }

    pub fn training_languages(&self) -> Result<Vec<LanguageCode>> {
        self.training
            .languages
            .iter()
            .map(|code| LanguageCode::new(code.as_str()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let catalog = self.catalog()?;

        for code in self.training_languages()? {
            if !catalog.contains(&code) {
                return Err(CorpusError::Config(format!(
                    "Training language '{}' is not in the language catalog",
                    code
                )));
            }
        }

        if !(self.training.test_fraction > 0.0 && self.training.test_fraction < 1.0) {
            return Err(CorpusError::Config(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.training.test_fraction
            )));
        }

        if self.training.samples_per_language == 0 {
            return Err(CorpusError::Config("samples_per_language must be positive".to_string()));
        }

        let translate = &self.translate;
        if translate.source_language != crate::language::SOURCE_LANGUAGE {
            return Err(CorpusError::Config(format!(
                "Only '{}' is supported as source language, got '{}'",
                crate::language::SOURCE_LANGUAGE,
                translate.source_language
            )));
        }
        if translate.max_batch_chars == 0 {
            return Err(CorpusError::Config("max_batch_chars must be positive".to_string()));
        }
        if translate.min_pause_secs > translate.max_pause_secs {
            return Err(CorpusError::Config(
                "min_pause_secs must not exceed max_pause_secs".to_string(),
            ));
        }
        if translate.settle_min_secs > translate.settle_max_secs {
            return Err(CorpusError::Config(
                "settle_min_secs must not exceed settle_max_secs".to_string(),
            ));
        }

        Ok(())
    }
}
