// Translation of missing corpus sentences
//
// This module separates the provider from the batching policy:
// - TranslationProvider: one request, ordered texts in, ordered texts out
// - Google: provider backed by the public Google Translate endpoint
// - Gateway: budgeted batching, pacing and per-language persistence
// - Pacing: randomized pauses between requests

pub mod gateway;
pub mod google;
pub mod pacing;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

pub use gateway::{plan_batches, FillReport, TranslationGateway};
pub use google::GoogleTranslateProvider;
pub use pacing::{NoPause, Pacer, RandomPacer};

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::language::LanguageCode;

/// Separator between texts of one batched request
pub const BATCH_SEPARATOR: &str = "\n";

/// External translation capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate English `texts` into `target`, one result per input, in input order
    async fn translate(&self, target: &LanguageCode, texts: &[String]) -> Result<Vec<String>>;
}

/// Factory for creating translation providers
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the default provider implementation (Google Translate)
    pub fn create_provider(config: &TranslateConfig) -> Result<Box<dyn TranslationProvider>> {
        Ok(Box::new(GoogleTranslateProvider::new(config)?))
    }

    /// Pacer honouring the configured pause bounds
    pub fn create_pacer(config: &TranslateConfig) -> Box<dyn Pacer> {
        Box::new(RandomPacer::new(config.min_pause_secs, config.max_pause_secs))
    }
}
