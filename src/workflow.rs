use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::classifier::{Classifier, ClassifierFactory, ModelBuilder, ModelStore, TrainedArtifact};
use crate::config::Config;
use crate::corpus::{Corpus, CorpusStore};
use crate::error::{CorpusError, Result};
use crate::language::LanguageCatalog;
use crate::predict::PredictionService;
use crate::sentences::read_sentences;
use crate::sync::{SyncEngine, SyncReport};
use crate::training::{retrain_reason, RetrainReason, TrainingOrchestrator};
use crate::translate::{FillReport, Pacer, TranslationGateway, TranslationProvider, TranslatorFactory};

/// Per-run switches
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Leave translation gaps open instead of calling the provider
    pub offline: bool,
    /// Retrain even if the stored model is current
    pub retrain: bool,
}

/// Everything a run did, for reporting and tests
#[derive(Debug, Default)]
pub struct RunSummary {
    /// The corpus file did not exist and was created
    pub initialized: bool,
    pub sync: SyncReport,
    pub fill: Option<FillReport>,
    /// Sentences added, retired or translated this run
    pub corpus_changed: bool,
    pub retrain: Option<RetrainReason>,
    /// Newly trained artifact, if training succeeded
    pub trained: Option<TrainedArtifact>,
    pub training_error: Option<String>,
    pub corpus: Corpus,
    /// Input text to predicted language code
    pub predictions: Map<String, Value>,
}

pub struct Workflow {
    config: Config,
    catalog: LanguageCatalog,
    provider: Box<dyn TranslationProvider>,
    pacer: Box<dyn Pacer>,
    builder: Box<dyn ModelBuilder>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let provider = TranslatorFactory::create_provider(&config.translate)?;
        let pacer = TranslatorFactory::create_pacer(&config.translate);
        let builder = ClassifierFactory::create_builder();
        Self::with_components(config, provider, pacer, builder)
    }

    /// Workflow with explicit collaborators
    pub fn with_components(
        config: Config,
        provider: Box<dyn TranslationProvider>,
        pacer: Box<dyn Pacer>,
        builder: Box<dyn ModelBuilder>,
    ) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        Ok(Self {
            config,
            catalog,
            provider,
            pacer,
            builder,
        })
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Sync the corpus, fill translation gaps, retrain if needed and classify `texts`
    pub async fn run(&self, texts: &[String], options: &RunOptions) -> Result<RunSummary> {
        let mut summary = self.update_corpus(options).await?;

        let model_store = ModelStore::new(&self.config.paths.model);
        summary.retrain = retrain_reason(model_store.exists(), summary.corpus_changed, options.retrain);

        let classifier = match summary.retrain {
            Some(reason) => {
                info!("Model needs training: {}", reason);
                let orchestrator =
                    TrainingOrchestrator::new(self.builder.as_ref(), &self.config.training, &self.catalog);
                match orchestrator.train(&summary.corpus) {
                    Ok((artifact, classifier)) => {
                        model_store.save(&artifact)?;
                        summary.trained = Some(artifact);
                        Some(classifier)
                    }
                    Err(e) => {
                        error!("Error: {}", e);
                        summary.training_error = Some(e.to_string());
                        self.load_model(&model_store)?
                    }
                }
            }
            None => self.load_model(&model_store)?,
        };

        if !texts.is_empty() {
            let classifier = classifier.ok_or_else(|| {
                CorpusError::Prediction("No trained model is available".to_string())
            })?;
            summary.predictions = PredictionService::new(classifier.as_ref()).predict_map(texts)?;
        }

        Ok(summary)
    }

    /// Reconcile the corpus with the sentence list and translate what is missing
    pub async fn update_corpus(&self, options: &RunOptions) -> Result<RunSummary> {
        let paths = &self.config.paths;
        let sentences = read_sentences(&paths.sentences, self.config.sentences.line_ending)?;

        let store = CorpusStore::new(&paths.corpus);
        let initialized = !store.exists();
        if initialized {
            info!("Setting up initial dataset at {}", paths.corpus.display());
        }
        let mut corpus = store.load(&self.catalog)?;

        let sync = SyncEngine::new(&self.catalog).reconcile(&mut corpus, &sentences);
        if initialized || sync.changed() {
            store.save(&corpus)?;
        }

        let fill = if sync.gaps.is_empty() {
            info!("Dataset up to date");
            None
        } else if options.offline || !self.config.translate.enabled {
            warn!("Translation disabled, {} translations remain missing", sync.gaps.total());
            None
        } else {
            Some(self.fill_gaps(&mut corpus, &sync, &store).await?)
        };

        let corpus_changed = sync.changed() || fill.as_ref().map(FillReport::changed).unwrap_or(false);

        Ok(RunSummary {
            initialized,
            sync,
            fill,
            corpus_changed,
            corpus,
            ..RunSummary::default()
        })
    }

    async fn fill_gaps(&self, corpus: &mut Corpus, sync: &SyncReport, store: &CorpusStore) -> Result<FillReport> {
        info!(
            "{} translations missing across {} languages",
            sync.gaps.total(),
            sync.gaps.iter().count()
        );

        let gateway = TranslationGateway::new(
            self.provider.as_ref(),
            self.pacer.as_ref(),
            &self.catalog,
            self.config.translate.max_batch_chars,
        );
        let report = gateway.fill(corpus, &sync.gaps, store).await?;

        for (code, message) in &report.failed_languages {
            warn!("Translations for {} left incomplete: {}", self.catalog.name(code), message);
        }
        info!(
            "Filled {} translations with {} requests ({} batches discarded)",
            report.filled, report.requests, report.discarded_batches
        );

        if report.requests > 0 {
            let translate = &self.config.translate;
            self.pacer.settle(translate.settle_min_secs, translate.settle_max_secs).await;
        }
        Ok(report)
    }

    fn load_model(&self, store: &ModelStore) -> Result<Option<Box<dyn Classifier>>> {
        if !store.exists() {
            return Ok(None);
        }

        info!("Loading model from {}", store.path().display());
        Ok(store
            .load_classifier(self.builder.as_ref())?
            .map(|(_, classifier)| classifier))
    }
}
