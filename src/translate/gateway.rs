use std::ops::Range;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::{Pacer, TranslationProvider, BATCH_SEPARATOR};
use crate::checksum::Checksum;
use crate::corpus::{Corpus, CorpusStore};
use crate::error::{CorpusError, Result};
use crate::language::{LanguageCatalog, LanguageCode};
use crate::sync::TranslationGaps;

/// Split `texts` into consecutive batches whose joined payload stays within
/// `budget` characters. A single text longer than the budget forms its own batch.
///
/// A text containing the batch separator cannot be aligned with the reply,
/// so it is isolated and never drags its neighbours into a discarded batch.
pub fn plan_batches(texts: &[String], budget: usize) -> Vec<Range<usize>> {
    let separator = BATCH_SEPARATOR.chars().count();
    let mut batches = Vec::new();
    let mut start = 0;
    let mut size = 0;

    for (index, text) in texts.iter().enumerate() {
        if text.contains(BATCH_SEPARATOR) {
            if index > start {
                batches.push(start..index);
            }
            batches.push(index..index + 1);
            start = index + 1;
            size = 0;
            continue;
        }

        let len = text.chars().count();
        let candidate = if index == start { len } else { size + separator + len };

        if index > start && candidate > budget {
            batches.push(start..index);
            start = index;
            size = len;
        } else {
            size = candidate;
        }
    }

    if start < texts.len() {
        batches.push(start..texts.len());
    }
    batches
}

/// What a gap-filling round did
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    /// Translations written into the corpus
    pub filled: usize,
    /// Requests sent to the provider
    pub requests: usize,
    /// Batches dropped because the response did not line up with the request
    pub discarded_batches: usize,
    /// Languages whose remaining gaps were abandoned, with the provider error
    pub failed_languages: Vec<(LanguageCode, String)>,
}

impl FillReport {
    pub fn changed(&self) -> bool {
        self.filled > 0
    }
}

/// Fills translation gaps through a provider, one language at a time
pub struct TranslationGateway<'a> {
    provider: &'a dyn TranslationProvider,
    pacer: &'a dyn Pacer,
    catalog: &'a LanguageCatalog,
    max_batch_chars: usize,
}

impl<'a> TranslationGateway<'a> {
    pub fn new(
        provider: &'a dyn TranslationProvider,
        pacer: &'a dyn Pacer,
        catalog: &'a LanguageCatalog,
        max_batch_chars: usize,
    ) -> Self {
        Self {
            provider,
            pacer,
            catalog,
            max_batch_chars,
        }
    }

    /// Translate every gap and persist the corpus after each language.
    ///
    /// A provider failure drops everything translated so far for that language
    /// and moves on to the next one; misaligned batches are dropped. Only
    /// storage failures abort.
    pub async fn fill(
        &self,
        corpus: &mut Corpus,
        gaps: &TranslationGaps,
        store: &CorpusStore,
    ) -> Result<FillReport> {
        let mut report = FillReport::default();

        for code in self.catalog.targets() {
            let name = self.catalog.name(code);
            let checksums = gaps.for_language(code);
            if checksums.is_empty() {
                info!("No needed translations for {}, skipping", name);
                continue;
            }

            info!("Fetching {} translations for {}", checksums.len(), name);
            let translated = self.translate_language(corpus, code, checksums, &mut report).await;

            if translated.is_empty() {
                continue;
            }
            for (checksum, text) in &translated {
                info!("Storing {} translation for sentence id: {} - {}", name, checksum.short(), text);
            }
            report.filled += translated.len();
            for (checksum, text) in translated {
                corpus.insert(code, checksum, text);
            }
            store.save(corpus)?;
            info!("Saved {} translations", name);
        }

        Ok(report)
    }

    async fn translate_language(
        &self,
        corpus: &Corpus,
        code: &LanguageCode,
        checksums: &[Checksum],
        report: &mut FillReport,
    ) -> Vec<(Checksum, String)> {
        let (ids, texts): (Vec<Checksum>, Vec<String>) = checksums
            .iter()
            .filter_map(|checksum| {
                corpus
                    .get(&LanguageCode::source(), checksum)
                    .map(|text| (*checksum, text.to_string()))
            })
            .unzip();

        let progress = ProgressBar::new(texts.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress.set_message(self.catalog.name(code).to_string());

        let mut translated = Vec::new();
        for batch in plan_batches(&texts, self.max_batch_chars) {
            let batch_texts = &texts[batch.clone()];
            report.requests += 1;
            let result = self.provider.translate(code, batch_texts).await;
            self.pacer.pause().await;

            match result {
                Ok(lines) if lines.len() == batch_texts.len() => {
                    translated.extend(ids[batch].iter().copied().zip(lines));
                    progress.inc(batch_texts.len() as u64);
                }
                Ok(lines) => {
                    let err = CorpusError::TranslationAlignment {
                        language: code.to_string(),
                        expected: batch_texts.len(),
                        received: lines.len(),
                    };
                    warn!("Discarding batch: {}", err);
                    report.discarded_batches += 1;
                }
                Err(err @ CorpusError::TranslationAlignment { .. }) => {
                    warn!("Discarding batch: {}", err);
                    report.discarded_batches += 1;
                }
                Err(err) => {
                    warn!("Abandoning {} for this run: {}", self.catalog.name(code), err);
                    report.failed_languages.push((code.clone(), err.to_string()));
                    // A language is written whole or not at all
                    translated.clear();
                    break;
                }
            }
        }

        progress.finish_and_clear();
        translated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncEngine;
    use crate::translate::{MockTranslationProvider, NoPause};
    use std::sync::Mutex;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn payload_len(batch: &[String]) -> usize {
        batch.join(BATCH_SEPARATOR).chars().count()
    }

    #[test]
    fn test_plan_batches_respects_budget() {
        let input = texts(&["aaaa", "bbbb", "cccc", "dd", "eeeeeeeeeeeeeeee", "f"]);
        for budget in 1..30 {
            let batches = plan_batches(&input, budget);
            let mut covered = 0;
            for batch in &batches {
                assert_eq!(batch.start, covered);
                covered = batch.end;
                let slice = &input[batch.clone()];
                assert!(
                    payload_len(slice) <= budget || slice.len() == 1,
                    "budget {} batch {:?}",
                    budget,
                    batch
                );
            }
            assert_eq!(covered, input.len());
        }
    }

    #[test]
    fn test_plan_batches_packs_greedily() {
        let input = texts(&["aaaa", "bbbb", "cccc"]);
        assert_eq!(plan_batches(&input, 9), vec![0..2, 2..3]);
        assert_eq!(plan_batches(&input, 14), vec![0..3]);
        assert_eq!(plan_batches(&input, 3), vec![0..1, 1..2, 2..3]);
        assert!(plan_batches(&[], 10).is_empty());
    }

    #[test]
    fn test_plan_batches_isolates_multiline_text() {
        let input = texts(&["aaaa", "bb\ncc", "dddd", "eeee"]);
        assert_eq!(plan_batches(&input, 100), vec![0..1, 1..2, 2..4]);

        let input = texts(&["x\ny", "z"]);
        assert_eq!(plan_batches(&input, 100), vec![0..1, 1..2]);
    }

    #[test]
    fn test_plan_batches_counts_characters_not_bytes() {
        let input = texts(&["ééé", "ééé"]);
        assert_eq!(plan_batches(&input, 7), vec![0..2]);
    }

    struct Fixture {
        catalog: LanguageCatalog,
        corpus: Corpus,
        gaps: TranslationGaps,
        _dir: tempfile::TempDir,
        store: CorpusStore,
    }

    fn fixture(languages: &[(&str, &str)], sentences: &[&str]) -> Fixture {
        let catalog = LanguageCatalog::from_entries(languages.iter().copied()).unwrap();
        let mut corpus = Corpus::empty(&catalog);
        let report = SyncEngine::new(&catalog).reconcile(&mut corpus, &texts(sentences));
        let dir = tempfile::tempdir().unwrap();
        let store = CorpusStore::new(dir.path().join("languagedataset.json"));
        Fixture {
            catalog,
            corpus,
            gaps: report.gaps,
            _dir: dir,
            store,
        }
    }

    fn dictionary(text: &str) -> String {
        match text {
            "Hello world" => "Bonjour le monde".to_string(),
            "Good morning" => "Bonjour".to_string(),
            other => format!("fr:{}", other),
        }
    }

    #[tokio::test]
    async fn test_fill_writes_translations_in_order_and_saves() {
        let mut fx = fixture(&[("en", "English"), ("fr", "French")], &["Hello world", "Good morning"]);

        let mut provider = MockTranslationProvider::new();
        provider
            .expect_translate()
            .times(1)
            .returning(|_, texts| Ok(texts.iter().map(|t| dictionary(t)).collect()));

        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 4500);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();

        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(report.filled, 2);
        assert!(report.changed());
        assert_eq!(fx.corpus.get(&fr, &Checksum::of("Hello world")), Some("Bonjour le monde"));
        assert_eq!(fx.corpus.get(&fr, &Checksum::of("Good morning")), Some("Bonjour"));
        assert_eq!(fx.store.load(&fx.catalog).unwrap(), fx.corpus);
    }

    #[tokio::test]
    async fn test_misaligned_batch_is_discarded() {
        let mut fx = fixture(&[("en", "English"), ("fr", "French")], &["Hello world", "Good morning"]);

        let mut provider = MockTranslationProvider::new();
        provider
            .expect_translate()
            .returning(|_, _| Ok(vec!["Bonjour le monde Bonjour".to_string()]));

        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 4500);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();

        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(report.discarded_batches, 1);
        assert_eq!(report.filled, 0);
        assert!(fx.corpus.language(&fr).unwrap().is_empty());
        assert!(!fx.store.exists());
    }

    #[tokio::test]
    async fn test_provider_error_skips_language_but_not_others() {
        let mut fx = fixture(
            &[("en", "English"), ("de", "German"), ("fr", "French")],
            &["Hello world", "Good morning"],
        );

        let mut provider = MockTranslationProvider::new();
        provider
            .expect_translate()
            .withf(|target, _| target.as_str() == "de")
            .times(1)
            .returning(|target, _| {
                Err(CorpusError::TranslationProvider {
                    language: target.to_string(),
                    message: "429 Too Many Requests".to_string(),
                })
            });
        provider
            .expect_translate()
            .withf(|target, _| target.as_str() == "fr")
            .times(1)
            .returning(|_, texts| Ok(texts.iter().map(|t| dictionary(t)).collect()));

        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 4500);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();

        let de = LanguageCode::new("de").unwrap();
        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(report.failed_languages.len(), 1);
        assert_eq!(report.failed_languages[0].0, de);
        assert!(fx.corpus.language(&de).unwrap().is_empty());
        assert_eq!(fx.corpus.language(&fr).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_drops_whole_language() {
        let mut fx = fixture(&[("en", "English"), ("fr", "French")], &["one", "two", "three"]);
        let calls = Mutex::new(0);

        struct Flaky<'a> {
            calls: &'a Mutex<usize>,
        }

        #[async_trait::async_trait]
        impl TranslationProvider for Flaky<'_> {
            async fn translate(&self, target: &LanguageCode, texts: &[String]) -> Result<Vec<String>> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    Ok(texts.iter().map(|t| format!("fr:{}", t)).collect())
                } else {
                    Err(CorpusError::TranslationProvider {
                        language: target.to_string(),
                        message: "connection reset".to_string(),
                    })
                }
            }
        }

        let provider = Flaky { calls: &calls };
        // Budget of 5 characters puts every sentence in its own request.
        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 5);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();

        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(report.requests, 2);
        assert_eq!(report.filled, 0);
        assert_eq!(report.failed_languages.len(), 1);
        assert!(fx.corpus.language(&fr).unwrap().is_empty());
        assert!(!fx.store.exists());
        let remaining = SyncEngine::new(&fx.catalog).gaps(&fx.corpus);
        assert_eq!(remaining.total(), 3);
    }

    #[tokio::test]
    async fn test_multiline_sentence_does_not_block_others() {
        let mut fx = fixture(
            &[("en", "English"), ("fr", "French")],
            &["Hello world", "Line one\nline two", "Good morning"],
        );

        // Echoes the reply the way the web endpoint does: one line per input line
        let mut provider = MockTranslationProvider::new();
        provider.expect_translate().returning(|_, texts| {
            Ok(texts
                .join(BATCH_SEPARATOR)
                .split(BATCH_SEPARATOR)
                .map(dictionary)
                .collect())
        });

        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 4500);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();

        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(report.discarded_batches, 1);
        assert_eq!(report.filled, 2);
        assert_eq!(fx.corpus.get(&fr, &Checksum::of("Hello world")), Some("Bonjour le monde"));
        assert_eq!(fx.corpus.get(&fr, &Checksum::of("Good morning")), Some("Bonjour"));
        assert!(!fx.corpus.contains(&fr, &Checksum::of("Line one\nline two")));
    }

    #[tokio::test]
    async fn test_languages_without_gaps_issue_no_request() {
        let mut fx = fixture(&[("en", "English"), ("fr", "French")], &[]);

        let mut provider = MockTranslationProvider::new();
        provider.expect_translate().times(0);

        let gateway = TranslationGateway::new(&provider, &NoPause, &fx.catalog, 4500);
        let report = gateway.fill(&mut fx.corpus, &fx.gaps, &fx.store).await.unwrap();
        assert_eq!(report.requests, 0);
        assert!(!report.changed());
    }
}
