use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::corpus::Corpus;
use crate::language::{LanguageCatalog, LanguageCode};

/// A sentence that exists in English but not yet in `language`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TranslationGap {
    pub language: LanguageCode,
    pub checksum: Checksum,
}

/// Missing translations grouped by language, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationGaps {
    by_language: Vec<(LanguageCode, Vec<Checksum>)>,
}

impl TranslationGaps {
    pub fn for_language(&self, code: &LanguageCode) -> &[Checksum] {
        self.by_language
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, checksums)| checksums.as_slice())
            .unwrap_or(&[])
    }

    /// Languages with at least one gap, with their gaps
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, &[Checksum])> {
        self.by_language
            .iter()
            .filter(|(_, checksums)| !checksums.is_empty())
            .map(|(code, checksums)| (code, checksums.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.by_language.iter().map(|(_, checksums)| checksums.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn to_gaps(&self) -> Vec<TranslationGap> {
        self.iter()
            .flat_map(|(code, checksums)| {
                checksums.iter().map(move |checksum| TranslationGap {
                    language: code.clone(),
                    checksum: *checksum,
                })
            })
            .collect()
    }
}

/// Outcome of reconciling the canonical sentence list with the corpus
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub added: Vec<Checksum>,
    pub removed: Vec<Checksum>,
    pub gaps: TranslationGaps,
}

impl SyncReport {
    /// True if sentences were added or retired
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Keeps the corpus in line with the canonical English sentence list
pub struct SyncEngine<'a> {
    catalog: &'a LanguageCatalog,
}

impl<'a> SyncEngine<'a> {
    pub fn new(catalog: &'a LanguageCatalog) -> Self {
        Self { catalog }
    }

    /// Add new canonical sentences, retire removed ones from every language and
    /// list the translations still missing afterwards.
    pub fn reconcile(&self, corpus: &mut Corpus, sentences: &[String]) -> SyncReport {
        corpus.ensure_languages(self.catalog);

        let source = LanguageCode::source();
        let have: BTreeSet<Checksum> = corpus
            .source()
            .map(|sentences| sentences.keys().copied().collect())
            .unwrap_or_default();

        let mut wanted = BTreeSet::new();
        let mut added = Vec::new();
        for sentence in sentences {
            let checksum = Checksum::of(sentence);
            if !wanted.insert(checksum) {
                debug!("Duplicate canonical sentence id: {} - {}", checksum.short(), sentence);
                continue;
            }
            if !have.contains(&checksum) {
                info!("Adding new sentence id: {} - {}", checksum.short(), sentence);
                corpus.insert(&source, checksum, sentence.clone());
                added.push(checksum);
            }
        }

        let mut removed = Vec::new();
        for checksum in have.difference(&wanted) {
            if let Some(text) = corpus.retire(checksum) {
                info!("Removing sentence id: {} - {}", checksum.short(), text);
            }
            removed.push(*checksum);
        }

        // Gaps only after both passes, so retired sentences never show up as missing.
        let gaps = self.gaps(corpus);

        SyncReport { added, removed, gaps }
    }

    /// Every (language, checksum) pair present in English but missing in a target language
    pub fn gaps(&self, corpus: &Corpus) -> TranslationGaps {
        let Some(english) = corpus.source() else {
            return TranslationGaps::default();
        };

        let by_language = self
            .catalog
            .targets()
            .map(|code| {
                let missing: Vec<Checksum> = english
                    .iter()
                    .filter(|(checksum, _)| !corpus.contains(code, checksum))
                    .map(|(checksum, text)| {
                        info!(
                            "Adding sentence for translation to {} id: {} - {}",
                            self.catalog.name(code),
                            checksum.short(),
                            text
                        );
                        *checksum
                    })
                    .collect();
                (code.clone(), missing)
            })
            .collect();

        TranslationGaps { by_language }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LanguageCatalog {
        LanguageCatalog::from_entries([("en", "English"), ("fr", "French"), ("de", "German")]).unwrap()
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn code(s: &str) -> LanguageCode {
        LanguageCode::new(s).unwrap()
    }

    #[test]
    fn test_first_reconcile_adds_everything_and_reports_gaps() {
        let catalog = catalog();
        let engine = SyncEngine::new(&catalog);
        let mut corpus = Corpus::empty(&catalog);

        let report = engine.reconcile(&mut corpus, &lines(&["Hello world", "Good morning"]));
        assert_eq!(report.added.len(), 2);
        assert!(report.removed.is_empty());
        assert!(report.changed());
        assert_eq!(report.gaps.for_language(&code("fr")).len(), 2);
        assert_eq!(report.gaps.for_language(&code("de")).len(), 2);
        assert!(report.gaps.for_language(&code("en")).is_empty());
        assert_eq!(corpus.get(&code("en"), &Checksum::of("Hello world")), Some("Hello world"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let catalog = catalog();
        let engine = SyncEngine::new(&catalog);
        let mut corpus = Corpus::empty(&catalog);
        let sentences = lines(&["Hello world", "Good morning"]);

        let first = engine.reconcile(&mut corpus, &sentences);
        let snapshot = corpus.clone();
        let second = engine.reconcile(&mut corpus, &sentences);

        assert!(second.added.is_empty());
        assert!(second.removed.is_empty());
        assert!(!second.changed());
        assert_eq!(second.gaps, first.gaps);
        assert_eq!(corpus, snapshot);
    }

    #[test]
    fn test_removal_propagates_to_every_language() {
        let catalog = catalog();
        let engine = SyncEngine::new(&catalog);
        let mut corpus = Corpus::empty(&catalog);
        engine.reconcile(&mut corpus, &lines(&["Hello world", "Good morning"]));

        let morning = Checksum::of("Good morning");
        corpus.insert(&code("fr"), morning, "Bonjour".to_string());
        corpus.insert(&code("de"), morning, "Guten Morgen".to_string());

        let report = engine.reconcile(&mut corpus, &lines(&["Hello world"]));
        assert_eq!(report.removed, vec![morning]);
        assert!(report.changed());
        for (_, sentences) in corpus.languages() {
            assert!(!sentences.contains_key(&morning));
        }
        assert!(!report.gaps.to_gaps().iter().any(|gap| gap.checksum == morning));
    }

    #[test]
    fn test_gap_completeness() {
        let catalog = catalog();
        let engine = SyncEngine::new(&catalog);
        let mut corpus = Corpus::empty(&catalog);
        engine.reconcile(&mut corpus, &lines(&["one", "two", "three"]));
        corpus.insert(&code("fr"), Checksum::of("two"), "deux".to_string());

        let report = engine.reconcile(&mut corpus, &lines(&["one", "two", "three", "four"]));
        let gaps = report.gaps.to_gaps();

        for (checksum, _) in corpus.source().unwrap() {
            for target in catalog.targets() {
                let present = corpus.contains(target, checksum);
                let listed = gaps
                    .iter()
                    .filter(|gap| &gap.language == target && &gap.checksum == checksum)
                    .count();
                assert!(
                    (present && listed == 0) || (!present && listed == 1),
                    "{} / {} present={} listed={}",
                    target,
                    checksum,
                    present,
                    listed
                );
            }
        }
    }

    #[test]
    fn test_duplicate_sentences_collapse_to_one_checksum() {
        let catalog = catalog();
        let engine = SyncEngine::new(&catalog);
        let mut corpus = Corpus::empty(&catalog);

        let report = engine.reconcile(&mut corpus, &lines(&["Hello world", "Hello world"]));
        assert_eq!(report.added.len(), 1);
        assert_eq!(corpus.source().unwrap().len(), 1);
    }

    #[test]
    fn test_new_catalog_language_gets_gaps_for_existing_sentences() {
        let small = LanguageCatalog::from_entries([("en", "English")]).unwrap();
        let mut corpus = Corpus::empty(&small);
        SyncEngine::new(&small).reconcile(&mut corpus, &lines(&["Hello world"]));

        let catalog = catalog();
        let report = SyncEngine::new(&catalog).reconcile(&mut corpus, &lines(&["Hello world"]));
        assert!(!report.changed());
        assert_eq!(report.gaps.total(), 2);
    }
}
