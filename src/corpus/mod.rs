// Multilingual sentence corpus
//
// The corpus maps every language code to the sentences known in that
// language, keyed by the checksum of the English source sentence:
// - Corpus: the in-memory mapping, exclusively owned by a single run
// - CorpusStore: durable JSON persistence with atomic replacement

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use store::CorpusStore;

use crate::checksum::Checksum;
use crate::language::{LanguageCatalog, LanguageCode};

/// Sentences of one language keyed by source checksum
pub type SentenceMap = BTreeMap<Checksum, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    languages: BTreeMap<LanguageCode, SentenceMap>,
}

impl Corpus {
    /// Empty corpus with one empty sub-mapping per catalog language
    pub fn empty(catalog: &LanguageCatalog) -> Self {
        let mut corpus = Self::default();
        corpus.ensure_languages(catalog);
        corpus
    }

    /// Add empty sub-mappings for catalog languages the corpus does not know yet.
    /// Returns the number of languages added.
    pub fn ensure_languages(&mut self, catalog: &LanguageCatalog) -> usize {
        let mut added = 0;
        for code in catalog.codes() {
            if !self.languages.contains_key(code) {
                self.languages.insert(code.clone(), SentenceMap::new());
                added += 1;
            }
        }
        added
    }

    pub fn language(&self, code: &LanguageCode) -> Option<&SentenceMap> {
        self.languages.get(code)
    }

    /// English sentences every translation derives from
    pub fn source(&self) -> Option<&SentenceMap> {
        self.languages.get(&LanguageCode::source())
    }

    pub fn languages(&self) -> impl Iterator<Item = (&LanguageCode, &SentenceMap)> {
        self.languages.iter()
    }

    pub fn contains(&self, code: &LanguageCode, checksum: &Checksum) -> bool {
        self.languages
            .get(code)
            .map(|sentences| sentences.contains_key(checksum))
            .unwrap_or(false)
    }

    pub fn get(&self, code: &LanguageCode, checksum: &Checksum) -> Option<&str> {
        self.languages
            .get(code)
            .and_then(|sentences| sentences.get(checksum))
            .map(String::as_str)
    }

    /// Insert or replace a sentence, creating the language sub-mapping if needed
    pub fn insert(&mut self, code: &LanguageCode, checksum: Checksum, text: String) {
        self.languages
            .entry(code.clone())
            .or_default()
            .insert(checksum, text);
    }

    /// Remove a sentence from every language, English included.
    /// Returns the English text that was retired, if any.
    pub fn retire(&mut self, checksum: &Checksum) -> Option<String> {
        let source = LanguageCode::source();
        let mut retired = None;
        for (code, sentences) in self.languages.iter_mut() {
            let removed = sentences.remove(checksum);
            if *code == source {
                retired = removed;
            }
        }
        retired
    }

    /// Total number of stored sentences across all languages
    pub fn sentence_count(&self) -> usize {
        self.languages.values().map(|sentences| sentences.len()).sum()
    }

    /// Translations whose checksum is not present in the English sub-mapping
    pub fn orphans(&self) -> Vec<(LanguageCode, Checksum)> {
        let empty = SentenceMap::new();
        let source = self.source().unwrap_or(&empty);
        self.languages
            .iter()
            .filter(|(code, _)| !code.is_source())
            .flat_map(|(code, sentences)| {
                sentences
                    .keys()
                    .filter(move |checksum| !source.contains_key(*checksum))
                    .map(move |checksum| (code.clone(), *checksum))
            })
            .collect()
    }
}
