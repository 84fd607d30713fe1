//! Langcorpus - Multilingual Sentence Corpus and Language Identification
//!
//! Keeps a checksum-indexed corpus of English sentences and their translations
//! in sync with a canonical sentence list, fills missing translations through
//! a translation provider, retrains a language classifier when the corpus
//! changes and classifies input texts.

pub mod checksum;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod language;
pub mod predict;
pub mod sentences;
pub mod sync;
pub mod training;
pub mod translate;
pub mod workflow;
