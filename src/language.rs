use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// Language every translation is derived from
pub const SOURCE_LANGUAGE: &str = "en";

/// Short language code such as `en`, `fr` or `zh-CN`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let mut parts = code.splitn(2, '-');
        let primary = parts.next().unwrap_or_default();
        let region = parts.next();

        let primary_ok = (2..=3).contains(&primary.len())
            && primary.bytes().all(|b| b.is_ascii_lowercase());
        let region_ok = region
            .map(|r| (2..=4).contains(&r.len()) && r.bytes().all(|b| b.is_ascii_alphanumeric()))
            .unwrap_or(true);

        if primary_ok && region_ok {
            Ok(Self(code))
        } else {
            Err(CorpusError::InvalidLanguageCode(code))
        }
    }

    pub fn source() -> Self {
        Self(SOURCE_LANGUAGE.to_string())
    }

    pub fn is_source(&self) -> bool {
        self.0 == SOURCE_LANGUAGE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = CorpusError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Languages supported by the corpus, in a fixed order, with display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    entries: Vec<(LanguageCode, String)>,
}

const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("sq", "Albanian"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("eu", "Basque"),
    ("bn", "Bengali"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("ca", "Catalan"),
    ("zh-CN", "Chinese Simplified"),
    ("zh-TW", "Chinese Traditional"),
    ("hr", "Croatian"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("nl", "Dutch"),
    ("en", "English"),
    ("eo", "Esperanto"),
    ("et", "Estonian"),
    ("tl", "Filipino"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("ka", "Georgian"),
    ("de", "German"),
    ("el", "Greek"),
    ("gu", "Gujarati"),
    ("ht", "Haitian Creole"),
    ("iw", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("is", "Icelandic"),
    ("id", "Indonesian"),
    ("ga", "Irish"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("la", "Latin"),
    ("lv", "Latvian"),
    ("lt", "Lithuanian"),
    ("mk", "Macedonian"),
    ("ms", "Malay"),
    ("mt", "Maltese"),
    ("no", "Norwegian"),
    ("fa", "Persian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sr", "Serbian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("es", "Spanish"),
    ("sw", "Swahili"),
    ("sv", "Swedish"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("cy", "Welsh"),
    ("yi", "Yiddish"),
];

impl LanguageCatalog {
    /// Build a catalog from `(code, display name)` pairs; must contain the source language
    pub fn from_entries<I, C, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut catalog = Self { entries: Vec::new() };
        for (code, name) in entries {
            let code = LanguageCode::new(code)?;
            if catalog.contains(&code) {
                return Err(CorpusError::Config(format!("Duplicate catalog language '{}'", code)));
            }
            catalog.entries.push((code, name.into()));
        }

        if !catalog.contains(&LanguageCode::source()) {
            return Err(CorpusError::Config(format!(
                "Language catalog must contain the source language '{}'",
                SOURCE_LANGUAGE
            )));
        }
        Ok(catalog)
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_LANGUAGES
                .iter()
                .map(|(code, name)| (LanguageCode(code.to_string()), name.to_string()))
                .collect(),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &LanguageCode> {
        self.entries.iter().map(|(code, _)| code)
    }

    /// Every catalog language except the source language
    pub fn targets(&self) -> impl Iterator<Item = &LanguageCode> {
        self.codes().filter(|code| !code.is_source())
    }

    pub fn contains(&self, code: &LanguageCode) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    /// Display name, falling back to the code itself
    pub fn name<'a>(&'a self, code: &'a LanguageCode) -> &'a str {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
            .unwrap_or(code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_validation() {
        assert!(LanguageCode::new("en").is_ok());
        assert!(LanguageCode::new("zh-CN").is_ok());
        assert!(LanguageCode::new("haw").is_ok());
        assert!(LanguageCode::new("").is_err());
        assert!(LanguageCode::new("EN").is_err());
        assert!(LanguageCode::new("english").is_err());
        assert!(LanguageCode::new("zh-").is_err());
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.len(), 64);
        assert!(catalog.contains(&LanguageCode::source()));
        assert_eq!(catalog.targets().count(), 63);

        let fr = LanguageCode::new("fr").unwrap();
        assert_eq!(catalog.name(&fr), "French");

        for (code, _) in BUILTIN_LANGUAGES {
            assert!(LanguageCode::new(*code).is_ok(), "builtin code {} must validate", code);
        }
    }

    #[test]
    fn test_catalog_preserves_order_and_requires_source() {
        let catalog = LanguageCatalog::from_entries([("fr", "French"), ("en", "English")]).unwrap();
        let codes: Vec<&str> = catalog.codes().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["fr", "en"]);

        assert!(LanguageCatalog::from_entries([("fr", "French")]).is_err());
        assert!(LanguageCatalog::from_entries([("en", "English"), ("en", "English")]).is_err());
    }

    #[test]
    fn test_unknown_name_falls_back_to_code() {
        let catalog = LanguageCatalog::from_entries([("en", "English")]).unwrap();
        let xx = LanguageCode::new("xx").unwrap();
        assert_eq!(catalog.name(&xx), "xx");
    }
}
