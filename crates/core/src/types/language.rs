//! Display languages and multilingual text.

use core::fmt;
use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the storefront can display.
///
/// English is the default and the fallback for missing translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
    Ja,
    Zh,
}

impl Language {
    /// Every supported language, fallback first.
    pub const ALL: [Self; 4] = [Self::En, Self::Ko, Self::Ja, Self::Zh];

    /// ISO 639-1 code, as sent in the `lang` query parameter.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
            Self::Ja => "ja",
            Self::Zh => "zh",
        }
    }

    /// Whether this is the fallback language.
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::En)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown language code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Parses `en`, `EN`, and region-tagged forms like `ko-KR`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == primary)
            .ok_or_else(|| UnsupportedLanguage(s.to_owned()))
    }
}

/// Translations of one field, keyed by language code.
///
/// The restaurant API delivers multilingual names and descriptions as a plain
/// `{"en": "...", "ko": "..."}` object; unknown codes are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(HashMap<String, String>);

impl LocalizedText {
    /// Create an empty set of translations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.0.insert(language.code().to_owned(), text.into());
        self
    }

    /// The non-blank translation for a language, if any.
    #[must_use]
    pub fn get(&self, language: Language) -> Option<&str> {
        self.0
            .get(language.code())
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Whether no translations are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Language, String)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (Language, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(lang, text)| (lang.code().to_owned(), text))
                .collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("KO".parse::<Language>().unwrap(), Language::Ko);
        assert_eq!("ko-KR".parse::<Language>().unwrap(), Language::Ko);
        assert_eq!("zh_Hant".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Ja).unwrap(), "\"ja\"");
        let lang: Language = serde_json::from_str("\"zh\"").unwrap();
        assert_eq!(lang, Language::Zh);
    }

    #[test]
    fn test_localized_text_skips_blank() {
        let text = LocalizedText::new()
            .with(Language::En, "Fried chicken")
            .with(Language::Ko, "  ");

        assert_eq!(text.get(Language::En), Some("Fried chicken"));
        assert_eq!(text.get(Language::Ko), None);
        assert_eq!(text.get(Language::Ja), None);
    }

    #[test]
    fn test_localized_text_deserializes_unknown_codes() {
        let text: LocalizedText =
            serde_json::from_str(r#"{"en": "Noodles", "fr": "Nouilles"}"#).unwrap();
        assert_eq!(text.get(Language::En), Some("Noodles"));
    }
}
