//! Core types shared across Quill components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A request option value that is not one of the supported variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Writing tone requested for the paraphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Academic,
    Creative,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Self::Professional, Self::Casual, Self::Academic, Self::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Academic => "academic",
            Self::Creative => "creative",
        }
    }
}

/// Output length relative to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPreference {
    Shorter,
    #[default]
    Similar,
    Longer,
}

impl LengthPreference {
    pub const ALL: [LengthPreference; 3] = [Self::Shorter, Self::Similar, Self::Longer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shorter => "shorter",
            Self::Similar => "similar",
            Self::Longer => "longer",
        }
    }
}

/// Target language, serialized as its ISO 639-1 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::English, Self::Spanish, Self::French];

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
        }
    }

    /// English display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
        }
    }
}

macro_rules! option_text {
    ($ty:ty, $kind:literal, $label:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.$label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .into_iter()
                    .find(|v| v.$label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

option_text!(Tone, "tone", as_str);
option_text!(LengthPreference, "length preference", as_str);
option_text!(Language, "language", code);

/// Body of `POST /api/paraphrase`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseRequest {
    pub text: String,
    pub target_language: Language,
    pub tone: Tone,
    pub length_preference: LengthPreference,
}

/// Successful paraphrase reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResponse {
    pub paraphrased_text: String,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count("  hello \n\n world\tagain  "), 3);
    }

    #[test]
    fn test_options_parse_case_insensitively() {
        assert_eq!("Casual".parse::<Tone>().unwrap(), Tone::Casual);
        assert_eq!("LONGER".parse::<LengthPreference>().unwrap(), LengthPreference::Longer);
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
    }

    #[test]
    fn test_unknown_option_names_value() {
        let err = "pirate".parse::<Tone>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported tone 'pirate'");

        let err = "de".parse::<Language>().unwrap_err();
        assert_eq!(err.kind, "language");
    }

    #[test]
    fn test_request_uses_camel_case_wire_names() {
        let request = ParaphraseRequest {
            text: "hello world".to_string(),
            target_language: Language::Spanish,
            tone: Tone::Casual,
            length_preference: LengthPreference::Similar,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "text": "hello world",
                "targetLanguage": "es",
                "tone": "casual",
                "lengthPreference": "similar"
            })
        );
    }
}
