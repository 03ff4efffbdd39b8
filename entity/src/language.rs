use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spoken language of the source video, sent along with a transcription request.
///
/// The transcript service accepts loose spellings (`tamil`, `ta`, `ta_in`) and
/// normalizes them itself; the client does the same so that the value it shows
/// matches what the service will use. Codes it does not know are kept verbatim.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Tamil,
    Telugu,
    Kannada,
    Hindi,
    Other(String),
}

impl Language {
    /// Every language offered for selection, in display order.
    pub const SUPPORTED: [Language; 5] = [
        Language::English,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Hindi,
    ];

    /// Code sent on the wire.
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
            Language::Kannada => "kn-IN",
            Language::Hindi => "hi-IN",
            Language::Other(code) => code,
        }
    }

    /// Human readable name for menus.
    pub fn label(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Kannada => "Kannada",
            Language::Hindi => "Hindi",
            Language::Other(code) => code,
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('_', "-");
        Ok(match normalized.as_str() {
            "" | "en" | "english" | "en-us" | "en-in" => Language::English,
            "ta" | "tamil" | "ta-in" => Language::Tamil,
            "te" | "telugu" | "te-in" => Language::Telugu,
            "kn" | "kannada" | "kn-in" => Language::Kannada,
            "hi" | "hindi" | "hi-in" => Language::Hindi,
            _ => Language::Other(value.trim().to_string()),
        })
    }
}

impl From<String> for Language {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(language) => language,
            Err(never) => match never {},
        }
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
