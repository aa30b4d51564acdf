use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::ValidationError;

pub const MIN_TEXT_LENGTH: usize = 50;
pub const MIN_MAX_WORDS: u32 = 10;
pub const MAX_MAX_WORDS: u32 = 500;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    #[default]
    Brief,
    Detailed,
    BulletPoints,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Brief => "brief",
            SummaryType::Detailed => "detailed",
            SummaryType::BulletPoints => "bullet_points",
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub summary_type: SummaryType,
    #[serde(default)]
    pub max_words: Option<u32>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>, summary_type: SummaryType, max_words: Option<u32>) -> Self {
        Self {
            text: text.into(),
            summary_type,
            max_words,
        }
    }

    /// Trims the text and checks the request bounds, returning the normalized request.
    pub fn validate(self, max_text_length: usize) -> Result<Self, ValidationError> {
        let text = self.text.trim().to_string();

        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let length = text.chars().count();
        if length < MIN_TEXT_LENGTH {
            return Err(ValidationError::TextTooShort {
                min: MIN_TEXT_LENGTH,
                actual: length,
            });
        }
        if length > max_text_length {
            return Err(ValidationError::TextTooLong {
                max: max_text_length,
                actual: length,
            });
        }

        if let Some(max_words) = self.max_words {
            if !(MIN_MAX_WORDS..=MAX_MAX_WORDS).contains(&max_words) {
                return Err(ValidationError::MaxWordsOutOfRange {
                    min: MIN_MAX_WORDS,
                    max: MAX_MAX_WORDS,
                    actual: max_words,
                });
            }
        }

        Ok(Self { text, ..self })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct SummarizationResult {
    pub summary: String,
    pub original_length: u32,
    pub summary_length: u32,
    pub compression_ratio: f64,
    pub processing_time: f64,
}

/// Outcome of the coordinator: the result plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub result: SummarizationResult,
    pub from_cache: bool,
}

impl From<(SummarizationResult, bool)> for Summary {
    fn from((result, from_cache): (SummarizationResult, bool)) -> Self {
        Self { result, from_cache }
    }
}
