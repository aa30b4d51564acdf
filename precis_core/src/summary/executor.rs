use std::sync::Arc;
use std::time::Instant;

use super::dto::{SummarizationResult, SummaryType};
use super::helpers::{build_summarization_prompt, compression_ratio, count_words, round_two_decimals};
use crate::ai::handler::TextGenerator;
use crate::error::ExecutorError;

#[derive(Clone)]
pub struct SummaryExecutor {
    generator: Arc<dyn TextGenerator>,
}

impl SummaryExecutor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn execute(
        &self,
        text: &str,
        summary_type: SummaryType,
        max_words: Option<u32>,
    ) -> Result<SummarizationResult, ExecutorError> {
        let start = Instant::now();
        let prompt = build_summarization_prompt(text, summary_type, max_words);

        let summary = match self.generator.generate(&prompt).await {
            Ok(output) => output.trim().to_string(),
            Err(e) => {
                log::error!("Summary generation failed: {}", e);
                return Err(ExecutorError::Generation(e.to_string()));
            }
        };

        if summary.is_empty() {
            log::error!("Summary generation returned empty output");
            return Err(ExecutorError::EmptyOutput);
        }

        let original_length = count_words(text);
        let summary_length = count_words(&summary);

        Ok(SummarizationResult {
            summary,
            original_length,
            summary_length,
            compression_ratio: compression_ratio(original_length, summary_length),
            processing_time: round_two_decimals(start.elapsed().as_secs_f64()),
        })
    }
}
