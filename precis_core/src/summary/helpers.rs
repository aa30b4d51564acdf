use super::dto::SummaryType;

pub fn build_summarization_prompt(
    text: &str,
    summary_type: SummaryType,
    max_words: Option<u32>,
) -> String {
    let instruction = match summary_type {
        SummaryType::Brief => "Provide a brief, concise summary that captures the main points.",
        SummaryType::Detailed => {
            "Provide a detailed summary that covers all important aspects and key details."
        }
        SummaryType::BulletPoints => {
            "Provide a summary in bullet points format, highlighting key points clearly."
        }
    };

    let mut prompt = format!(
        "Please summarize the following text:\n\n{}\n\n{}",
        text, instruction
    );

    if let Some(max_words) = max_words {
        prompt.push_str(&format!(" Keep the summary under {} words.", max_words));
    }

    prompt
}

pub fn get_summary_cache_key(fingerprint: &str) -> String {
    format!("summary:{}", fingerprint)
}

pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage reduction from `original_length` to `summary_length`, 0 for empty input.
pub fn compression_ratio(original_length: u32, summary_length: u32) -> f64 {
    if original_length == 0 {
        return 0.0;
    }

    let original = original_length as f64;
    round_two_decimals((original - summary_length as f64) / original * 100.0)
}
