use serde::Serialize;
use sha2::{Digest, Sha256};

use super::dto::{SummarizeRequest, SummaryType};

// Field order is the canonical (alphabetical) key order and must not change,
// otherwise every cached entry is orphaned.
#[derive(Serialize)]
struct CanonicalRequest<'a> {
    max_words: Option<u32>,
    summary_type: &'a str,
    text: &'a str,
}

pub fn fingerprint(text: &str, summary_type: SummaryType, max_words: Option<u32>) -> String {
    let canonical = CanonicalRequest {
        max_words,
        summary_type: summary_type.as_str(),
        text,
    };

    // Serializing a struct of strings and integers cannot fail.
    let encoded = serde_json::to_vec(&canonical).unwrap_or_default();

    hex::encode(Sha256::digest(&encoded))
}

pub fn request_fingerprint(request: &SummarizeRequest) -> String {
    fingerprint(&request.text, request.summary_type, request.max_words)
}
