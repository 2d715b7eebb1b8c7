//! Text normalization for keyword and field matching.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize text before matching.
///
/// Applies compatibility decomposition (NFKD), drops combining marks so
/// accented letters fold to their base letter, lowercases, and collapses
/// runs of whitespace into single spaces with the ends trimmed.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut normalized = String::with_capacity(folded.len());
    for segment in folded.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
