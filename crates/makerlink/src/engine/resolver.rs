//! Fuzzy resolution of spoken names to catalog labels and attribute names.
//!
//! Spoken text rarely matches a label exactly ("the living room lights" for
//! "Living Room Light"), so candidates are scored with a token-sort ratio: case,
//! punctuation and word order are ignored, and the remaining strings are
//! compared by their longest common subsequence.

use tracing::debug;

use super::catalog::Catalog;
use super::error::Error;
use super::error::Result;
use crate::config::AttributeDefaults;

/// Drop non-ASCII characters, lowercase, strip punctuation, and sort the
/// words of `s`.
fn sorted_tokens(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        let mut diagonal = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Similarity of two strings on a 0–100 scale, insensitive to case and word order.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = sorted_tokens(a).chars().collect();
    let b: Vec<char> = sorted_tokens(b).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let ratio = 2.0 * lcs_len(&a, &b) as f64 / (a.len() + b.len()) as f64;
    (100.0 * ratio).round_ties_even() as u8
}

/// Pick the candidate scoring strictly above `min_score`.
///
/// Candidates are scanned in order and only a strictly higher score replaces
/// the current best, so on ties the earliest candidate wins.
pub fn best_match<'a>(
    text: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    min_score: u8,
) -> Option<(&'a str, u8)> {
    let mut best: Option<(&'a str, u8)> = None;
    for candidate in candidates {
        let score = token_sort_ratio(candidate, text);
        debug!("candidate={:?}, utterance={:?}, score={}", candidate, text, score);
        if score > best.map_or(min_score, |(_, s)| s) {
            best = Some((candidate, score));
        }
    }
    best
}

/// Resolve spoken text to a catalog label.
pub fn resolve_device(catalog: &Catalog, text: &str, min_score: u8) -> Result<String> {
    match best_match(text, catalog.labels(), min_score) {
        Some((label, score)) => {
            debug!("Changed {:?} to {:?} (score {})", text, label, score);
            Ok(label.to_string())
        }
        None => {
            debug!("No device found for {:?}", text);
            Err(Error::DeviceNotFound {
                text: text.to_string(),
            })
        }
    }
}

/// Resolve spoken text to a configured attribute name.
pub fn resolve_attribute(defaults: &AttributeDefaults, text: &str, min_score: u8) -> Result<String> {
    match best_match(text, defaults.names(), min_score) {
        Some((name, score)) => {
            debug!("Changed {:?} to {:?} (score {})", text, name, score);
            Ok(name.to_string())
        }
        None => {
            debug!("No attribute found for {:?}", text);
            Err(Error::AttributeNotFound {
                text: text.to_string(),
            })
        }
    }
}
