//! # Text Ingestion
//!
//! Streams whitespace-separated tokens out of a reader, normalizes each one,
//! and feeds the survivors into any [`CounterMap`].
//!
//! Normalization keeps alphanumeric characters only and lowercases them;
//! `"Dombey," → "dombey"`, `"--" → ""` (skipped). Punctuation never splits a
//! token into two, it is simply dropped.

use std::io::{self, BufRead};

use crate::traits::CounterMap;

/// Lowercases `raw` and strips every non-alphanumeric character.
///
/// Returns an empty string for tokens made entirely of punctuation; callers
/// skip those.
///
/// # Example
///
/// ```
/// use tallykit::ingest::normalize_word;
///
/// assert_eq!(normalize_word("Dombey,"), "dombey");
/// assert_eq!(normalize_word("'Tis"), "tis");
/// assert_eq!(normalize_word("--"), "");
/// ```
pub fn normalize_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reads `input` line by line, tallying every normalized token into `map`.
///
/// Returns the number of word occurrences counted (not distinct words).
///
/// # Errors
///
/// Propagates any I/O error from the reader.
pub fn tally_words<R, M>(input: R, map: &mut M) -> io::Result<u64>
where
    R: BufRead,
    M: CounterMap<String>,
{
    let mut occurrences = 0;
    for line in input.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let word = normalize_word(token);
            if word.is_empty() {
                continue;
            }
            *map.counter(word) += 1;
            occurrences += 1;
        }
    }
    Ok(occurrences)
}
