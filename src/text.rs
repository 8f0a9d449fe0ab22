//! Query text handling: tokenizing, whole-word acronym expansion and the
//! term list the scorer works on.

use crate::utils::month_from_word;
use std::collections::BTreeMap;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '/' || c == '&'
}

/// Splits text into alternating word / separator segments so that
/// substitutions can be made without disturbing punctuation.
fn segments(text: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let word = is_word_char(c);
        match current {
            Some(kind) if kind == word => {}
            Some(kind) => {
                out.push((kind, &text[start..idx]));
                start = idx;
                current = Some(word);
            }
            None => current = Some(word),
        }
    }
    if let Some(kind) = current {
        out.push((kind, &text[start..]));
    }
    out
}

/// Lower-cased words of `text`, punctuation stripped.
pub fn words(text: &str) -> Vec<String> {
    segments(text)
        .into_iter()
        .filter(|(word, _)| *word)
        .map(|(_, w)| w.trim_matches('/').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Replaces every whole-word acronym in the (lower-cased) text with its
/// expansion. Separators are left untouched.
pub fn expand_acronyms(text: &str, acronyms: &BTreeMap<String, String>) -> String {
    let lowered = text.to_lowercase();
    segments(&lowered)
        .into_iter()
        .map(|(word, segment)| {
            if word {
                acronyms
                    .get(segment)
                    .map(String::as_str)
                    .unwrap_or(segment)
            } else {
                segment
            }
        })
        .collect()
}

/// True when `phrase` occurs in `text` on word boundaries.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text_words = words(text);
    let phrase_words = words(phrase);
    if phrase_words.is_empty() || phrase_words.len() > text_words.len() {
        return false;
    }
    text_words
        .windows(phrase_words.len())
        .any(|window| window == phrase_words.as_slice())
}

/// First month named as a whole word in the text.
pub fn month_in_text(text: &str) -> Option<u32> {
    words(text).iter().find_map(|w| month_from_word(w))
}

fn is_year(word: &str) -> bool {
    word.len() == 4 && word.chars().all(|c| c.is_ascii_digit())
}

/// Scoring terms: query words minus stop words, month names and years, with
/// each acronym replaced by its expansion as one multi-word term. Terms
/// shorter than two characters are dropped.
pub fn query_terms(
    text: &str,
    acronyms: &BTreeMap<String, String>,
    stop_words: &[String],
) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in words(text) {
        if word.chars().count() < 2
            || stop_words.iter().any(|s| *s == word)
            || month_from_word(&word).is_some()
            || is_year(&word)
        {
            continue;
        }
        let term = acronyms.get(&word).cloned().unwrap_or(word);
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
