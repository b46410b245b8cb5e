//! Fuzzy string scoring for catalog key lookup.
//!
//! Scores are integers on a 0-100 scale. The top-level [`weighted_ratio`]
//! combines a plain edit-distance ratio with partial (substring) and
//! token-order-insensitive variants, scaling the latter down so an exact
//! full-string match always wins.

use std::collections::BTreeSet;

/// Length ratio above which substring matching is considered.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio above which substring matches are discounted further.
const LONG_PARTIAL_LENGTH_RATIO: f64 = 8.0;

const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;
const TOKEN_SCALE: f64 = 0.95;

/// Lower-case, replace every non-alphanumeric character with a space and
/// collapse runs of whitespace.
pub fn normalize(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score how well `choice` matches `query`, 0-100.
///
/// Both inputs are normalized first; an empty normalized input scores 0.
pub fn weighted_ratio(query: &str, choice: &str) -> u8 {
    let a = normalize(query);
    let b = normalize(choice);

    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let base = ratio(&a_chars, &b_chars);

    let (short_len, long_len) = if a_chars.len() <= b_chars.len() {
        (a_chars.len(), b_chars.len())
    } else {
        (b_chars.len(), a_chars.len())
    };
    let length_ratio = long_len as f64 / short_len as f64;

    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        let token_sort = ratio_str(&sorted_tokens(&a), &sorted_tokens(&b)) * TOKEN_SCALE;
        let token_set = token_set_ratio(&a, &b, false) * TOKEN_SCALE;
        base.max(token_sort).max(token_set)
    } else {
        let scale = if length_ratio < LONG_PARTIAL_LENGTH_RATIO {
            PARTIAL_SCALE
        } else {
            LONG_PARTIAL_SCALE
        };
        let partial = partial_ratio(&a_chars, &b_chars) * scale;
        let partial_sort = partial_ratio_str(&sorted_tokens(&a), &sorted_tokens(&b))
            * TOKEN_SCALE
            * scale;
        let partial_set = token_set_ratio(&a, &b, true) * TOKEN_SCALE * scale;
        base.max(partial).max(partial_sort).max(partial_set)
    };

    to_score(best)
}

/// Best-scoring choice for `query`. Ties keep the earliest choice.
///
/// Returns `None` only when `choices` is empty.
pub fn best_match<'a, I>(query: &str, choices: I) -> Option<(&'a str, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, u8)> = None;

    for choice in choices {
        let score = weighted_ratio(query, choice);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((choice, score)),
        }
    }

    best
}

/// Similarity in [0, 100] based on insertion/deletion distance.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let distance = indel_distance(a, b);
    100.0 * (total - distance) as f64 / total as f64
}

fn ratio_str(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}

/// Best ratio of the shorter input against every same-length window of the longer.
fn partial_ratio(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0.0;
    }

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        best = best.max(ratio(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn partial_ratio_str(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    partial_ratio(&a, &b)
}

/// Compare the shared tokens against each side's full token set.
fn token_set_ratio(a: &str, b: &str, partial: bool) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join_tokens(tokens_a.intersection(&tokens_b).copied());
    let only_a = join_tokens(tokens_a.difference(&tokens_b).copied());
    let only_b = join_tokens(tokens_b.difference(&tokens_a).copied());

    let combined_a = format!("{} {}", shared, only_a).trim().to_string();
    let combined_b = format!("{} {}", shared, only_b).trim().to_string();

    let score = if partial { partial_ratio_str } else { ratio_str };

    let mut best = score(&combined_a, &combined_b);
    if !shared.is_empty() {
        best = best
            .max(score(&shared, &combined_a))
            .max(score(&shared, &combined_b));
    }
    best
}

fn sorted_tokens(input: &str) -> String {
    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

/// Edit distance counting only insertions and deletions (a substitution costs 2).
fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for j in 1..=b.len() {
            curr[j] = if *ca == b[j - 1] {
                prev[j - 1]
            } else {
                (prev[j] + 1).min(curr[j - 1] + 1)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
