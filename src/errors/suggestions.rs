//! "Did you mean?" hints for chain names and option keys
//!
//! Middleware names are short lowercase words (`hex`, `dblneg`) while option
//! keys are long CamelCase identifiers sharing prefixes (`FiltCaseProb`,
//! `AttrsCaseProb`). Both are ranked with Jaro-Winkler, whose prefix bonus
//! favours keys from the same `Filt`/`Attrs` family.

use std::cmp::Ordering;

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler score for a candidate to be offered
const DEFAULT_THRESHOLD: f64 = 0.6;

/// Candidates scoring above `threshold`, best first
fn ranked<'a>(input: &str, candidates: &[&'a str], threshold: f64) -> Vec<(f64, &'a str)> {
    let mut scored: Vec<(f64, &'a str)> = candidates
        .iter()
        .map(|candidate| (jaro_winkler(input, candidate), *candidate))
        .filter(|(score, _)| *score > threshold)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored
}

/// Closest middleware name or option key, if any is close enough
pub fn find_similar<'a>(input: &str, candidates: &[&'a str], threshold: f64) -> Option<&'a str> {
    ranked(input, candidates, threshold)
        .first()
        .map(|(_, name)| *name)
}

/// Up to `max_results` close candidates, best first
pub fn find_similar_multiple<'a>(
    input: &str,
    candidates: &[&'a str],
    threshold: f64,
    max_results: usize,
) -> Vec<&'a str> {
    ranked(input, candidates, threshold)
        .into_iter()
        .take(max_results)
        .map(|(_, name)| name)
        .collect()
}

/// Suggestion for an unknown middleware name in a chain
pub fn suggest_middleware(unknown: &str, known: &[&str]) -> String {
    let lowered = unknown.to_lowercase();
    if let Some(suggestion) = find_similar(&lowered, known, DEFAULT_THRESHOLD) {
        format!(
            "Did you mean '{}'?\n\nList available middlewares with: ldapmorph middlewares",
            suggestion
        )
    } else {
        format!(
            "Available middlewares: {}\n\nList details with: ldapmorph middlewares",
            known.join(", ")
        )
    }
}

/// Suggestion for an unknown option key; keys are case sensitive, so a
/// case-only mismatch is called out first
pub fn suggest_option(unknown: &str, known: &[&str]) -> String {
    if let Some(exact) = known.iter().find(|k| k.eq_ignore_ascii_case(unknown)) {
        return format!("Option keys are case sensitive. Did you mean '{}'?", exact);
    }

    let similar = find_similar_multiple(unknown, known, DEFAULT_THRESHOLD, 3);
    if similar.is_empty() {
        "List all option keys with: ldapmorph options".to_string()
    } else {
        format!(
            "Did you mean one of: {}?\n\nList all option keys with: ldapmorph options",
            similar.join(", ")
        )
    }
}
