//! Lexical relevance heuristics.
//!
//! These are deterministic fallbacks for when no model score is available.
//! They only look at substring containment, never at token statistics.

/// Score for an exact name match in [`simple_match`].
const EXACT_NAME_WEIGHT: f64 = 1.0;
/// Score when the name contains the query.
const NAME_CONTAINS_QUERY_WEIGHT: f64 = 0.5;
/// Score when the query contains the name.
const QUERY_CONTAINS_NAME_WEIGHT: f64 = 0.3;
/// Score when the comment contains the query.
const COMMENT_CONTAINS_QUERY_WEIGHT: f64 = 0.2;

/// Additive name/comment relevance of a concept or property to `query`.
///
/// - `+1.0` if `name == query`
/// - `+0.5` if `name` contains `query` (case-insensitive)
/// - `+0.3` if `query` contains `name` (case-insensitive)
/// - `+0.2` if `comment` contains `query` (case-insensitive)
///
/// A blank query scores zero.
pub fn simple_match(query: &str, name: &str, comment: &str) -> f64 {
    if query.trim().is_empty() {
        return 0.0;
    }

    let mut score = 0.0;

    if name == query {
        score += EXACT_NAME_WEIGHT;
    }

    if !name.is_empty() {
        if contains_fold(name, query) {
            score += NAME_CONTAINS_QUERY_WEIGHT;
        }
        if contains_fold(query, name) {
            score += QUERY_CONTAINS_NAME_WEIGHT;
        }
    }

    if !comment.is_empty() && contains_fold(comment, query) {
        score += COMMENT_CONTAINS_QUERY_WEIGHT;
    }

    score
}

/// First-match relevance of an instance name to `query`.
///
/// Unlike [`simple_match`] the rules are exclusive: the first that applies wins.
pub fn instance_name_score(query: &str, instance_name: &str, exact_match_score: f64) -> f64 {
    let query = query.trim();
    let name = instance_name.trim();
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }

    if name == query {
        exact_match_score
    } else if contains_fold(name, query) {
        NAME_CONTAINS_QUERY_WEIGHT
    } else if contains_fold(query, name) {
        QUERY_CONTAINS_NAME_WEIGHT
    } else {
        0.0
    }
}

/// Case-insensitive substring test.
fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
