use std::cmp::Ordering;

use crate::models::Term;

/// Upper bound on terms drawn in one pass.
pub const DEFAULT_MAX_TERMS: usize = 120;

/// Keep the `max_terms` heaviest terms, heaviest first. Ties keep input order.
pub fn cap_terms(mut terms: Vec<Term>, max_terms: usize) -> Vec<Term> {
    terms.sort_by(|a, b| b.total().partial_cmp(&a.total()).unwrap_or(Ordering::Equal));
    terms.truncate(max_terms);
    terms
}
