use std::cmp::Ordering;
use tracing::{debug, info};

use crate::models::{Party, Region, Term};

/// A party holding at least this share of a term's weight owns it outright.
pub const EXCLUSIVE_THRESHOLD: f64 = 0.8;

/// The vocabulary split into the three drawing regions, each heaviest-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub conservative: Vec<Term>,
    pub shared: Vec<Term>,
    pub liberal: Vec<Term>,
}

impl Classified {
    pub fn get(&self, region: Region) -> &[Term] {
        match region {
            Region::ExclusiveConservative => &self.conservative,
            Region::Shared => &self.shared,
            Region::ExclusiveLiberal => &self.liberal,
        }
    }

    pub fn len(&self) -> usize {
        self.conservative.len() + self.shared.len() + self.liberal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn region_of(term: &Term, threshold: f64) -> Region {
    if term.dominance(Party::Conservative) >= threshold {
        Region::ExclusiveConservative
    } else if term.dominance(Party::Liberal) >= threshold {
        Region::ExclusiveLiberal
    } else {
        Region::Shared
    }
}

pub fn classify(terms: Vec<Term>) -> Classified {
    classify_with(terms, EXCLUSIVE_THRESHOLD)
}

pub fn classify_with(terms: Vec<Term>, threshold: f64) -> Classified {
    let mut out = Classified::default();
    for t in terms {
        match region_of(&t, threshold) {
            Region::ExclusiveConservative => out.conservative.push(t),
            Region::Shared => out.shared.push(t),
            Region::ExclusiveLiberal => out.liberal.push(t),
        }
    }

    // Stable: equal totals keep their incoming order.
    for v in [&mut out.conservative, &mut out.shared, &mut out.liberal] {
        v.sort_by(|a, b| b.total().partial_cmp(&a.total()).unwrap_or(Ordering::Equal));
    }

    info!(
        "Classification completed - conservative={}, shared={}, liberal={}",
        out.conservative.len(),
        out.shared.len(),
        out.liberal.len()
    );
    for region in Region::ORDER {
        let head: Vec<String> = out
            .get(region)
            .iter()
            .take(5)
            .map(|t| format!("{}(con:{:.1}, lib:{:.1})", t.text, t.conservative, t.liberal))
            .collect();
        debug!("Top terms - region={:?}: {}", region, head.join(", "));
    }

    out
}
