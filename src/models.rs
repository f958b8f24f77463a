use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Party {
    Conservative, // party A
    Liberal,      // party B
}

impl Party {
    pub const ALL: [Party; 2] = [Party::Conservative, Party::Liberal];

    /// Directory / path segment used by the topic data layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::Conservative => "Conservative",
            Party::Liberal => "Liberal",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict per-(party, month) topic summary, produced once at the data-source boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub total_articles: u64,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub importance_ratio: f64, // [0, 100]
    pub keywords: Vec<String>,
}

/// One vocabulary entry after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub text: String,
    pub conservative: f64,
    pub liberal: f64,
}

impl Term {
    pub fn new(text: impl Into<String>, conservative: f64, liberal: f64) -> Self {
        Self {
            text: text.into(),
            conservative,
            liberal,
        }
    }

    pub fn total(&self) -> f64 {
        self.conservative + self.liberal
    }

    pub fn weight(&self, party: Party) -> f64 {
        match party {
            Party::Conservative => self.conservative,
            Party::Liberal => self.liberal,
        }
    }

    /// Share of the combined weight held by `party`; 0 when the term has no weight.
    pub fn dominance(&self, party: Party) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.weight(party) / total
    }
}

/// Global per-party maxima observed during one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Maxima {
    pub conservative: f64,
    pub liberal: f64,
}

impl Maxima {
    pub fn of(&self, party: Party) -> f64 {
        match party {
            Party::Conservative => self.conservative,
            Party::Liberal => self.liberal,
        }
    }

    pub fn larger(&self) -> f64 {
        self.conservative.max(self.liberal)
    }
}

impl Default for Maxima {
    fn default() -> Self {
        Self {
            conservative: 1.0,
            liberal: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    ExclusiveConservative,
    Shared,
    ExclusiveLiberal,
}

impl Region {
    /// Fixed left-to-right drawing order.
    pub const ORDER: [Region; 3] = [
        Region::ExclusiveConservative,
        Region::Shared,
        Region::ExclusiveLiberal,
    ];

    pub fn band_index(&self) -> usize {
        match self {
            Region::ExclusiveConservative => 0,
            Region::Shared => 1,
            Region::ExclusiveLiberal => 2,
        }
    }

    /// The party owning an exclusive region.
    pub fn owner(&self) -> Option<Party> {
        match self {
            Region::ExclusiveConservative => Some(Party::Conservative),
            Region::Shared => None,
            Region::ExclusiveLiberal => Some(Party::Liberal),
        }
    }
}

/// A term with everything the renderer needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTerm {
    pub term: Term,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub rotation_deg: i32, // [-15, 15]
    pub color: String,
    pub opacity: f64,
    pub bold: bool,
}
