use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fetch::TopicSource;
use crate::models::{Maxima, Party, Term, TopicRecord};
use crate::months::{dedup_months, Month};

/// Terms whose combined weight does not exceed this are dropped as noise.
pub const DEFAULT_NOISE_FLOOR: f64 = 0.1;

/// Output of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Ordered by text; callers re-sort by weight as needed.
    pub terms: Vec<Term>,
    /// Global maxima over the whole vocabulary, each defaulted to 1 when zero.
    pub maxima: Maxima,
    pub loaded: usize,
    pub skipped: Vec<(Party, Month)>,
}

/// Running state of one aggregation call.
#[derive(Debug, Default)]
pub struct AggregationContext {
    terms: BTreeMap<String, Term>,
    max_conservative: f64,
    max_liberal: f64,
}

impl AggregationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spread each topic's share of the month's volume evenly across its keywords.
    pub fn fold_record(&mut self, party: Party, record: &TopicRecord) {
        if record.total_articles == 0 {
            return;
        }
        let total = record.total_articles as f64;

        for topic in &record.topics {
            let ratio = topic.importance_ratio / 100.0;
            if ratio.is_nan() || ratio <= 0.0 {
                continue;
            }
            let keywords: Vec<&str> = topic
                .keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .collect();
            let per_keyword = total * ratio / keywords.len().max(1) as f64;

            for kw in keywords {
                self.add(party, kw, per_keyword);
            }
        }
    }

    fn add(&mut self, party: Party, text: &str, weight: f64) {
        let term = self
            .terms
            .entry(text.to_string())
            .or_insert_with(|| Term::new(text, 0.0, 0.0));
        match party {
            Party::Conservative => {
                term.conservative += weight;
                self.max_conservative = self.max_conservative.max(term.conservative);
            }
            Party::Liberal => {
                term.liberal += weight;
                self.max_liberal = self.max_liberal.max(term.liberal);
            }
        }
    }

    /// Raw running maxima (zero until something is folded).
    pub fn running_maxima(&self) -> (f64, f64) {
        (self.max_conservative, self.max_liberal)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.terms.len()
    }

    pub fn finish(self, noise_floor: f64) -> (Vec<Term>, Maxima) {
        let maxima = Maxima {
            conservative: if self.max_conservative > 0.0 { self.max_conservative } else { 1.0 },
            liberal: if self.max_liberal > 0.0 { self.max_liberal } else { 1.0 },
        };
        let terms = self
            .terms
            .into_values()
            .filter(|t| t.total() > noise_floor)
            .collect();
        (terms, maxima)
    }
}

/// Merges both parties' monthly topic summaries into one weighted vocabulary.
pub struct KeywordAggregator<S> {
    source: S,
    noise_floor: f64,
}

impl<S: TopicSource> KeywordAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            noise_floor: DEFAULT_NOISE_FLOOR,
        }
    }

    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches run concurrently; folding happens afterwards in (party, month) order.
    /// Repeated months count once. A pair that fails with a recoverable error is
    /// skipped; anything else aborts.
    pub async fn aggregate(&self, months: &[Month]) -> Result<Aggregation> {
        let start = std::time::Instant::now();
        let months = dedup_months(months);
        let pairs: Vec<(Party, Month)> = Party::ALL
            .iter()
            .flat_map(|&p| months.iter().map(move |&m| (p, m)))
            .collect();
        debug!("Aggregation started - months={}, fetches={}", months.len(), pairs.len());

        let fetches = pairs.iter().map(|&(p, m)| self.source.get(p, m));
        let results = futures::future::join_all(fetches).await;

        let mut ctx = AggregationContext::new();
        let mut loaded = 0usize;
        let mut skipped = Vec::new();
        for (&(party, month), result) in pairs.iter().zip(results) {
            match result {
                Ok(record) => {
                    ctx.fold_record(party, &record);
                    loaded += 1;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping topic data - {}/{}: {}", party, month, e);
                    skipped.push((party, month));
                }
                Err(e) => return Err(e),
            }
        }

        let vocabulary = ctx.vocabulary_len();
        let (raw_con, raw_lib) = ctx.running_maxima();
        let (terms, maxima) = ctx.finish(self.noise_floor);
        info!(
            "Keyword aggregation completed - duration={:.2}s, loaded={}, skipped={}, vocabulary={}, kept={}, max_con={:.2}, max_lib={:.2}",
            start.elapsed().as_secs_f32(),
            loaded,
            skipped.len(),
            vocabulary,
            terms.len(),
            raw_con,
            raw_lib
        );

        Ok(Aggregation {
            terms,
            maxima,
            loaded,
            skipped,
        })
    }
}
