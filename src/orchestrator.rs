use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

use crate::aggregate::{Aggregation, KeywordAggregator};
use crate::budget::cap_terms;
use crate::classify::classify_with;
use crate::color::{ColorEncoder, Rgb, CONSERVATIVE_HEADER, LIBERAL_HEADER, SHARED_HEADER};
use crate::config::CloudConfig;
use crate::fetch::TopicSource;
use crate::layout::{font_size, Bounds, Canvas, LayoutEngine, PositionRegistry};
use crate::models::{Maxima, PlacedTerm, Region};
use crate::months::{dedup_months, parse_selection, Month};

pub const NO_DATA_MESSAGE: &str = "No keyword data for the selected months";
pub const LOAD_FAILED_MESSAGE: &str = "Word cloud failed to load, check the data files";

/// Words heavier than this share of their region's maximum are drawn bold.
const BOLD_SHARE: f64 = 0.7;
const MIN_OPACITY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub text: &'static str,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// Dashed vertical separator between two bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divider {
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionLayout {
    pub region: Region,
    pub bounds: Bounds,
    pub header: Header,
    pub terms: Vec<PlacedTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloud {
    pub months: Vec<Month>,
    pub canvas: Canvas,
    pub maxima: Maxima,
    pub dividers: Vec<Divider>,
    pub regions: Vec<RegionLayout>,
    /// Placements accepted after the attempt cap ran out.
    pub crowded: usize,
}

impl WordCloud {
    pub fn term_count(&self) -> usize {
        self.regions.iter().map(|r| r.terms.len()).sum()
    }

    pub fn region(&self, region: Region) -> Option<&RegionLayout> {
        self.regions.iter().find(|r| r.region == region)
    }
}

/// What the renderer is told to show after a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Ready { cloud: WordCloud },
    NoData { message: String },
    Failed { message: String },
}

impl RenderOutcome {
    pub fn cloud(&self) -> Option<&WordCloud> {
        match self {
            RenderOutcome::Ready { cloud } => Some(cloud),
            _ => None,
        }
    }

    fn no_data() -> Self {
        RenderOutcome::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    fn failed(detail: impl std::fmt::Display) -> Self {
        RenderOutcome::Failed {
            message: format!("{LOAD_FAILED_MESSAGE}: {detail}"),
        }
    }
}

fn header_for(region: Region, canvas: &Canvas) -> Header {
    let (text, color) = match region {
        Region::ExclusiveConservative => ("Conservative-only topics", CONSERVATIVE_HEADER),
        Region::Shared => ("Shared topics", SHARED_HEADER),
        Region::ExclusiveLiberal => ("Liberal-only topics", LIBERAL_HEADER),
    };
    Header {
        text,
        x: canvas.band_width() * (region.band_index() as f64 + 0.5),
        y: canvas.height * 0.05,
        color,
    }
}

fn dividers_for(canvas: &Canvas) -> Vec<Divider> {
    let band = canvas.band_width();
    [band, band * 2.0]
        .into_iter()
        .map(|x| Divider {
            x,
            y0: canvas.height * 0.08,
            y1: canvas.height * 0.92,
        })
        .collect()
}

/// Cap, classify, pack and colour an aggregated vocabulary. `None` when nothing survives.
pub fn layout_cloud<R: Rng>(
    aggregation: Aggregation,
    months: &[Month],
    config: &CloudConfig,
    engine: &mut LayoutEngine<R>,
) -> Option<WordCloud> {
    let maxima = aggregation.maxima;
    let terms = cap_terms(aggregation.terms, config.max_terms);
    if terms.is_empty() {
        return None;
    }
    let classified = classify_with(terms, config.threshold);
    let encoder = ColorEncoder::new(maxima);
    let canvas = config.canvas;
    let overall_max = maxima.larger();

    let mut registry = PositionRegistry::new();
    let mut regions = Vec::with_capacity(3);
    let mut crowded = 0usize;

    for region in Region::ORDER {
        let bounds = canvas.region_bounds(region);
        let words = classified.get(region);
        let region_max = words.iter().map(|t| t.total()).fold(0.0_f64, f64::max);

        let mut placed = Vec::with_capacity(words.len());
        for term in words {
            let size = font_size(term.total(), region_max);
            let spot = engine.place(size, &bounds, &registry);
            if !spot.clear {
                crowded += 1;
            }
            registry.push(spot.x, spot.y, size);

            let weight = term.total() / overall_max;
            placed.push(PlacedTerm {
                term: term.clone(),
                x: spot.x,
                y: spot.y,
                size,
                rotation_deg: engine.rotation(),
                color: encoder.color_of(term, region).to_string(),
                opacity: weight.clamp(MIN_OPACITY, 1.0),
                bold: region_max > 0.0 && term.total() / region_max > BOLD_SHARE,
            });
        }

        regions.push(RegionLayout {
            region,
            bounds,
            header: header_for(region, &canvas),
            terms: placed,
        });
    }

    if crowded > 0 {
        debug!("Layout fallback - crowded={} of {} placements", crowded, registry.len());
    }

    Some(WordCloud {
        months: months.to_vec(),
        canvas,
        maxima,
        dividers: dividers_for(&canvas),
        regions,
        crowded,
    })
}

/// Runs render passes against one long-lived aggregator (and its cache).
pub struct CloudRenderer<S> {
    aggregator: KeywordAggregator<S>,
    config: CloudConfig,
}

impl<S: TopicSource> CloudRenderer<S> {
    pub fn new(source: S, config: CloudConfig) -> Self {
        let aggregator = KeywordAggregator::new(source).with_noise_floor(config.noise_floor);
        Self { aggregator, config }
    }

    pub fn aggregator(&self) -> &KeywordAggregator<S> {
        &self.aggregator
    }

    /// Entry point for a raw month selection (e.g. from a brush gesture).
    pub async fn render<T: AsRef<str>>(&self, selection: &[T]) -> RenderOutcome {
        match parse_selection(selection) {
            Ok(months) => self.render_months(&months).await,
            Err(e) => {
                error!("Word cloud render failed - {}", e);
                RenderOutcome::failed(e)
            }
        }
    }

    pub async fn render_months(&self, months: &[Month]) -> RenderOutcome {
        let start = std::time::Instant::now();
        let unique = dedup_months(months);
        let months = unique.as_slice();
        info!("Word cloud pass started - months={}", months.len());

        let aggregation = match self.aggregator.aggregate(months).await {
            Ok(a) => a,
            Err(e) => {
                error!("Word cloud render failed - {}", e);
                return RenderOutcome::failed(e);
            }
        };
        if aggregation.loaded == 0 && !months.is_empty() {
            warn!("No topic data loaded for any selected month");
        }

        let mut engine = match self.config.seed {
            Some(seed) => LayoutEngine::seeded(seed),
            None => LayoutEngine::from_os_rng(),
        }
        .with_max_attempts(self.config.max_attempts);

        match layout_cloud(aggregation, months, &self.config, &mut engine) {
            Some(cloud) => {
                info!(
                    "Word cloud pass completed - duration={:.2}s, terms={}, crowded={}",
                    start.elapsed().as_secs_f32(),
                    cloud.term_count(),
                    cloud.crowded
                );
                RenderOutcome::Ready { cloud }
            }
            None => {
                info!("Word cloud pass completed - no terms to draw");
                RenderOutcome::no_data()
            }
        }
    }

    /// Render and publish; a stale pass never overwrites a newer one.
    pub async fn render_on<T: AsRef<str>>(&self, board: &CloudBoard, selection: &[T]) -> bool {
        let ticket = board.begin();
        let outcome = self.render(selection).await;
        board.publish(ticket, outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket(u64);

/// Holds the most recent pass's outcome (last render wins).
#[derive(Debug, Default)]
pub struct CloudBoard {
    issued: AtomicU64,
    shown: Mutex<Option<(u64, RenderOutcome)>>,
}

impl CloudBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> PassTicket {
        PassTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns false (and drops the outcome) when a newer pass has started.
    pub fn publish(&self, ticket: PassTicket, outcome: RenderOutcome) -> bool {
        let mut shown = self.shown.lock();
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!("Dropping stale word cloud pass - ticket={}", ticket.0);
            return false;
        }
        *shown = Some((ticket.0, outcome));
        true
    }

    pub fn current(&self) -> Option<RenderOutcome> {
        self.shown.lock().as_ref().map(|(_, o)| o.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;

    fn agg(terms: Vec<Term>, con: f64, lib: f64) -> Aggregation {
        Aggregation {
            terms,
            maxima: Maxima { conservative: con, liberal: lib },
            loaded: 1,
            skipped: vec![],
        }
    }

    #[test]
    fn test_layout_assigns_regions_and_encodings() {
        let a = agg(
            vec![
                Term::new("tax", 25.0, 0.0),
                Term::new("budget", 10.0, 0.0),
                Term::new("climate", 0.0, 30.0),
                Term::new("economy", 12.0, 12.0),
            ],
            25.0,
            30.0,
        );
        let mut engine = LayoutEngine::seeded(5);
        let cloud = layout_cloud(a, &[], &CloudConfig::default(), &mut engine).unwrap();

        assert_eq!(cloud.term_count(), 4);
        let con = cloud.region(Region::ExclusiveConservative).unwrap();
        assert_eq!(con.terms[0].term.text, "tax");
        assert_eq!(con.terms[0].size, 60.0);
        assert!(con.terms[0].bold);
        assert!(!con.terms[1].bold);
        assert_eq!(con.terms[1].size, 12.0 + 0.4 * 48.0);
        for t in &con.terms {
            assert!(con.bounds.contains(t.x, t.y));
            assert!((0.9..=1.0).contains(&t.opacity));
        }
        let shared = cloud.region(Region::Shared).unwrap();
        assert_eq!(shared.terms[0].term.text, "economy");
        assert_eq!(cloud.dividers.len(), 2);
        assert_eq!(cloud.regions[0].region, Region::ExclusiveConservative);
        assert_eq!(cloud.regions[2].region, Region::ExclusiveLiberal);
    }

    #[test]
    fn test_opacity_scales_by_larger_party_maximum() {
        let a = agg(vec![Term::new("a", 95.0, 0.0), Term::new("b", 0.0, 100.0)], 95.0, 100.0);
        let mut engine = LayoutEngine::seeded(2);
        let cloud = layout_cloud(a, &[], &CloudConfig::default(), &mut engine).unwrap();

        let a = &cloud.region(Region::ExclusiveConservative).unwrap().terms[0];
        let b = &cloud.region(Region::ExclusiveLiberal).unwrap().terms[0];
        assert!((a.opacity - 0.95).abs() < 1e-12);
        assert_eq!(b.opacity, 1.0);
    }

    #[test]
    fn test_layout_caps_terms() {
        let terms = (0..200).map(|i| Term::new(format!("w{i}"), 1.0 + i as f64, 0.0)).collect();
        let cfg = CloudConfig { max_terms: 120, ..CloudConfig::default() };
        let mut engine = LayoutEngine::seeded(1);
        let cloud = layout_cloud(agg(terms, 200.0, 1.0), &[], &cfg, &mut engine).unwrap();
        assert_eq!(cloud.term_count(), 120);
    }

    #[test]
    fn test_empty_vocabulary_has_no_cloud() {
        let mut engine = LayoutEngine::seeded(1);
        assert!(layout_cloud(agg(vec![], 1.0, 1.0), &[], &CloudConfig::default(), &mut engine).is_none());
    }

    #[test]
    fn test_board_keeps_latest_pass_only() {
        let board = CloudBoard::new();
        let first = board.begin();
        let second = board.begin();
        assert!(board.publish(second, RenderOutcome::no_data()));
        assert!(!board.publish(first, RenderOutcome::failed("late")));
        assert_eq!(board.current(), Some(RenderOutcome::no_data()));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(RenderOutcome::no_data()).unwrap();
        assert_eq!(json["status"], "no_data");
        assert_eq!(json["message"], NO_DATA_MESSAGE);
    }
}
