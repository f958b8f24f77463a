//! End-to-end behaviour of aggregation, classification and layout against an in-memory source.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use partisan_cloud::layout::{LayoutEngine, PositionRegistry};
use partisan_cloud::orchestrator::{layout_cloud, LOAD_FAILED_MESSAGE, NO_DATA_MESSAGE};
use partisan_cloud::*;

#[derive(Default)]
struct MemorySource {
    records: HashMap<(Party, Month), TopicRecord>,
    fatal: Option<(Party, Month)>,
    calls: AtomicUsize,
}

impl MemorySource {
    fn with(mut self, party: Party, month: &str, total: u64, topics: &[(f64, &[&str])]) -> Self {
        let rec = TopicRecord {
            total_articles: total,
            topics: topics
                .iter()
                .map(|(r, kws)| Topic {
                    importance_ratio: *r,
                    keywords: kws.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        };
        self.records.insert((party, month.parse().unwrap()), rec);
        self
    }
}

#[async_trait]
impl TopicSource for MemorySource {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fatal == Some((party, month)) {
            return Err(CloudError::invalid_config("source misconfigured"));
        }
        self.records
            .get(&(party, month))
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| CloudError::data_unavailable(party, month, "not found"))
    }
}

fn months(ids: &[&str]) -> Vec<Month> {
    ids.iter().map(|s| s.parse().unwrap()).collect()
}

fn seeded_config() -> CloudConfig {
    CloudConfig {
        seed: Some(17),
        ..CloudConfig::default()
    }
}

#[tokio::test]
async fn test_single_party_month_scenario() {
    let source = MemorySource::default().with(Party::Conservative, "2020-01", 100, &[(50.0, &["tax", "budget"])]);
    let agg = KeywordAggregator::new(source).aggregate(&months(&["2020-01"])).await.unwrap();

    assert_eq!(agg.terms.len(), 2);
    for t in &agg.terms {
        assert!((t.conservative - 25.0).abs() < 1e-9);
        assert_eq!(t.liberal, 0.0);
    }
    assert_eq!(agg.loaded, 1);
    assert_eq!(agg.skipped, vec![(Party::Liberal, "2020-01".parse::<Month>().unwrap())]);
    assert_eq!(agg.maxima.conservative, 25.0);
    assert_eq!(agg.maxima.liberal, 1.0);

    let classified = classify(agg.terms);
    let texts: BTreeSet<&str> = classified.conservative.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, BTreeSet::from(["tax", "budget"]));
    assert!(classified.shared.is_empty());
    assert!(classified.liberal.is_empty());
}

#[tokio::test]
async fn test_both_parties_merge_into_one_vocabulary() {
    let source = MemorySource::default()
        .with(Party::Conservative, "2020-01", 100, &[(40.0, &["economy", "tax"])])
        .with(Party::Liberal, "2020-01", 50, &[(80.0, &["economy", "climate"])])
        .with(Party::Liberal, "2020-02", 10, &[(100.0, &["climate"])]);
    let agg = KeywordAggregator::new(source)
        .aggregate(&months(&["2020-01", "2020-02"]))
        .await
        .unwrap();

    let by_text: HashMap<&str, &Term> = agg.terms.iter().map(|t| (t.text.as_str(), t)).collect();
    assert_eq!(by_text["economy"].conservative, 20.0);
    assert_eq!(by_text["economy"].liberal, 20.0);
    assert_eq!(by_text["climate"].liberal, 30.0);
    assert_eq!(agg.maxima.liberal, 30.0);
    assert_eq!(agg.skipped.len(), 1);

    let c = classify(agg.terms);
    assert_eq!(c.shared[0].text, "economy");
    assert_eq!(c.conservative[0].text, "tax");
    assert_eq!(c.liberal[0].text, "climate");
}

#[tokio::test]
async fn test_aggregation_is_idempotent_on_cached_source() {
    let source = CachedTopicSource::new(
        MemorySource::default()
            .with(Party::Conservative, "2018-03", 33, &[(33.3, &["a", "b", "c"]), (12.5, &["b", "d"])])
            .with(Party::Liberal, "2018-03", 71, &[(60.0, &["c", "e"]), (7.0, &["a"])])
            .with(Party::Liberal, "2018-04", 5, &[(90.0, &["e", "f", "g"])]),
    );
    let aggregator = KeywordAggregator::new(source);
    let sel = months(&["2018-03", "2018-04"]);

    let first = aggregator.aggregate(&sel).await.unwrap();
    let second = aggregator.aggregate(&sel).await.unwrap();
    assert_eq!(first.terms, second.terms);
    assert_eq!(first.maxima, second.maxima);
    assert_eq!(classify(first.terms), classify(second.terms));

    // second run served from cache: 3 hits stored, missing pair retried
    assert_eq!(aggregator.source().cached_len(), 3);
}

#[tokio::test]
async fn test_repeated_month_counts_once() {
    let build = || MemorySource::default().with(Party::Conservative, "2020-01", 100, &[(50.0, &["tax", "budget"])]);
    let jan: Month = "2020-01".parse().unwrap();

    let agg = KeywordAggregator::new(build()).aggregate(&[jan, jan]).await.unwrap();
    assert_eq!(agg.terms.len(), 2);
    assert!(agg.terms.iter().all(|t| (t.conservative - 25.0).abs() < 1e-9));
    assert_eq!(agg.maxima.conservative, 25.0);
    assert_eq!(agg.loaded, 1);
    assert_eq!(agg.skipped.len(), 1);

    let renderer = CloudRenderer::new(build(), seeded_config());
    let outcome = renderer.render_months(&[jan, jan]).await;
    let cloud = outcome.cloud().unwrap();
    assert_eq!(cloud.maxima.conservative, 25.0);
    assert_eq!(cloud.months, vec![jan]);
    assert_eq!(cloud.term_count(), 2);
    assert_eq!(renderer.aggregator().source().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_partition_is_complete() {
    let source = MemorySource::default()
        .with(Party::Conservative, "2021-06", 200, &[(30.0, &["w1", "w2", "w3"]), (20.0, &["w4", "w5"])])
        .with(Party::Liberal, "2021-06", 180, &[(25.0, &["w3", "w5", "w6"]), (5.0, &["w1"])]);
    let agg = KeywordAggregator::new(source).aggregate(&months(&["2021-06"])).await.unwrap();
    let input: BTreeSet<String> = agg.terms.iter().map(|t| t.text.clone()).collect();
    let n = agg.terms.len();

    let c = classify(agg.terms);
    assert_eq!(c.len(), n);
    let output: BTreeSet<String> = Region::ORDER
        .iter()
        .flat_map(|r| c.get(*r).iter().map(|t| t.text.clone()))
        .collect();
    assert_eq!(input, output);
}

#[tokio::test]
async fn test_unrecoverable_source_error_fails_the_pass() {
    let mut source = MemorySource::default().with(Party::Conservative, "2020-01", 10, &[(50.0, &["x"])]);
    source.fatal = Some((Party::Liberal, "2020-01".parse().unwrap()));
    let renderer = CloudRenderer::new(source, seeded_config());

    match renderer.render(&["2020-01"]).await {
        RenderOutcome::Failed { message } => assert!(message.starts_with(LOAD_FAILED_MESSAGE)),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_month_fails_without_fetching() {
    let renderer = CloudRenderer::new(MemorySource::default(), seeded_config());
    let outcome = renderer.render(&["2020-01", "2020-13"]).await;
    assert!(matches!(outcome, RenderOutcome::Failed { .. }));
    assert_eq!(renderer.aggregator().source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_everything_reports_no_data() {
    let renderer = CloudRenderer::new(MemorySource::default(), seeded_config());
    let outcome = renderer.render(&["2011-01", "2011-02"]).await;
    assert_eq!(
        outcome,
        RenderOutcome::NoData {
            message: NO_DATA_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_seeded_render_is_reproducible() {
    let build = || {
        MemorySource::default()
            .with(Party::Conservative, "2020-01", 100, &[(50.0, &["tax", "budget", "border"])])
            .with(Party::Liberal, "2020-01", 100, &[(50.0, &["climate", "budget", "health"])])
    };
    let a = CloudRenderer::new(build(), seeded_config()).render(&["2020-01"]).await;
    let b = CloudRenderer::new(build(), seeded_config()).render(&["2020-01"]).await;
    assert_eq!(a, b);
    let cloud = a.cloud().unwrap();
    assert_eq!(cloud.term_count(), 5);
    assert_eq!(cloud.region(Region::Shared).unwrap().terms[0].term.text, "budget");
}

#[tokio::test]
async fn test_board_shows_newest_render() {
    let source = MemorySource::default().with(Party::Liberal, "2020-01", 10, &[(100.0, &["vote"])]);
    let renderer = CloudRenderer::new(source, seeded_config());
    let board = CloudBoard::new();

    assert!(renderer.render_on(&board, &["2020-01"]).await);
    assert!(board.current().unwrap().cloud().is_some());
    assert!(renderer.render_on(&board, &["2020-02"]).await);
    assert!(matches!(board.current(), Some(RenderOutcome::NoData { .. })));
}

#[test]
fn test_most_placements_keep_their_distance() {
    // One dominant word per band, the rest small.
    let mut terms = vec![
        Term::new("c-top", 100.0, 0.0),
        Term::new("s-top", 50.0, 50.0),
        Term::new("l-top", 0.0, 100.0),
    ];
    for i in 0..24 {
        let w = 1.0 + (i % 3) as f64;
        terms.push(Term::new(format!("c{i}"), w, 0.0));
        terms.push(Term::new(format!("s{i}"), w / 2.0, w / 2.0));
        terms.push(Term::new(format!("l{i}"), 0.0, w));
    }
    let agg = Aggregation {
        terms,
        maxima: Maxima { conservative: 100.0, liberal: 100.0 },
        loaded: 2,
        skipped: vec![],
    };
    let cfg = CloudConfig {
        canvas: Canvas::new(1500.0, 900.0),
        ..CloudConfig::default()
    };

    for seed in 0..5 {
        let cloud = layout_cloud(agg.clone(), &[], &cfg, &mut LayoutEngine::seeded(seed)).unwrap();
        let mut registry = PositionRegistry::new();
        let mut ok = 0usize;
        let mut total = 0usize;
        for region in &cloud.regions {
            assert_eq!(region.terms.len(), 25);
            for p in &region.terms {
                if !registry.crowds(p.x, p.y, p.size) {
                    ok += 1;
                }
                total += 1;
                registry.push(p.x, p.y, p.size);
            }
        }
        assert_eq!(total - ok, cloud.crowded);
        assert!(ok as f64 / total as f64 >= 0.95, "seed {seed}: {ok}/{total} clear");
    }
}
