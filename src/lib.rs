//! Union/intersection word cloud for two partisan topic datasets.
//!
//! Monthly topic summaries for each party are merged into one weighted
//! vocabulary, split into conservative-only, shared and liberal-only
//! regions, packed into three canvas bands and coloured from their dual
//! weights.
//!
//! ```no_run
//! use partisan_cloud::{CachedTopicSource, CloudConfig, CloudRenderer, FsTopicSource};
//!
//! # async fn demo() {
//! let source = CachedTopicSource::new(FsTopicSource::new("data/wordcloud_data"));
//! let renderer = CloudRenderer::new(source, CloudConfig::default());
//! let outcome = renderer.render(&["2020-01", "2020-02"]).await;
//! # let _ = outcome;
//! # }
//! ```

pub mod aggregate;
pub mod api_types;
pub mod budget;
pub mod classify;
pub mod color;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod layout;
pub mod models;
pub mod months;
pub mod orchestrator;
pub mod render;
pub mod viz_export;

pub use aggregate::{Aggregation, AggregationContext, KeywordAggregator};
pub use classify::{classify, region_of, Classified, EXCLUSIVE_THRESHOLD};
pub use color::{ColorEncoder, Rgb};
pub use config::CloudConfig;
pub use errors::{CloudError, Result};
pub use fetch::{CachedTopicSource, FsTopicSource, HttpTopicSource, TopicSource};
pub use layout::{Canvas, LayoutEngine, PositionRegistry};
pub use models::{Maxima, Party, PlacedTerm, Region, Term, Topic, TopicRecord};
pub use months::Month;
pub use orchestrator::{CloudBoard, CloudRenderer, RenderOutcome, WordCloud};
