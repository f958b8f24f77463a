use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::api_types::parse_topic_record;
use crate::errors::{CloudError, Result};
use crate::models::{Party, TopicRecord};
use crate::months::Month;

/// Supplier of per-(party, month) topic summaries.
///
/// Any failure to load or parse one pair must come back as
/// [`CloudError::DataUnavailable`] so the aggregator can skip it.
#[async_trait]
pub trait TopicSource: Send + Sync {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>>;
}

#[async_trait]
impl<T: TopicSource + ?Sized> TopicSource for Arc<T> {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        (**self).get(party, month).await
    }
}

#[async_trait]
impl<T: TopicSource + ?Sized> TopicSource for Box<T> {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        (**self).get(party, month).await
    }
}

/* ------------------------------- filesystem ------------------------------- */

/// Reads `<root>/<Party>/<YYYY-MM>.json`.
pub struct FsTopicSource {
    root: PathBuf,
}

impl FsTopicSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, party: Party, month: Month) -> PathBuf {
        self.root.join(party.as_str()).join(format!("{month}.json"))
    }
}

#[async_trait]
impl TopicSource for FsTopicSource {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        let path = self.path_for(party, month);
        debug!("Reading topic file - party={}, month={}, path={}", party, month, path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Topic file not found - {}/{}", party, month);
                return Err(CloudError::data_unavailable(party, month, "not found"));
            }
            Err(e) => {
                return Err(CloudError::data_unavailable(party, month, format!("read {}: {}", path.display(), e)));
            }
        };

        let record = parse_topic_record(&bytes)
            .map_err(|e| CloudError::data_unavailable(party, month, format!("decoding JSON: {e}")))?;
        Ok(Arc::new(record))
    }
}

/* ---------------------------------- HTTP ---------------------------------- */

/// Fetches `<base_url>/<Party>/<YYYY-MM>.json`.
pub struct HttpTopicSource {
    client: Client,
    base: Url,
}

impl HttpTopicSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| CloudError::invalid_config(format!("base_url {base_url:?}: {e}")))?;
        Ok(Self { client, base })
    }

    fn url_for(&self, party: Party, month: Month) -> std::result::Result<Url, url::ParseError> {
        self.base.join(&format!("{}/{}.json", party.as_str(), month))
    }
}

#[async_trait]
impl TopicSource for HttpTopicSource {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        let url = self
            .url_for(party, month)
            .map_err(|e| CloudError::data_unavailable(party, month, e.to_string()))?;
        let start = std::time::Instant::now();
        debug!("Fetching topics - party={}, month={}", party, month);

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CloudError::data_unavailable(party, month, format!("request failed for {url}: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            warn!("Topic file not found (404) - {}/{}", party, month);
            return Err(CloudError::data_unavailable(party, month, "not found (404)"));
        }

        let resp = resp
            .error_for_status()
            .map_err(|e| CloudError::data_unavailable(party, month, format!("HTTP error for {url}: {e}")))?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CloudError::data_unavailable(party, month, format!("reading body of {url}: {e}")))?;
        let record = parse_topic_record(&bytes)
            .map_err(|e| CloudError::data_unavailable(party, month, format!("decoding JSON for {url}: {e}")))?;

        debug!(
            "Topic fetch completed - {}/{}, duration={:.2}s, topics={}",
            party,
            month,
            start.elapsed().as_secs_f32(),
            record.topics.len()
        );
        Ok(Arc::new(record))
    }
}

/* --------------------------------- cache ---------------------------------- */

/// Read-through memo in front of any source. Only successful loads are kept.
pub struct CachedTopicSource<S> {
    inner: S,
    cache: Mutex<HashMap<(Party, Month), Arc<TopicRecord>>>,
}

impl<S: TopicSource> CachedTopicSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_cached(&self, party: Party, month: Month) -> bool {
        self.cache.lock().contains_key(&(party, month))
    }
}

#[async_trait]
impl<S: TopicSource> TopicSource for CachedTopicSource<S> {
    async fn get(&self, party: Party, month: Month) -> Result<Arc<TopicRecord>> {
        let hit = self.cache.lock().get(&(party, month)).cloned();
        if let Some(hit) = hit {
            return Ok(hit);
        }
        let record = self.inner.get(party, month).await?;
        let mut cache = self.cache.lock();
        let entry = Arc::clone(cache.entry((party, month)).or_insert(record));
        debug!("Topic cache fill - {}/{}, entries={}", party, month, cache.len());
        Ok(entry)
    }
}
