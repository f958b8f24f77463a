use serde::{Deserialize, Serialize};

use crate::models::{Topic, TopicRecord};

/// Raw per-(party, month) topic file as written by the upstream LDA job.
/// Unknown fields (month, sample_articles_by_topic, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiTopicMonth {
    #[serde(default)]
    pub total_articles: Option<u64>,
    #[serde(default)]
    pub deep_topics_summary: Option<Vec<ApiTopic>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiTopic {
    #[serde(default)]
    pub importance_ratio: Option<f64>, // 0..100
    #[serde(default)]
    pub core_keywords: Option<Vec<Option<String>>>,
}

impl From<ApiTopicMonth> for TopicRecord {
    fn from(api: ApiTopicMonth) -> Self {
        let topics = api
            .deep_topics_summary
            .unwrap_or_default()
            .into_iter()
            .map(Topic::from)
            .collect();
        TopicRecord {
            total_articles: api.total_articles.unwrap_or(0),
            topics,
        }
    }
}

impl From<ApiTopic> for Topic {
    fn from(api: ApiTopic) -> Self {
        let ratio = api.importance_ratio.unwrap_or(0.0);
        let importance_ratio = if ratio.is_finite() { ratio.clamp(0.0, 100.0) } else { 0.0 };
        let keywords = api
            .core_keywords
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Topic {
            importance_ratio,
            keywords,
        }
    }
}

/// Parse step at the data-source boundary: raw JSON bytes into the strict record.
pub fn parse_topic_record(bytes: &[u8]) -> serde_json::Result<TopicRecord> {
    let api: ApiTopicMonth = serde_json::from_slice(bytes)?;
    Ok(api.into())
}
