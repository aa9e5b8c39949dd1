use serde::{Deserialize, Serialize};

/// Named-entity category emitted by the upstream NER stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    LOC,
    PER,
    ORG,
    MISC,
}

impl EntityLabel {
    pub fn is_location(&self) -> bool {
        matches!(self, EntityLabel::LOC)
    }
}

/// One labeled span from the NER stage. `text` is immutable once stored
/// except for the canonicalization rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntitySpan {
    #[serde(rename = "entity")]
    pub text: String,
    pub label: EntityLabel,
}

/// One article of a daily batch. Read-only to the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "ner", default)]
    pub entities: Vec<NamedEntitySpan>,
}

/// A whole day's worth of processed articles, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyBatch {
    #[serde(default)]
    pub data: Vec<Article>,
}

/// One provider registry record. Extra fields in the source JSON (feed
/// urls, language, flags) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRecord {
    pub id: String,
    pub country: String,
}
