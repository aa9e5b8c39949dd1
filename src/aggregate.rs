//! Single-pass aggregation of one date's articles into raw mention
//! matrices. One invocation per date; no shared mutable state, so
//! independent dates can run on the worker pool side by side.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::country::CountryCode;
use crate::gazetteer::{Gazetteer, Resolution};
use crate::models::{Article, DailyBatch};
use crate::providers::ProviderRegistry;

/// Frequency table with a pinned first-seen order so top-N selection and
/// tie-breaks never depend on hash iteration.
#[derive(Debug, Clone, Default)]
pub struct FreqTable {
    counts: HashMap<String, u64>,
    order: Vec<String>,
}

impl FreqTable {
    pub fn bump(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
                self.order.push(key.to_string());
            }
        }
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Highest-count entries; ties resolve to the earlier first-seen entry.
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(usize, &str, u64)> = self
            .order
            .iter()
            .enumerate()
            .map(|(pos, key)| (pos, key.as_str(), self.counts[key]))
            .collect();
        entries.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        entries.into_iter().take(n).map(|(_, k, c)| (k, c)).collect()
    }

    /// The single highest-count entry, ties to the earliest first seen.
    pub fn dominant(&self) -> Option<(&str, u64)> {
        self.top(1).into_iter().next()
    }
}

/// Raw per-date matrices. Created fresh per date, never persisted raw.
#[derive(Debug, Clone, Default)]
pub struct DailyMatrices {
    pub import_counts: BTreeMap<CountryCode, u64>,
    pub export_counts: BTreeMap<CountryCode, u64>,
    /// featured -> covering -> count
    pub coverage: BTreeMap<CountryCode, BTreeMap<CountryCode, u64>>,
    /// covering -> featured -> count
    pub covering: BTreeMap<CountryCode, BTreeMap<CountryCode, u64>>,
    /// Per-country frequency tables of non-LOC entity texts. These double
    /// as the per-country rows of every entity, so the dominant entity's
    /// row is available without a second pass.
    pub country_entities: BTreeMap<CountryCode, FreqTable>,
    /// Date-global non-LOC frequency table.
    pub global_entities: FreqTable,
    pub articles_per_country: BTreeMap<CountryCode, u64>,
    pub providers_per_country: BTreeMap<CountryCode, BTreeSet<String>>,
    pub total_import_events: u64,
    pub total_export_events: u64,
    pub processed_articles: u64,
    pub skipped_unknown_provider: u64,
}

impl DailyMatrices {
    pub fn provider_count(&self, country: CountryCode) -> u64 {
        self.providers_per_country
            .get(&country)
            .map_or(0, |set| set.len() as u64)
    }
}

/// Run the single aggregation pass over one date's batch.
pub fn aggregate_date(
    batch: &DailyBatch,
    registry: &ProviderRegistry,
    gazetteer: &Gazetteer,
) -> DailyMatrices {
    let mut m = DailyMatrices::default();

    for article in &batch.data {
        m.processed_articles += 1;

        let Some(source) = registry.country_of(&article.provider_id) else {
            m.skipped_unknown_provider += 1;
            continue;
        };

        *m.articles_per_country.entry(source).or_insert(0) += 1;
        m.providers_per_country
            .entry(source)
            .or_default()
            .insert(article.provider_id.trim().to_lowercase());

        let mentioned = mentioned_countries(article, gazetteer);
        let other_entities = non_location_entities(article);

        for text in &other_entities {
            m.global_entities.bump(text);
        }

        // Matrix cells never represent a country mentioning itself.
        for &code in &mentioned {
            if code == source {
                continue;
            }
            *m.import_counts.entry(code).or_insert(0) += 1;
            m.total_import_events += 1;
            *m.export_counts.entry(source).or_insert(0) += 1;
            m.total_export_events += 1;
            *m.coverage
                .entry(code)
                .or_default()
                .entry(source)
                .or_insert(0) += 1;
            *m.covering
                .entry(source)
                .or_default()
                .entry(code)
                .or_insert(0) += 1;
        }

        for &code in &mentioned {
            let table = m.country_entities.entry(code).or_default();
            for text in &other_entities {
                table.bump(text);
            }
        }
    }

    debug!(
        "Aggregation pass done - articles={}, skipped={}, imports={}, exports={}",
        m.processed_articles, m.skipped_unknown_provider, m.total_import_events, m.total_export_events
    );
    if m.skipped_unknown_provider > 0 {
        info!(
            "Articles skipped for unknown providers - skipped={}",
            m.skipped_unknown_provider
        );
    }
    m
}

/// Distinct countries mentioned by an article's LOC spans. Span
/// multiplicity within the article does not multiply anything downstream.
fn mentioned_countries(article: &Article, gazetteer: &Gazetteer) -> BTreeSet<CountryCode> {
    let mut mentioned = BTreeSet::new();
    for span in &article.entities {
        if !span.label.is_location() {
            continue;
        }
        match gazetteer.resolve(&span.text) {
            Resolution::SingleCountry(code) => {
                mentioned.insert(code);
            }
            Resolution::RegionMatch(members) => {
                mentioned.extend(members);
            }
            Resolution::NoMatch => {}
        }
    }
    mentioned
}

/// Trimmed non-LOC entity texts of more than one character.
fn non_location_entities(article: &Article) -> Vec<&str> {
    article
        .entities
        .iter()
        .filter(|span| !span.label.is_location())
        .map(|span| span.text.trim())
        .filter(|text| text.chars().count() > 1)
        .collect()
}
