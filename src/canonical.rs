//! Cross-corpus canonicalization of near-duplicate entity strings.
//!
//! Works on the whole processed batch at once, per label: count every
//! distinct text, seed groups in first-seen order, pull in every
//! not-yet-grouped text similar to the seed, and rewrite each group to its
//! highest-frequency member. Grouping is deliberately single-seed (tested
//! against the seed only, not transitively across the group); with the
//! pinned first-seen iteration order the outcome is deterministic, and
//! re-running on rewritten data changes nothing.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::models::{DailyBatch, EntityLabel};
use crate::similarity::entity_variants_similar;

/// `(variant_text, label) -> canonical_text`, one canonical per pair,
/// idempotent under repeated application.
#[derive(Debug, Clone, Default)]
pub struct CanonicalMapping {
    map: HashMap<(String, EntityLabel), String>,
}

impl CanonicalMapping {
    pub fn canonical_for(&self, text: &str, label: EntityLabel) -> Option<&str> {
        self.map
            .get(&(text.to_string(), label))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Outcome of one canonicalization pass.
#[derive(Debug, Clone, Default)]
pub struct CanonicalReport {
    pub mapping: CanonicalMapping,
    pub rewrites: usize,
}

/// Build the mapping from every non-location occurrence across the batch
/// set and apply it in place. PER texts are whitespace-collapsed first;
/// all texts are trimmed.
pub fn canonicalize_batches(batches: &mut [&mut DailyBatch]) -> CanonicalReport {
    normalize_span_texts(batches);

    let mapping = build_mapping(batches.iter().map(|b| &**b));
    let mut rewrites = 0usize;
    for batch in batches.iter_mut() {
        for article in batch.data.iter_mut() {
            for span in article.entities.iter_mut() {
                if span.label.is_location() {
                    continue;
                }
                if let Some(canonical) = mapping.canonical_for(&span.text, span.label) {
                    span.text = canonical.to_string();
                    rewrites += 1;
                }
            }
        }
    }

    info!(
        "Canonicalization completed - variants_mapped={}, rewrites={}",
        mapping.len(),
        rewrites
    );
    CanonicalReport { mapping, rewrites }
}

fn normalize_span_texts(batches: &mut [&mut DailyBatch]) {
    for batch in batches.iter_mut() {
        for article in batch.data.iter_mut() {
            for span in article.entities.iter_mut() {
                let trimmed = span.text.trim();
                let normalized = if span.label == EntityLabel::PER {
                    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
                } else {
                    trimmed.to_string()
                };
                if normalized != span.text {
                    span.text = normalized;
                }
            }
        }
    }
}

fn build_mapping<'a>(batches: impl Iterator<Item = &'a DailyBatch>) -> CanonicalMapping {
    // Distinct texts per label, in first-seen order, with occurrence counts.
    let mut order: BTreeMap<EntityLabel, Vec<String>> = BTreeMap::new();
    let mut counts: BTreeMap<EntityLabel, HashMap<String, u64>> = BTreeMap::new();

    for batch in batches {
        for article in &batch.data {
            for span in &article.entities {
                if span.label.is_location() || span.text.chars().count() <= 1 {
                    continue;
                }
                let label_counts = counts.entry(span.label).or_default();
                match label_counts.get_mut(&span.text) {
                    Some(count) => *count += 1,
                    None => {
                        label_counts.insert(span.text.clone(), 1);
                        order.entry(span.label).or_default().push(span.text.clone());
                    }
                }
            }
        }
    }

    let mut mapping = CanonicalMapping::default();
    for (label, texts) in &order {
        let label_counts = &counts[label];
        group_label(*label, texts, label_counts, &mut mapping);
    }
    mapping
}

fn group_label(
    label: EntityLabel,
    texts: &[String],
    counts: &HashMap<String, u64>,
    mapping: &mut CanonicalMapping,
) {
    let mut grouped = vec![false; texts.len()];

    for i in 0..texts.len() {
        if grouped[i] {
            continue;
        }
        grouped[i] = true;

        // Single pass against the seed only, similarity checks in parallel.
        let seed = &texts[i];
        let candidates: Vec<usize> = ((i + 1)..texts.len())
            .filter(|&j| !grouped[j])
            .collect();
        let similar: Vec<usize> = candidates
            .par_iter()
            .filter(|&&j| entity_variants_similar(seed, &texts[j]))
            .copied()
            .collect();

        if similar.is_empty() {
            continue;
        }

        let mut members = vec![i];
        for j in similar {
            grouped[j] = true;
            members.push(j);
        }

        // Canonical form: highest count, ties to the earliest position.
        let canonical_idx = members
            .iter()
            .copied()
            .max_by(|&a, &b| {
                counts[&texts[a]]
                    .cmp(&counts[&texts[b]])
                    .then(b.cmp(&a))
            })
            .unwrap_or(i);
        let canonical = &texts[canonical_idx];

        debug!(
            "Entity group formed - label={:?}, canonical={}, members={}",
            label,
            canonical,
            members.len()
        );
        for &m in &members {
            if m != canonical_idx {
                mapping
                    .map
                    .insert((texts[m].clone(), label), canonical.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, NamedEntitySpan};

    fn span(text: &str, label: EntityLabel) -> NamedEntitySpan {
        NamedEntitySpan {
            text: text.to_string(),
            label,
        }
    }

    fn batch_of(spans: Vec<NamedEntitySpan>) -> DailyBatch {
        DailyBatch {
            data: vec![Article {
                provider_id: "p".into(),
                entities: spans,
            }],
        }
    }

    #[test]
    fn merges_to_highest_frequency_member() {
        let mut batch = batch_of(vec![
            span("Donald J. Trump", EntityLabel::PER),
            span("Donald Trump", EntityLabel::PER),
            span("Donald Trump", EntityLabel::PER),
        ]);
        let report = canonicalize_batches(&mut [&mut batch]);
        for article in &batch.data {
            for s in &article.entities {
                assert_eq!(s.text, "Donald Trump");
            }
        }
        assert_eq!(report.rewrites, 1);
        assert_eq!(report.mapping.len(), 1);
    }

    #[test]
    fn frequency_tie_goes_to_first_seen() {
        let mut batch = batch_of(vec![
            span("EU", EntityLabel::ORG),
            span("European Union", EntityLabel::ORG),
        ]);
        canonicalize_batches(&mut [&mut batch]);
        assert_eq!(batch.data[0].entities[0].text, "EU");
        assert_eq!(batch.data[0].entities[1].text, "EU");
    }

    #[test]
    fn labels_are_grouped_independently() {
        let mut batch = batch_of(vec![
            span("Washington", EntityLabel::PER),
            span("Washington", EntityLabel::ORG),
        ]);
        let report = canonicalize_batches(&mut [&mut batch]);
        assert_eq!(report.mapping.len(), 0);
        assert_eq!(report.rewrites, 0);
    }

    #[test]
    fn locations_are_untouched() {
        let mut batch = batch_of(vec![
            span("Germany", EntityLabel::LOC),
            span("German", EntityLabel::LOC),
        ]);
        let report = canonicalize_batches(&mut [&mut batch]);
        assert_eq!(report.rewrites, 0);
        assert_eq!(batch.data[0].entities[1].text, "German");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let mut batch = batch_of(vec![
            span("USA", EntityLabel::ORG),
            span("United States of America", EntityLabel::ORG),
            span("USA", EntityLabel::ORG),
            span("NATO", EntityLabel::ORG),
        ]);
        let first = canonicalize_batches(&mut [&mut batch]);
        assert!(first.rewrites > 0);
        let texts_after_first: Vec<String> = batch.data[0]
            .entities
            .iter()
            .map(|s| s.text.clone())
            .collect();

        let second = canonicalize_batches(&mut [&mut batch]);
        assert_eq!(second.rewrites, 0);
        let texts_after_second: Vec<String> = batch.data[0]
            .entities
            .iter()
            .map(|s| s.text.clone())
            .collect();
        assert_eq!(texts_after_first, texts_after_second);
    }

    #[test]
    fn per_texts_are_whitespace_collapsed() {
        let mut batch = batch_of(vec![span("Angela   Merkel ", EntityLabel::PER)]);
        canonicalize_batches(&mut [&mut batch]);
        assert_eq!(batch.data[0].entities[0].text, "Angela Merkel");
    }
}
