//! Raw mention matrices -> bounded distributions and rankings.
//!
//! Every distribution spans the full country universe and sums to 1.0
//! (within floating tolerance) or is entirely zero when no underlying
//! events exist; a zero denominator can never surface as NaN or Inf.

use itertools::Itertools;
use std::collections::BTreeMap;

use crate::aggregate::DailyMatrices;
use crate::country::{self, CountryCode};
use crate::out_models::TopEntity;

/// How many entities the per-country leaderboard keeps.
pub const TOP_ENTITIES_PER_COUNTRY: usize = 10;

/// Mention floor below which a country's dominant-entity signal is treated
/// as noise and zeroed before renormalization.
pub const DOMINANT_ENTITY_MIN_MENTIONS: u64 = 2;

/// One country's share of foreign-press attention: the per-partner
/// distribution plus the pre-renormalization ratio mass.
#[derive(Debug, Clone, Default)]
pub struct PressRow {
    pub shares: BTreeMap<CountryCode, f64>,
    pub total: f64,
}

/// Fully normalized view of one date.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDaily {
    pub import_data: BTreeMap<CountryCode, f64>,
    pub export_data: BTreeMap<CountryCode, f64>,
    pub ner_data: BTreeMap<CountryCode, f64>,
    pub top_ner: String,
    pub top_entities: BTreeMap<CountryCode, Vec<TopEntity>>,
    /// featured -> (covering -> share, total coverage)
    pub country_coverage: BTreeMap<CountryCode, PressRow>,
    /// covering -> (featured -> share, total covering)
    pub country_covering: BTreeMap<CountryCode, PressRow>,
    pub featured_rankings: Vec<(CountryCode, f64)>,
    pub covering_rankings: Vec<(CountryCode, f64)>,
}

/// Normalize one date's raw matrices.
pub fn normalize_daily(m: &DailyMatrices) -> NormalizedDaily {
    let mut out = NormalizedDaily {
        import_data: import_distribution(m),
        export_data: export_distribution(m),
        ..Default::default()
    };

    let (ner_data, top_ner) = dominant_entity_distribution(m);
    out.ner_data = ner_data;
    out.top_ner = top_ner;

    out.top_entities = top_entities(m);

    // The provider correction always divides by the covering side's
    // provider count: the partner column in the coverage matrix, the
    // subject row in the covering matrix.
    let (coverage, featured_rankings) =
        press_matrix(&m.coverage, |_, partner| m.provider_count(partner));
    let (covering, covering_rankings) =
        press_matrix(&m.covering, |subject, _| m.provider_count(subject));
    out.country_coverage = coverage;
    out.featured_rankings = featured_rankings;
    out.country_covering = covering;
    out.covering_rankings = covering_rankings;

    out
}

/// `Import[c] / totalImportEvents` over the full universe.
fn import_distribution(m: &DailyMatrices) -> BTreeMap<CountryCode, f64> {
    let total = m.total_import_events as f64;
    country::universe()
        .map(|code| {
            let count = m.import_counts.get(&code).copied().unwrap_or(0) as f64;
            (code, safe_div(count, total))
        })
        .collect()
}

/// Per-country export volume corrected by that country's distinct-provider
/// count, then renormalized so the ratios sum to 1.
fn export_distribution(m: &DailyMatrices) -> BTreeMap<CountryCode, f64> {
    let mut ratios: BTreeMap<CountryCode, f64> = country::universe()
        .map(|code| {
            let count = m.export_counts.get(&code).copied().unwrap_or(0) as f64;
            (code, safe_div(count, m.provider_count(code) as f64))
        })
        .collect();
    renormalize(&mut ratios);
    ratios
}

/// Provider-corrected distribution of the date's dominant entity, with the
/// noise-suppression floor applied before renormalization.
fn dominant_entity_distribution(m: &DailyMatrices) -> (BTreeMap<CountryCode, f64>, String) {
    let zeroes: BTreeMap<CountryCode, f64> = country::universe().map(|c| (c, 0.0)).collect();
    let Some((dominant, _)) = m.global_entities.dominant() else {
        return (zeroes, String::new());
    };

    let mut ratios = zeroes;
    for (code, value) in ratios.iter_mut() {
        let raw = m
            .country_entities
            .get(code)
            .map_or(0, |table| table.count(dominant));
        if raw >= DOMINANT_ENTITY_MIN_MENTIONS {
            *value = safe_div(raw as f64, m.provider_count(*code) as f64);
        }
    }
    renormalize(&mut ratios);
    (ratios, dominant.to_string())
}

/// Per-country top entities; each share is against the top-10 mass only.
fn top_entities(m: &DailyMatrices) -> BTreeMap<CountryCode, Vec<TopEntity>> {
    let mut out = BTreeMap::new();
    for (code, table) in &m.country_entities {
        let top = table.top(TOP_ENTITIES_PER_COUNTRY);
        let mass: u64 = top.iter().map(|(_, count)| count).sum();
        if mass == 0 {
            continue;
        }
        let entries = top
            .into_iter()
            .map(|(entity, count)| TopEntity {
                entity: entity.to_string(),
                count,
                share: count as f64 / mass as f64,
            })
            .collect();
        out.insert(*code, entries);
    }
    out
}

/// Shared construction for the coverage and covering sections: divide each
/// cell by the counterpart's provider count, renormalize rows, and rank
/// rows by their pre-renormalization ratio mass.
fn press_matrix(
    matrix: &BTreeMap<CountryCode, BTreeMap<CountryCode, u64>>,
    provider_count: impl Fn(CountryCode, CountryCode) -> u64,
) -> (BTreeMap<CountryCode, PressRow>, Vec<(CountryCode, f64)>) {
    let mut rows: BTreeMap<CountryCode, PressRow> = BTreeMap::new();
    for (subject, cells) in matrix {
        let mut row = PressRow::default();
        for (partner, count) in cells {
            if *count == 0 {
                continue;
            }
            let ratio = safe_div(*count as f64, provider_count(*subject, *partner) as f64);
            row.shares.insert(*partner, ratio);
            row.total += ratio;
        }
        renormalize(&mut row.shares);
        rows.insert(*subject, row);
    }

    // Totals renormalize across all subjects; rankings drop zero entries.
    let mass: f64 = rows.values().map(|row| row.total).sum();
    for row in rows.values_mut() {
        row.total = safe_div(row.total, mass);
    }
    let rankings = rows
        .iter()
        .filter(|(_, row)| row.total > 0.0)
        .map(|(code, row)| (*code, row.total))
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)))
        .collect();
    (rows, rankings)
}

/// Scale a map so its values sum to 1; leave it all-zero when empty.
fn renormalize(values: &mut BTreeMap<CountryCode, f64>) {
    let sum: f64 = values.values().sum();
    if sum > 0.0 {
        for value in values.values_mut() {
            *value /= sum;
        }
    } else {
        for value in values.values_mut() {
            *value = 0.0;
        }
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_date;
    use crate::gazetteer::Gazetteer;
    use crate::models::{Article, DailyBatch, EntityLabel, NamedEntitySpan, ProviderRecord};
    use crate::providers::ProviderRegistry;

    fn code(s: &str) -> CountryCode {
        crate::country::from_alpha3(s).unwrap()
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::from_records(vec![
            ProviderRecord {
                id: "fr-one".into(),
                country: "FRA".into(),
            },
            ProviderRecord {
                id: "de-one".into(),
                country: "DEU".into(),
            },
        ])
    }

    fn article(provider: &str, spans: &[(&str, EntityLabel)]) -> Article {
        Article {
            provider_id: provider.into(),
            entities: spans
                .iter()
                .map(|(text, label)| NamedEntitySpan {
                    text: (*text).into(),
                    label: *label,
                })
                .collect(),
        }
    }

    fn two_article_day() -> DailyMatrices {
        let batch = DailyBatch {
            data: vec![
                article(
                    "fr-one",
                    &[("Germany", EntityLabel::LOC), ("NATO", EntityLabel::ORG)],
                ),
                article(
                    "de-one",
                    &[("France", EntityLabel::LOC), ("NATO", EntityLabel::ORG)],
                ),
            ],
        };
        aggregate_date(&batch, &registry(), &Gazetteer::new())
    }

    #[test]
    fn import_distribution_sums_to_one() {
        let n = normalize_daily(&two_article_day());
        let sum: f64 = n.import_data.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((n.import_data[&code("DEU")] - 0.5).abs() < 1e-9);
        assert!((n.import_data[&code("FRA")] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_events_mean_all_zero_distributions() {
        let n = normalize_daily(&DailyMatrices::default());
        assert!(n.import_data.values().all(|v| *v == 0.0));
        assert!(n.export_data.values().all(|v| *v == 0.0));
        assert!(n.ner_data.values().all(|v| *v == 0.0));
        assert_eq!(n.top_ner, "");
        assert_eq!(n.import_data.len(), crate::country::universe_len());
        assert!(n.featured_rankings.is_empty());
    }

    #[test]
    fn export_distribution_is_provider_corrected() {
        let n = normalize_daily(&two_article_day());
        let sum: f64 = n.export_data.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // One provider each, one export each: equal shares.
        assert!((n.export_data[&code("FRA")] - 0.5).abs() < 1e-9);
        assert!((n.export_data[&code("DEU")] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn dominant_entity_floor_zeroes_thin_signals() {
        // NATO is mentioned once per country: below the floor of 2.
        let n = normalize_daily(&two_article_day());
        assert_eq!(n.top_ner, "NATO");
        assert!(n.ner_data.values().all(|v| *v == 0.0));
    }

    #[test]
    fn dominant_entity_distribution_above_floor() {
        // Germany is mentioned by both a foreign and a domestic article,
        // so DEU has two NATO mentions and one provider of its own.
        let batch = DailyBatch {
            data: vec![
                article(
                    "fr-one",
                    &[("Germany", EntityLabel::LOC), ("NATO", EntityLabel::ORG)],
                ),
                article(
                    "de-one",
                    &[("Germany", EntityLabel::LOC), ("NATO", EntityLabel::ORG)],
                ),
            ],
        };
        let m = aggregate_date(&batch, &registry(), &Gazetteer::new());
        let n = normalize_daily(&m);
        assert_eq!(n.top_ner, "NATO");
        assert!((n.ner_data[&code("DEU")] - 1.0).abs() < 1e-9);
        let sum: f64 = n.ner_data.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coverage_rows_renormalize_and_rank() {
        let n = normalize_daily(&two_article_day());

        let deu_row = &n.country_coverage[&code("DEU")];
        assert!((deu_row.shares[&code("FRA")] - 1.0).abs() < 1e-9);
        let total_sum: f64 = n.country_coverage.values().map(|r| r.total).sum();
        assert!((total_sum - 1.0).abs() < 1e-9);

        assert_eq!(n.featured_rankings.len(), 2);
        assert!(n.featured_rankings[0].1 >= n.featured_rankings[1].1);
        assert_eq!(n.covering_rankings.len(), 2);
    }

    #[test]
    fn top_entities_share_uses_top_ten_mass_only() {
        let n = normalize_daily(&two_article_day());
        let deu = &n.top_entities[&code("DEU")];
        assert_eq!(deu.len(), 1);
        assert_eq!(deu[0].entity, "NATO");
        assert!((deu[0].share - 1.0).abs() < 1e-9);
    }
}
