//! Wire types for the per-date snapshot. Field names match the published
//! JSON schema, hence the camelCase identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::country::CountryCode;
use crate::normalize::NormalizedDaily;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntity {
    pub entity: String,
    pub count: u64,
    pub share: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryCoverage {
    pub coveredBy: BTreeMap<CountryCode, f64>,
    pub totalCoverage: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryCovering {
    pub covering: BTreeMap<CountryCode, f64>,
    pub totalCovering: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedRanking {
    pub countryCode: CountryCode,
    pub totalCoverage: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveringRanking {
    pub countryCode: CountryCode,
    pub totalCovering: f64,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignPressData {
    pub countryCoverage: BTreeMap<CountryCode, CountryCoverage>,
    pub countryCovering: BTreeMap<CountryCode, CountryCovering>,
    pub featuredRankings: Vec<FeaturedRanking>,
    pub coveringRankings: Vec<CoveringRanking>,
}

/// The per-date output document. `importData`/`exportData`/`nerData` keep
/// strictly positive entries only; the foreign-press sections keep their
/// rows as computed.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub importData: BTreeMap<CountryCode, f64>,
    pub exportData: BTreeMap<CountryCode, f64>,
    pub nerData: BTreeMap<CountryCode, f64>,
    pub TopEntitiesByCountry: BTreeMap<CountryCode, Vec<TopEntity>>,
    pub topNer: String,
    pub foreignPressData: ForeignPressData,
}

impl DailySnapshot {
    pub fn from_normalized(n: &NormalizedDaily) -> Self {
        let foreign_press = ForeignPressData {
            countryCoverage: n
                .country_coverage
                .iter()
                .map(|(code, row)| {
                    (
                        *code,
                        CountryCoverage {
                            coveredBy: row.shares.clone(),
                            totalCoverage: row.total,
                        },
                    )
                })
                .collect(),
            countryCovering: n
                .country_covering
                .iter()
                .map(|(code, row)| {
                    (
                        *code,
                        CountryCovering {
                            covering: row.shares.clone(),
                            totalCovering: row.total,
                        },
                    )
                })
                .collect(),
            featuredRankings: n
                .featured_rankings
                .iter()
                .map(|(code, total)| FeaturedRanking {
                    countryCode: *code,
                    totalCoverage: *total,
                })
                .collect(),
            coveringRankings: n
                .covering_rankings
                .iter()
                .map(|(code, total)| CoveringRanking {
                    countryCode: *code,
                    totalCovering: *total,
                })
                .collect(),
        };

        Self {
            importData: positive_entries(&n.import_data),
            exportData: positive_entries(&n.export_data),
            nerData: positive_entries(&n.ner_data),
            TopEntitiesByCountry: n.top_entities.clone(),
            topNer: n.top_ner.clone(),
            foreignPressData: foreign_press,
        }
    }
}

fn positive_entries(values: &BTreeMap<CountryCode, f64>) -> BTreeMap<CountryCode, f64> {
    values
        .iter()
        .filter(|(_, v)| **v > 0.0)
        .map(|(k, v)| (*k, *v))
        .collect()
}
