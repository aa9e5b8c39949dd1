use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::country::{from_alpha3, CountryCode};
use crate::models::ProviderRecord;

/// Provider id (lowercased) -> source country. Built once from the static
/// provider data; the aggregator never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    map: HashMap<String, CountryCode>,
}

impl ProviderRegistry {
    /// Load the registry from a JSON list of `{ "id", "country" }` records.
    /// A missing or malformed file is a hard error: without source
    /// countries, every article of every date would be skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading provider registry {}", path.display()))?;
        let records: Vec<ProviderRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("decoding provider registry {}", path.display()))?;
        let registry = Self::from_records(records);
        info!(
            "Provider registry loaded - path={}, providers={}",
            path.display(),
            registry.len()
        );
        Ok(registry)
    }

    pub fn from_records(records: Vec<ProviderRecord>) -> Self {
        let mut map = HashMap::new();
        for record in records {
            let id = record.id.trim().to_lowercase();
            if id.is_empty() {
                continue;
            }
            match from_alpha3(&record.country) {
                Some(code) => {
                    map.insert(id, code);
                }
                None => {
                    warn!(
                        "Provider with unknown country skipped - id={}, country={}",
                        id, record.country
                    );
                }
            }
        }
        Self { map }
    }

    /// Source country for a provider id; lookup is lowercased.
    pub fn country_of(&self, provider_id: &str) -> Option<CountryCode> {
        self.map.get(&provider_id.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderRecord;

    fn record(id: &str, country: &str) -> ProviderRecord {
        ProviderRecord {
            id: id.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive_on_ids() {
        let registry =
            ProviderRegistry::from_records(vec![record("Le-Monde", "FRA"), record("dw", "DEU")]);
        assert_eq!(
            registry.country_of("le-monde").unwrap().as_str(),
            "FRA"
        );
        assert_eq!(registry.country_of("LE-MONDE").unwrap().as_str(), "FRA");
        assert_eq!(registry.country_of("DW").unwrap().as_str(), "DEU");
        assert!(registry.country_of("unknown").is_none());
    }

    #[test]
    fn unknown_countries_are_skipped() {
        let registry =
            ProviderRegistry::from_records(vec![record("a", "FRA"), record("b", "XYZ")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.country_of("b").is_none());
    }

    #[test]
    fn extra_json_fields_are_tolerated() {
        let raw = r#"[{"id":"bbc","country":"GBR","url":["https://example.org/feed"],"builtin":true}]"#;
        let records: Vec<ProviderRecord> = serde_json::from_str(raw).unwrap();
        let registry = ProviderRegistry::from_records(records);
        assert_eq!(registry.country_of("bbc").unwrap().as_str(), "GBR");
    }
}
