//! The per-run driver: load every requested date's batch, canonicalize
//! entity variants across the whole corpus, then aggregate, normalize and
//! persist each date on the worker pool. A failing date is logged and
//! isolated; it never takes sibling dates down with it.

use anyhow::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::aggregate::aggregate_date;
use crate::canonical::canonicalize_batches;
use crate::gazetteer::Gazetteer;
use crate::models::DailyBatch;
use crate::normalize::normalize_daily;
use crate::out_models::DailySnapshot;
use crate::providers::ProviderRegistry;
use crate::snapshot::write_snapshot;

/// Filesystem layout and tuning for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root holding one `DD.MM.YYYY/articles.json` directory per date.
    pub data_root: PathBuf,
    /// Path to the provider registry JSON.
    pub providers_path: PathBuf,
    /// Where `map_data_DD.MM.YYYY.json` snapshots land.
    pub output_dir: PathBuf,
    pub gazetteer: Gazetteer,
}

impl PipelineConfig {
    pub fn new(
        data_root: impl Into<PathBuf>,
        providers_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            providers_path: providers_path.into(),
            output_dir: output_dir.into(),
            gazetteer: Gazetteer::new(),
        }
    }

    pub fn batch_path(&self, date: NaiveDate) -> PathBuf {
        self.data_root
            .join(date.format("%d.%m.%Y").to_string())
            .join("articles.json")
    }

    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir
            .join(format!("map_data_{}.json", date.format("%d.%m.%Y")))
    }
}

/// What happened to one date of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStatus {
    /// Aggregated and written from a present input batch.
    Written,
    /// Input was missing or malformed; an all-empty snapshot was written.
    EmptyInput,
    /// The snapshot could not be produced or written.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcomes: BTreeMap<NaiveDate, DateStatus>,
    pub canonical_rewrites: usize,
}

impl RunSummary {
    pub fn failed_dates(&self) -> usize {
        self.outcomes
            .values()
            .filter(|s| matches!(s, DateStatus::Failed(_)))
            .count()
    }
}

/// Process a set of dates end to end.
pub fn run_dates(config: &PipelineConfig, dates: &[NaiveDate]) -> Result<RunSummary> {
    let registry = ProviderRegistry::load(&config.providers_path)?;
    info!(
        "Pipeline started - dates={}, data_root={}",
        dates.len(),
        config.data_root.display()
    );

    // Phase 1: load all batches and canonicalize entity variants across
    // the whole corpus, so the mapping is global rather than per-date.
    let mut batches: BTreeMap<NaiveDate, Option<DailyBatch>> = dates
        .iter()
        .map(|date| (*date, load_batch(&config.batch_path(*date), *date)))
        .collect();

    let report = {
        let mut present: Vec<&mut DailyBatch> = batches
            .values_mut()
            .filter_map(|b| b.as_mut())
            .collect();
        canonicalize_batches(&mut present)
    };

    // Phase 2: dates are independent once canonicalized; fan out.
    let outcomes: BTreeMap<NaiveDate, DateStatus> = batches
        .par_iter()
        .map(|(date, batch)| (*date, process_date(config, &registry, *date, batch.as_ref())))
        .collect();

    let summary = RunSummary {
        outcomes,
        canonical_rewrites: report.rewrites,
    };
    info!(
        "Pipeline completed - dates={}, failed={}, rewrites={}",
        dates.len(),
        summary.failed_dates(),
        summary.canonical_rewrites
    );
    Ok(summary)
}

fn process_date(
    config: &PipelineConfig,
    registry: &ProviderRegistry,
    date: NaiveDate,
    batch: Option<&DailyBatch>,
) -> DateStatus {
    let empty = DailyBatch::default();
    let (input, had_input) = match batch {
        Some(b) => (b, true),
        None => (&empty, false),
    };

    let matrices = aggregate_date(input, registry, &config.gazetteer);
    let normalized = normalize_daily(&matrices);
    let snapshot = DailySnapshot::from_normalized(&normalized);

    match write_snapshot(&config.snapshot_path(date), &snapshot) {
        Ok(()) => {
            info!(
                "Date processed - date={}, articles={}, skipped={}, imports={}",
                date,
                matrices.processed_articles,
                matrices.skipped_unknown_provider,
                matrices.total_import_events
            );
            if had_input {
                DateStatus::Written
            } else {
                DateStatus::EmptyInput
            }
        }
        Err(err) => {
            error!("Date failed - date={}, error={:#}", date, err);
            DateStatus::Failed(format!("{err:#}"))
        }
    }
}

/// Read one date's batch; a missing or malformed file is logged and
/// becomes `None` (all-empty result downstream), never an error.
fn load_batch(path: &Path, date: NaiveDate) -> Option<DailyBatch> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                "Daily input missing - date={}, path={}, error={}",
                date,
                path.display(),
                err
            );
            return None;
        }
    };
    match serde_json::from_str::<DailyBatch>(&raw) {
        Ok(batch) => {
            info!(
                "Daily input loaded - date={}, articles={}",
                date,
                batch.data.len()
            );
            Some(batch)
        }
        Err(err) => {
            warn!(
                "Daily input malformed - date={}, path={}, error={}",
                date,
                path.display(),
                err
            );
            None
        }
    }
}

/// Convenience wrapper used by process-level callers: the inclusive date
/// range ending at `last`, spanning `days` days.
pub fn trailing_dates(last: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .filter_map(|offset| last.checked_sub_days(chrono::Days::new(offset as u64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_dates_are_ascending_and_inclusive() {
        let last = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let dates = trailing_dates(last, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            ]
        );
    }

    #[test]
    fn batch_and_snapshot_paths_use_dotted_dates() {
        let config = PipelineConfig::new("/data", "/data/providers.json", "/out");
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert!(config
            .batch_path(date)
            .ends_with("05.01.2026/articles.json"));
        assert!(config
            .snapshot_path(date)
            .ends_with("map_data_05.01.2026.json"));
    }
}
