//! Cross-country media attention flow metrics from daily NER batches.
//!
//! The engine takes one JSON batch of articles per date (each article a
//! provider id plus labeled entity spans), resolves free-text location
//! mentions to country codes, merges near-duplicate entity strings across
//! the whole corpus, and aggregates each date into import/export volumes,
//! foreign-press coverage matrices and per-country entity leaderboards,
//! normalized into bounded distributions and rankings.
//!
//! Everything upstream (fetching, translation, the NER model itself) and
//! downstream (serving, day-over-day rollups) lives outside this crate and
//! talks to it through the JSON interfaces in [`models`] and
//! [`out_models`].

pub mod aggregate;
pub mod canonical;
pub mod country;
pub mod gazetteer;
pub mod models;
pub mod normalize;
pub mod out_models;
pub mod pipeline;
pub mod providers;
pub mod similarity;
pub mod snapshot;

pub use aggregate::{aggregate_date, DailyMatrices};
pub use canonical::{canonicalize_batches, CanonicalMapping, CanonicalReport};
pub use country::CountryCode;
pub use gazetteer::{Gazetteer, Resolution};
pub use models::{Article, DailyBatch, EntityLabel, NamedEntitySpan};
pub use normalize::{normalize_daily, NormalizedDaily};
pub use out_models::DailySnapshot;
pub use pipeline::{run_dates, DateStatus, PipelineConfig, RunSummary};
pub use providers::ProviderRegistry;
