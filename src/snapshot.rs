//! Atomic persistence of per-date snapshots: serialize to a sibling temp
//! file, then rename into place, so a crash mid-write never leaves a
//! partially written document.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::out_models::DailySnapshot;

pub fn write_snapshot(path: &Path, snapshot: &DailySnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let bytes = serde_json::to_vec_pretty(snapshot).context("encoding snapshot")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;

    debug!("Snapshot written - path={}, bytes={}", path.display(), bytes.len());
    Ok(())
}
