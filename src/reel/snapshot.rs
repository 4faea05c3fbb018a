//! The persisted historical snapshot: a pretty-printed JSON array of watch
//! records, most recent first. The file is both an output of the dedup
//! pipeline and the historical input to the next build.

use crate::error::ReelError;
use crate::reel::record::WatchRecord;
use anyhow::{Context, Result, anyhow};
use fs2::FileExt;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const LOCK_FILE: &str = ".reelgrid.lock";

pub fn load(path: &Path) -> Result<Vec<WatchRecord>> {
    if !path.exists() {
        return Err(ReelError::SourceUnavailable(path.display().to_string()).into());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: Vec<WatchRecord> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

pub fn save(path: &Path, records: &[WatchRecord]) -> Result<()> {
    write_json_atomic(path, &records)
}

/// Serialize `value` next to `path` and swap it into place, so a crashed run
/// never leaves a truncated artifact behind.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let data = serde_json::to_string_pretty(value)?;
    let tmp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("failed to stage a write under {}", parent.display()))?;
    fs::write(tmp.path(), format!("{data}\n"))
        .with_context(|| format!("failed to write staged {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|err| anyhow!("failed to replace {}: {}", path.display(), err.error))?;
    Ok(())
}

/// Exclusive per-data-dir lock held for the duration of a pipeline run.
/// Dropping it releases the lock.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
}

pub fn acquire_run_lock(data_dir: &Path) -> Result<RunLock> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let lock_path = data_dir.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("failed to open {}", lock_path.display()))?;
    file.try_lock_exclusive().map_err(|_| {
        anyhow!(
            "another reelgrid run holds the lock at {}",
            lock_path.display()
        )
    })?;
    Ok(RunLock { _file: file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reel::record::sample_record;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_round_trips_the_record_set() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("data").join("watch-history.json");

        let records = vec![
            sample_record("Arrival", "2016", "2024-03-02"),
            sample_record("Heat", "1995", "2024-01-10"),
        ];
        save(&path, &records).expect("save");

        let loaded = load(&path).expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "Arrival");
        assert_eq!(loaded[0].date, records[0].date);
    }

    #[test]
    fn run_lock_is_exclusive_until_dropped() {
        let tmp = tempdir().expect("tempdir");
        let first = acquire_run_lock(tmp.path()).expect("first lock");
        assert!(acquire_run_lock(tmp.path()).is_err());
        drop(first);
        assert!(acquire_run_lock(tmp.path()).is_ok());
    }

    #[test]
    fn load_rejects_malformed_snapshots() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("watch-history.json");
        fs::write(&path, "{not json").expect("write");
        assert!(load(&path).is_err());
    }
}
