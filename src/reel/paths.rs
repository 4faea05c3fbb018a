use std::env;
use std::path::PathBuf;

/// Everything the pipeline reads or writes under the data directory.
#[derive(Debug, Clone)]
pub struct ReelPaths {
    pub data_dir: PathBuf,
    pub snapshot_file: PathBuf,
    pub calendar_file: PathBuf,
    pub backdrops_file: PathBuf,
    pub quotes_file: PathBuf,
    pub cache_dir: PathBuf,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> ReelPaths {
    let data_dir = env_or_default_path("REELGRID_DATA_DIR", PathBuf::from("data"));

    let snapshot_file =
        env_or_default_path("REELGRID_SNAPSHOT_FILE", data_dir.join("watch-history.json"));
    let calendar_file =
        env_or_default_path("REELGRID_CALENDAR_FILE", data_dir.join("calendar.json"));
    let backdrops_file = env_or_default_path(
        "REELGRID_BACKDROPS_FILE",
        data_dir.join("custom-backdrops.json"),
    );
    let quotes_file =
        env_or_default_path("REELGRID_QUOTES_FILE", data_dir.join("custom-quotes.json"));
    let cache_dir = env_or_default_path("REELGRID_CACHE_DIR", data_dir.join("cache"));

    ReelPaths {
        data_dir,
        snapshot_file,
        calendar_file,
        backdrops_file,
        quotes_file,
        cache_dir,
    }
}
