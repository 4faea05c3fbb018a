use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::commands::{CommandReport, note_source_unavailable};
use crate::error::ReelError;
use crate::letterboxd::feed;
use crate::reel::calendar;
use crate::reel::config::{ReelConfig, load_config};
use crate::reel::enrich::{BackdropLookup, DisabledLookup, enrich_missing_backdrops};
use crate::reel::fetch::CachedFetcher;
use crate::reel::merge::merge;
use crate::reel::overrides;
use crate::reel::paths::{ReelPaths, resolve_paths};
use crate::reel::record::WatchRecord;
use crate::reel::snapshot;
use crate::tmdb::client::TmdbClient;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub feed_file: Option<PathBuf>,
    pub skip_feed: bool,
    pub skip_enrich: bool,
    pub dry_run: bool,
}

pub fn run(opts: &BuildOptions) -> Result<CommandReport> {
    let paths = resolve_paths();
    let cfg = load_config()?;
    let mut report = CommandReport::new("build");

    let _lock = if opts.dry_run {
        None
    } else {
        Some(snapshot::acquire_run_lock(&paths.data_dir)?)
    };

    let mut historical = match snapshot::load(&paths.snapshot_file) {
        Ok(records) => {
            report.detail(format!("historical={} records", records.len()));
            records
        }
        Err(err) => {
            note_source_unavailable(&mut report, "build", "historical snapshot", &err);
            Vec::new()
        }
    };

    let backdrops = load_override_map(&mut report, &paths.backdrops_file, "custom backdrops");
    let quotes = load_override_map(&mut report, &paths.quotes_file, "custom quotes");

    let lookup = resolve_lookup(&mut report, &cfg, &paths, opts.skip_enrich)?;
    let enriched = enrich_missing_backdrops(&mut historical, &backdrops, lookup.as_ref());
    if enriched.enriched > 0 || enriched.failed > 0 {
        report.detail(format!(
            "enriched={} of {} (overrides={}, lookup_failures={})",
            enriched.enriched, enriched.scanned, enriched.overridden, enriched.failed
        ));
    }

    let mut live = fetch_live(&mut report, &cfg, &paths, opts);
    enrich_missing_backdrops(&mut live, &backdrops, lookup.as_ref());

    let merged = merge(historical, live);
    if merged.is_empty() {
        report.issue(ReelError::EmptyDataset.to_string());
        return Ok(report);
    }
    report.detail(format!("merged={} records", merged.len()));

    let model = calendar::project(&merged, &quotes)?;
    report.detail(format!(
        "calendar_years={}",
        model
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    ));
    report.detail(format!("dates_with_watches={}", model.movies_by_date.len()));

    if opts.dry_run {
        report.detail("dry-run: calendar not written");
        return Ok(report);
    }

    snapshot::write_json_atomic(&paths.calendar_file, &model)?;
    report.detail(format!("calendar={}", paths.calendar_file.display()));
    Ok(report)
}

fn load_override_map(
    report: &mut CommandReport,
    path: &Path,
    what: &str,
) -> BTreeMap<String, String> {
    match overrides::load_string_map(path) {
        Ok(map) => map,
        Err(err) => {
            note_source_unavailable(report, "build", what, &err);
            BTreeMap::new()
        }
    }
}

fn resolve_lookup(
    report: &mut CommandReport,
    cfg: &ReelConfig,
    paths: &ReelPaths,
    skip_enrich: bool,
) -> Result<Box<dyn BackdropLookup>> {
    if skip_enrich {
        report.detail("images: automatic lookup skipped");
        return Ok(Box::new(DisabledLookup));
    }
    match TmdbClient::from_env(&cfg.images, &paths.cache_dir)? {
        Some(client) => Ok(Box::new(client)),
        None => {
            report.detail("images: no lookup configured, custom backdrops only");
            Ok(Box::new(DisabledLookup))
        }
    }
}

fn fetch_live(
    report: &mut CommandReport,
    cfg: &ReelConfig,
    paths: &ReelPaths,
    opts: &BuildOptions,
) -> Vec<WatchRecord> {
    if opts.skip_feed {
        report.detail("live feed: skipped");
        return Vec::new();
    }

    let outcome = if let Some(feed_file) = &opts.feed_file {
        feed::read_feed_file(feed_file)
    } else if cfg.feed.url.is_empty() {
        report.detail("live feed: not configured, building from history only");
        return Vec::new();
    } else {
        CachedFetcher::new(&paths.cache_dir)
            .and_then(|fetcher| feed::fetch_feed(&fetcher, &cfg.feed.url, cfg.feed.cache_hours))
    };

    match outcome {
        Ok(parsed) => {
            report.detail(format!(
                "live feed: {} records, skipped {}, non-film {}",
                parsed.records.len(),
                parsed.skipped.total(),
                parsed.non_film
            ));
            parsed.records
        }
        Err(err) => {
            note_source_unavailable(report, "build", "live feed", &err);
            Vec::new()
        }
    }
}
