use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::commands::{CommandReport, note_source_unavailable};
use crate::error::ReelError;
use crate::reel::civil;
use crate::reel::config::load_config;
use crate::reel::consolidate::SourceKind;
use crate::reel::dedupe::dedupe_history;
use crate::reel::paths::resolve_paths;
use crate::reel::record::{self, RawRecord, SkipTally, WatchRecord};
use crate::reel::snapshot;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub export_dir: PathBuf,
    pub dry_run: bool,
}

pub fn run(opts: &ImportOptions) -> Result<CommandReport> {
    let paths = resolve_paths();
    let cfg = load_config()?;
    let mut report = CommandReport::new("import");

    report.detail(format!("export_dir={}", opts.export_dir.display()));
    if !opts.export_dir.is_dir() {
        report.issue(format!(
            "export folder not found: {}",
            opts.export_dir.display()
        ));
        return Ok(report);
    }

    let _lock = if opts.dry_run {
        None
    } else {
        Some(snapshot::acquire_run_lock(&paths.data_dir)?)
    };

    let mut batches: Vec<(SourceKind, Vec<WatchRecord>)> = Vec::new();
    for kind in [SourceKind::Diary, SourceKind::Reviews, SourceKind::Ratings] {
        match load_batch(&opts.export_dir, kind) {
            Ok((mut records, skipped)) => {
                for record in &mut records {
                    if record.review_link.is_empty() {
                        record.review_link =
                            record::review_link_for(&record.link, &cfg.feed.username);
                    }
                }
                let mut line = format!("{}: {} records", kind.as_str(), records.len());
                if skipped.total() > 0 {
                    line.push_str(&format!(
                        ", skipped {} ({})",
                        skipped.total(),
                        skipped.summarize()
                    ));
                }
                report.detail(line);
                batches.push((kind, records));
            }
            Err(err) => {
                note_source_unavailable(&mut report, "import", kind.batch_file(), &err);
            }
        }
    }

    let scanned: usize = batches.iter().map(|(_, batch)| batch.len()).sum();
    if scanned == 0 {
        report.issue(ReelError::EmptyDataset.to_string());
        return Ok(report);
    }

    let (records, summary) = dedupe_history(batches);
    report.detail(format!("total_parsed={}", summary.scanned));
    report.detail(format!("exact_duplicates_removed={}", summary.exact_removed));
    if summary.annotated_wins > 0 {
        report.detail(format!("annotation_merges={}", summary.annotated_wins));
    }
    report.detail(format!("fuzzy_duplicates_removed={}", summary.fuzzy_removed));
    report.detail(format!("unique_watches={}", summary.kept));
    describe_history(&mut report, &records);

    if opts.dry_run {
        report.detail("dry-run: snapshot not written");
        return Ok(report);
    }

    snapshot::save(&paths.snapshot_file, &records)
        .with_context(|| format!("failed to save {}", paths.snapshot_file.display()))?;
    report.detail(format!("snapshot={}", paths.snapshot_file.display()));
    Ok(report)
}

fn load_batch(
    export_dir: &std::path::Path,
    kind: SourceKind,
) -> Result<(Vec<WatchRecord>, SkipTally)> {
    let path = export_dir.join(kind.batch_file());
    if !path.exists() {
        return Err(ReelError::SourceUnavailable(path.display().to_string()).into());
    }
    let raw =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let candidates: Vec<RawRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(record::validate_batch(candidates))
}

/// The end-of-import summary: date range plus how much of the history carries
/// reviews, tags, and rewatches. Records arrive most recent first.
fn describe_history(report: &mut CommandReport, records: &[WatchRecord]) {
    if let (Some(newest), Some(oldest)) = (records.first(), records.last()) {
        report.detail(format!(
            "date_range={}..{}",
            civil::civil_date(&oldest.date).date_string,
            civil::civil_date(&newest.date).date_string,
        ));
    }

    let with_reviews = records.iter().filter(|r| r.has_review()).count();
    if with_reviews > 0 {
        report.detail(format!("with_reviews={with_reviews}"));
    }
    let with_tags = records.iter().filter(|r| !r.tags.is_empty()).count();
    if with_tags > 0 {
        report.detail(format!("with_tags={with_tags}"));
    }
    let rewatches = records.iter().filter(|r| r.rewatch).count();
    if rewatches > 0 {
        report.detail(format!("rewatches={rewatches}"));
    }
}
