use anyhow::{Context, Result};

use crate::commands::{CommandReport, note_source_unavailable};
use crate::error::ReelError;
use crate::reel::civil;
use crate::reel::consolidate::SourceKind;
use crate::reel::dedupe::dedupe_history;
use crate::reel::paths::resolve_paths;
use crate::reel::snapshot;

#[derive(Debug, Clone)]
pub struct DedupeOptions {
    pub dry_run: bool,
}

pub fn run(opts: &DedupeOptions) -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("dedupe");
    report.detail(format!("snapshot={}", paths.snapshot_file.display()));

    let records = match snapshot::load(&paths.snapshot_file) {
        Ok(records) => records,
        Err(err) => {
            note_source_unavailable(&mut report, "dedupe", "historical snapshot", &err);
            report.issue("nothing to deduplicate without a snapshot");
            return Ok(report);
        }
    };

    if records.is_empty() {
        report.issue(ReelError::EmptyDataset.to_string());
        return Ok(report);
    }

    let _lock = if opts.dry_run {
        None
    } else {
        Some(snapshot::acquire_run_lock(&paths.data_dir)?)
    };

    let original = records.len();
    let (deduped, summary) = dedupe_history(vec![(SourceKind::Diary, records)]);

    report.detail(format!("original_count={original}"));
    report.detail(format!("deduplicated_count={}", deduped.len()));
    report.detail(format!("exact_duplicates_removed={}", summary.exact_removed));
    report.detail(format!("fuzzy_duplicates_removed={}", summary.fuzzy_removed));
    report.detail(format!("reduction_percent={:.1}", summary.reduction_percent()));

    for (position, record) in deduped.iter().take(5).enumerate() {
        let mut line = format!(
            "sample[{position}]={} ({}) {}",
            record.title,
            record.year,
            civil::civil_date(&record.date).date_string
        );
        if record.has_review() {
            line.push_str(" [review]");
        }
        report.detail(line);
    }

    if opts.dry_run {
        report.detail("dry-run: snapshot not rewritten");
        return Ok(report);
    }

    snapshot::save(&paths.snapshot_file, &deduped)
        .with_context(|| format!("failed to save {}", paths.snapshot_file.display()))?;
    report.detail(format!("saved {} unique watches", deduped.len()));
    Ok(report)
}
