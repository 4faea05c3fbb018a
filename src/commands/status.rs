use anyhow::Result;
use serde_json::Value;
use std::fs;

use crate::commands::CommandReport;
use crate::reel::civil;
use crate::reel::paths::resolve_paths;
use crate::reel::snapshot;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("status");

    report.detail(format!("data_dir={}", paths.data_dir.display()));

    if paths.snapshot_file.exists() {
        match snapshot::load(&paths.snapshot_file) {
            Ok(records) => {
                report.detail(format!("snapshot_records={}", records.len()));
                if let (Some(newest), Some(oldest)) = (records.first(), records.last()) {
                    report.detail(format!(
                        "snapshot_range={}..{}",
                        civil::civil_date(&oldest.date).date_string,
                        civil::civil_date(&newest.date).date_string,
                    ));
                }
                let with_reviews = records.iter().filter(|r| r.has_review()).count();
                report.detail(format!("snapshot_with_reviews={with_reviews}"));
            }
            Err(err) => report.issue(format!("snapshot unreadable: {err:#}")),
        }
    } else {
        report.detail("snapshot: absent (run `reelgrid import` first)");
    }

    if paths.calendar_file.exists() {
        match read_calendar_years(&paths) {
            Ok(years) => report.detail(format!("calendar_years={years}")),
            Err(err) => report.issue(format!("calendar unreadable: {err:#}")),
        }
    } else {
        report.detail("calendar: absent (run `reelgrid build`)");
    }

    Ok(report)
}

fn read_calendar_years(paths: &crate::reel::paths::ReelPaths) -> Result<String> {
    let raw = fs::read_to_string(&paths.calendar_file)?;
    let parsed: Value = serde_json::from_str(&raw)?;
    let years = parsed
        .get("years")
        .and_then(Value::as_array)
        .map(|years| {
            years
                .iter()
                .filter_map(Value::as_i64)
                .map(|year| year.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();
    Ok(years)
}
