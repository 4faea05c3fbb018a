//! Project the merged timeline onto per-year month grids.
//!
//! Each month renders as exactly 6 weeks of 7 day-cells, weeks starting on
//! Monday; leading and trailing cells from the neighboring months are emitted
//! but flagged, so every grid has the same 42-cell geometry. The model only
//! borrows the records it buckets — ownership stays with the merged timeline.

use crate::reel::civil;
use crate::reel::record::WatchRecord;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKS_PER_GRID: usize = 6;
const DAYS_PER_WEEK: u32 = 7;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarModel<'a> {
    /// Civil years with at least one record, most recent first.
    pub years: Vec<i32>,
    pub movies_by_date: BTreeMap<String, Vec<&'a WatchRecord>>,
    pub quotes_by_date: BTreeMap<String, String>,
    pub calendars_by_year: BTreeMap<i32, YearCalendar<'a>>,
}

#[derive(Debug, Serialize)]
pub struct YearCalendar<'a> {
    pub months: Vec<MonthGrid<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid<'a> {
    pub name: &'static str,
    /// 0-based month index.
    pub month_num: u32,
    pub weeks: Vec<Vec<DayCell<'a>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell<'a> {
    pub date: String,
    pub day_num: u32,
    /// Monday=0 … Sunday=6.
    pub day_of_week: u32,
    pub movies: Vec<&'a WatchRecord>,
    pub quote: Option<String>,
    pub is_current_month: bool,
}

pub fn project<'a>(
    records: &'a [WatchRecord],
    quotes: &BTreeMap<String, String>,
) -> Result<CalendarModel<'a>> {
    let mut movies_by_date: BTreeMap<String, Vec<&'a WatchRecord>> = BTreeMap::new();
    let mut years: Vec<i32> = Vec::new();

    for record in records {
        let civil = civil::civil_date(&record.date);
        movies_by_date.entry(civil.date_string).or_default().push(record);
        if !years.contains(&civil.year) {
            years.push(civil.year);
        }
    }
    years.sort_unstable_by(|a, b| b.cmp(a));

    let mut calendars_by_year = BTreeMap::new();
    for &year in &years {
        calendars_by_year.insert(year, build_year(year, &movies_by_date, quotes)?);
    }

    Ok(CalendarModel {
        years,
        movies_by_date,
        quotes_by_date: quotes.clone(),
        calendars_by_year,
    })
}

fn build_year<'a>(
    year: i32,
    movies_by_date: &BTreeMap<String, Vec<&'a WatchRecord>>,
    quotes: &BTreeMap<String, String>,
) -> Result<YearCalendar<'a>> {
    let mut months = Vec::with_capacity(12);

    for month_num in 0..12u32 {
        let first = NaiveDate::from_ymd_opt(year, month_num + 1, 1)
            .with_context(|| format!("no first day for {year}-{:02}", month_num + 1))?;
        let lead_days = i64::from(first.weekday().num_days_from_monday());
        let first_key = first.format("%Y-%m-%d").to_string();
        // Back up to the Monday on or before the first of the month.
        let grid_start = civil::add_days(&first_key, -lead_days)?;

        let mut weeks = Vec::with_capacity(WEEKS_PER_GRID);
        let mut offset = 0i64;
        for _ in 0..WEEKS_PER_GRID {
            let mut week = Vec::with_capacity(DAYS_PER_WEEK as usize);
            for day_of_week in 0..DAYS_PER_WEEK {
                let date = civil::add_days(&grid_start, offset)?;
                let components = civil::split_civil(&date)?;
                week.push(DayCell {
                    day_num: components.day,
                    day_of_week,
                    movies: movies_by_date.get(&date).cloned().unwrap_or_default(),
                    quote: quotes.get(&date).cloned(),
                    is_current_month: components.year == year && components.month0 == month_num,
                    date,
                });
                offset += 1;
            }
            weeks.push(week);
        }

        months.push(MonthGrid {
            name: MONTH_NAMES[month_num as usize],
            month_num,
            weeks,
        });
    }

    Ok(YearCalendar { months })
}
