//! Splits date-ordered rows into contiguous windows bounded by Sundays.
//!
//! Boundaries are the minimum date (unless it is a Sunday), every distinct
//! Sunday seen after it, and the maximum date (unless it is a Sunday). The
//! first window is closed on both ends; every later window is `(start, end]`
//! so a Sunday boundary belongs to exactly one window.

use std::ops::Range;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{Error, Result};
use crate::reference::EnrichedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_inclusive: bool,
}

impl WeekWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let after_start = if self.start_inclusive {
            date >= self.start
        } else {
            date > self.start
        };
        after_start && date <= self.end
    }

    /// End date as `YYYY-MM-DD`, used to name the window's report.
    pub fn label(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Sorted rows together with the windows that cover them.
#[derive(Debug)]
pub struct Partition {
    rows: Vec<EnrichedRow>,
    windows: Vec<WeekWindow>,
    ranges: Vec<Range<usize>>,
}

impl Partition {
    pub fn windows(&self) -> &[WeekWindow] {
        &self.windows
    }

    /// All rows, ascending by purchase date, ties in input order.
    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeekWindow, &[EnrichedRow])> + '_ {
        self.windows
            .iter()
            .zip(self.ranges.iter())
            .map(move |(window, range)| (*window, &self.rows[range.clone()]))
    }

    /// Rows dated before the first window. Only non-empty when the earliest
    /// date is a Sunday that is not itself used as a boundary.
    pub fn uncovered_rows(&self) -> &[EnrichedRow] {
        let covered_from = self.ranges.first().map_or(self.rows.len(), |r| r.start);
        &self.rows[..covered_from]
    }
}

fn purchase_date(row: &EnrichedRow) -> NaiveDate {
    row.date_of_purchase.date()
}

fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// Boundary dates for an ascending date sequence.
pub fn week_boundaries(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let (Some(&min_date), Some(&max_date)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };

    let mut boundaries = Vec::new();
    if !is_sunday(min_date) {
        boundaries.push(min_date);
    }

    // seeded with the first date, so a leading Sunday is never a boundary
    let mut previous = min_date;
    for &date in dates {
        if is_sunday(date) && date != previous {
            boundaries.push(date);
            previous = date;
        }
    }

    if !is_sunday(max_date) {
        boundaries.push(max_date);
    }

    boundaries
}

pub fn windows_from_boundaries(boundaries: &[NaiveDate]) -> Vec<WeekWindow> {
    boundaries
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| WeekWindow {
            start: pair[0],
            end: pair[1],
            start_inclusive: idx == 0,
        })
        .collect()
}

pub fn partition_weeks(mut rows: Vec<EnrichedRow>) -> Result<Partition> {
    // stable: equal dates keep their input order
    rows.sort_by_key(purchase_date);

    let dates: Vec<NaiveDate> = rows.iter().map(purchase_date).collect();
    let boundaries = week_boundaries(&dates);
    let windows = windows_from_boundaries(&boundaries);

    if windows.is_empty() {
        return Err(Error::EmptyPartition {
            rows: rows.len(),
            min_date: dates.first().copied(),
            max_date: dates.last().copied(),
        });
    }

    let ranges = windows
        .iter()
        .map(|window| {
            let lo = if window.start_inclusive {
                dates.partition_point(|d| *d < window.start)
            } else {
                dates.partition_point(|d| *d <= window.start)
            };
            let hi = dates.partition_point(|d| *d <= window.end);
            lo..hi
        })
        .collect();

    tracing::debug!(
        windows = windows.len(),
        rows = rows.len(),
        "Partitioned rows into week windows"
    );

    Ok(Partition {
        rows,
        windows,
        ranges,
    })
}
