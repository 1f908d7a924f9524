//! Spending summaries over calendar periods.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::expense::ExpenseRecord;

const RECENT_MONTHS: usize = 3;

/// A labeled, inclusive date range and what was spent within it.
#[derive(Clone, Debug, PartialEq)]
pub struct Period {
    pub label: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: f64,
}

/// Periods worth reporting for a chat's expenses, in display order:
///
/// 1. up to three most recent months that have expenses (newest first)
/// 2. the most recent year that has expenses
/// 3. "All period", from the earliest to the latest expense date
///
/// Rows whose date cannot be parsed are ignored. No rows, no periods.
pub fn expense_periods(records: &[ExpenseRecord]) -> Vec<Period> {
    let dated: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|r| r.day().map(|d| (d, r.price)))
        .collect();

    let (Some(earliest), Some(latest)) = (
        dated.iter().map(|(d, _)| *d).min(),
        dated.iter().map(|(d, _)| *d).max(),
    ) else {
        return Vec::new();
    };

    let total_between = |from: NaiveDate, to: NaiveDate| -> f64 {
        dated
            .iter()
            .filter(|(d, _)| *d >= from && *d <= to)
            .map(|(_, p)| p)
            .sum()
    };

    let months: BTreeSet<(i32, u32)> = dated.iter().map(|(d, _)| (d.year(), d.month())).collect();

    let mut out = Vec::new();
    for &(year, month) in months.iter().rev().take(RECENT_MONTHS) {
        let Some((from, to)) = month_bounds(year, month) else {
            continue;
        };
        out.push(Period {
            label: from.format("%B").to_string(),
            from,
            to,
            total: total_between(from, to),
        });
    }

    let year = latest.year();
    if let (Some(from), Some(to)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        out.push(Period {
            label: year.to_string(),
            from,
            to,
            total: total_between(from, to),
        });
    }

    out.push(Period {
        label: "All period".to_string(),
        from: earliest,
        to: latest,
        total: total_between(earliest, latest),
    });

    out
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}
