use crate::models::{DayEntry, MonthBucket, Record};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Calendar days (`YYYY-MM-DD` in `tz`) touched by a span, both ends inclusive.
pub fn day_keys<Tz: TimeZone>(
    created: DateTime<Utc>,
    resolved: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<String> {
    let start = local_date(created, tz);
    let end = local_date(resolved.unwrap_or(now), tz).max(start);

    let mut keys = Vec::new();
    let mut day = Some(start);
    while let Some(date) = day {
        if date > end {
            break;
        }
        keys.push(date_key(date));
        day = date.succ_opt();
    }
    keys
}

pub fn records_by_day<'a, Tz: TimeZone>(
    records: &'a [Record],
    now: DateTime<Utc>,
    tz: &Tz,
) -> BTreeMap<String, Vec<&'a Record>> {
    let mut index: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for record in records {
        for key in day_keys(record.created, record.resolved, now, tz) {
            let bucket = index.entry(key).or_default();
            if !bucket.iter().any(|existing| existing.id == record.id) {
                bucket.push(record);
            }
        }
    }
    index
}

/// Day index limited to one calendar year, trimmed to what the heatmap shows.
pub fn calendar_days<Tz: TimeZone>(
    records: &[Record],
    year: i32,
    now: DateTime<Utc>,
    tz: &Tz,
) -> BTreeMap<String, Vec<DayEntry>> {
    let prefix = format!("{year:04}-");
    records_by_day(records, now, tz)
        .into_iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, day)| {
            let entries = day
                .into_iter()
                .map(|record| DayEntry {
                    id: record.id.clone(),
                    title: record.title.clone(),
                })
                .collect();
            (key, entries)
        })
        .collect()
}

/// Hours blocked per creation month, oldest month first.
pub fn monthly_totals<Tz: TimeZone>(
    records: &[Record],
    year: Option<i32>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<MonthBucket> {
    let mut months: BTreeMap<String, (NaiveDate, f64)> = BTreeMap::new();
    for record in records {
        let created = local_date(record.created, tz);
        if year.is_some_and(|wanted| wanted != created.year()) {
            continue;
        }
        let Some(first) = created.with_day(1) else {
            continue;
        };
        let key = format!("{:04}-{:02}", first.year(), first.month());
        let hours = record.elapsed_at(now).total_hours;
        months.entry(key).or_insert((first, 0.0)).1 += hours;
    }

    months
        .into_iter()
        .map(|(key, (first, total_hours))| MonthBucket {
            key,
            label: first.format("%b %Y").to_string(),
            total_hours,
        })
        .collect()
}

/// Distinct creation years, newest first. Never empty.
pub fn years<Tz: TimeZone>(records: &[Record], now: DateTime<Utc>, tz: &Tz) -> Vec<i32> {
    let mut years: BTreeSet<i32> = records
        .iter()
        .map(|record| local_date(record.created, tz).year())
        .collect();
    if years.is_empty() {
        years.insert(local_date(now, tz).year());
    }
    years.into_iter().rev().collect()
}

fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
