use crate::duration::{self, FormatPolicy};
use crate::models::{DashboardResponse, Record, RecentPoint, Summary, TagTotal};
use chrono::{DateTime, Utc};

const TOP_TAGS: usize = 5;
const RECENT_COUNT: usize = 15;
const CHART_TITLE_CHARS: usize = 15;

pub fn build_dashboard_at(records: &[Record], now: DateTime<Utc>) -> DashboardResponse {
    DashboardResponse {
        summary: summarize_at(records, now),
        tag_totals: tag_totals_at(records, TOP_TAGS, now),
        recent: recent_at(records, RECENT_COUNT, now),
    }
}

/// Counts, total hours blocked and the longest record. The first record wins a tie.
pub fn summarize_at(records: &[Record], now: DateTime<Utc>) -> Summary {
    let mut total_hours = 0.0;
    let mut total_minutes = 0_i64;
    let mut longest: Option<(&Record, f64)> = None;

    for record in records {
        let elapsed = record.elapsed_at(now);
        let hours = elapsed.total_hours;
        total_hours += hours;
        total_minutes += elapsed.total_minutes;
        if longest.is_none_or(|(_, max)| hours > max) {
            longest = Some((record, hours));
        }
    }

    let longest_hours = longest.map_or(0.0, |(_, hours)| hours);

    Summary {
        total_records: records.len(),
        open_records: records.iter().filter(|record| record.is_open()).count(),
        total_blocked_hours: total_hours,
        total_blocked: duration::from_total_hours(total_hours).format(FormatPolicy::Compact),
        total_phrase: duration::total_phrase(total_hours, total_minutes),
        longest_record: longest.map(|(record, _)| record.clone()),
        longest_hours,
        longest: duration::from_total_hours(longest_hours).format(FormatPolicy::Compact),
    }
}

/// Hours blocked per tag, largest first, at most `limit` tags.
pub fn tag_totals_at(records: &[Record], limit: usize, now: DateTime<Utc>) -> Vec<TagTotal> {
    let mut totals: Vec<TagTotal> = Vec::new();
    for record in records {
        let hours = record.elapsed_at(now).total_hours;
        if hours <= 0.0 {
            continue;
        }
        for tag in &record.tags {
            match totals.iter_mut().find(|total| total.title == tag.title) {
                Some(total) => total.total_hours += hours,
                None => totals.push(TagTotal {
                    title: tag.title.clone(),
                    color: tag.color.clone(),
                    total_hours: hours,
                }),
            }
        }
    }
    totals.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    totals.truncate(limit);
    totals
}

/// Newest `limit` records in chronological order, for the per-record bar chart.
pub fn recent_at(records: &[Record], limit: usize, now: DateTime<Utc>) -> Vec<RecentPoint> {
    let mut newest: Vec<&Record> = records.iter().collect();
    newest.sort_by(|a, b| b.created.cmp(&a.created));
    newest.truncate(limit);
    newest.reverse();

    newest
        .into_iter()
        .map(|record| RecentPoint {
            id: record.id.clone(),
            name: chart_label(&record.title),
            hours: (record.elapsed_at(now).total_hours * 10.0).round() / 10.0,
        })
        .collect()
}

fn chart_label(title: &str) -> String {
    if title.chars().count() > CHART_TITLE_CHARS {
        let short: String = title.chars().take(CHART_TITLE_CHARS).collect();
        format!("{short}...")
    } else {
        title.to_string()
    }
}
