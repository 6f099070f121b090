use crate::models::{Record, Status, Tag};
use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedDate,
    Title,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "ascending")]
    Asc,
    #[default]
    #[serde(alias = "descending")]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// What the record list shows: status filter, then tag filter, then sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: StatusFilter,
    /// Normalized tag titles. A record must carry every one of them.
    pub tags: Vec<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl ListQuery {
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let title = Tag::normalize_title(tag.as_ref());
            if !title.is_empty() && !self.tags.contains(&title) {
                self.tags.push(title);
            }
        }
        self
    }

    /// Resets status and tags. Sorting stays as chosen.
    pub fn clear_filters(&mut self) {
        self.status = StatusFilter::All;
        self.tags.clear();
    }
}

pub fn matches_status(filter: StatusFilter, record: &Record) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Open => record.status() == Status::Open,
        StatusFilter::Resolved => record.status() == Status::Resolved,
    }
}

pub fn matches_tags(selected: &[String], record: &Record) -> bool {
    selected.iter().all(|title| record.has_tag(title))
}

/// Filters and sorts with open records measured up to `now`. Ties keep input order.
pub fn apply_at<'a>(records: &'a [Record], query: &ListQuery, now: DateTime<Utc>) -> Vec<&'a Record> {
    let mut shown: Vec<&Record> = records
        .iter()
        .filter(|record| matches_status(query.status, record))
        .filter(|record| matches_tags(&query.tags, record))
        .collect();

    match query.sort {
        SortKey::CreatedDate => {
            shown.sort_by(|a, b| query.direction.apply(a.created.cmp(&b.created)));
        }
        SortKey::Title => {
            let collator = title_collator();
            shown.sort_by(|a, b| {
                query
                    .direction
                    .apply(compare_titles(collator.as_ref(), &a.title, &b.title))
            });
        }
        SortKey::Duration => {
            let mut keyed: Vec<(i64, &Record)> = shown
                .into_iter()
                .map(|record| (record.elapsed_at(now).total_minutes, record))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| query.direction.apply(a.cmp(b)));
            shown = keyed.into_iter().map(|(_, record)| record).collect();
        }
    }
    shown
}

/// Root-locale collation at tertiary strength: accents sort with their base letter, lowercase before uppercase.
fn title_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    Collator::try_new(&Default::default(), options).ok()
}

fn compare_titles(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    }
    .then_with(|| a.cmp(b))
}
