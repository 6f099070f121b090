use crate::duration::{self, Elapsed};
use crate::errors::ValidationError;
use crate::filter::{ListQuery, SortDirection, SortKey, StatusFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Resolved,
}

/// A logged blocking incident. Open while `resolved` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub communication_channel: String,
    #[serde(default)]
    pub created_by: String,
    pub created: DateTime<Utc>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resolved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Record {
    pub fn status(&self) -> Status {
        if self.resolved.is_some() {
            Status::Resolved
        } else {
            Status::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.resolved.is_none()
    }

    pub fn has_tag(&self, title: &str) -> bool {
        let wanted = Tag::normalize_title(title);
        self.tags.iter().any(|tag| tag.title == wanted)
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Elapsed {
        duration::elapsed_at(self.created, self.resolved, now)
    }

    /// Stamps `resolved` once. Returns false when the record was already resolved.
    pub fn resolve_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.resolved.is_some() {
            return false;
        }
        self.resolved = Some(now.max(self.created));
        true
    }

    /// Lowercases tag titles and drops later duplicates.
    pub fn normalize_tags(&mut self) {
        let mut seen = Vec::with_capacity(self.tags.len());
        self.tags.retain_mut(|tag| {
            tag.title = Tag::normalize_title(&tag.title);
            if tag.title.is_empty() || seen.contains(&tag.title) {
                return false;
            }
            seen.push(tag.title.clone());
            true
        });
    }
}

/// A colored label. Two tags are the same tag when their titles match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub title: String,
    pub color: String,
}

impl Tag {
    pub fn new(title: &str, color: &str) -> Result<Self, ValidationError> {
        let title = Self::normalize_title(title);
        if title.is_empty() {
            return Err(ValidationError::EmptyTag);
        }
        let color = normalize_color(color).ok_or_else(|| ValidationError::TagColor(color.to_string()))?;
        Ok(Self { title, color })
    }

    pub fn normalize_title(title: &str) -> String {
        title.trim().to_lowercase()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for Tag {}

fn normalize_color(color: &str) -> Option<String> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_lowercase()))
    } else {
        None
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(flatten)]
    pub user: User,
    pub salt: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub communication_channel: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub status: Status,
    pub elapsed: Elapsed,
    pub duration: String,
}

/// Query string of the record list: `?status=open&tags=db,vpn&sort=duration&direction=desc`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<StatusFilter>,
    pub tags: Option<String>,
    pub sort: Option<SortKey>,
    pub direction: Option<SortDirection>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let query = ListQuery {
            status: params.status.unwrap_or_default(),
            tags: Vec::new(),
            sort: params.sort.unwrap_or_default(),
            direction: params.direction.unwrap_or_default(),
        };
        match params.tags {
            Some(tags) => query.with_tags(tags.split(',')),
            None => query,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_records: usize,
    pub open_records: usize,
    pub total_blocked_hours: f64,
    pub total_blocked: String,
    pub total_phrase: String,
    pub longest_record: Option<Record>,
    pub longest_hours: f64,
    pub longest: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTotal {
    pub title: String,
    pub color: String,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPoint {
    pub id: String,
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub key: String,
    pub label: String,
    pub total_hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub summary: Summary,
    pub tag_totals: Vec<TagTotal>,
    pub recent: Vec<RecentPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayEntry {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub years: Vec<i32>,
    pub year: i32,
    pub days: BTreeMap<String, Vec<DayEntry>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
}
