use crate::errors::ValidationError;
use crate::models::{AppData, Record, RecordInput, Tag, TagInput};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

pub fn create_record(data: &mut AppData, input: RecordInput, now: DateTime<Utc>) -> Result<Record, ValidationError> {
    validate_input(&input)?;
    let record = Record {
        id: Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        environment: input.environment.trim().to_string(),
        problem: input.problem.trim().to_string(),
        action: input.action.trim().to_string(),
        communication_channel: input.communication_channel.trim().to_string(),
        created_by: input.created_by.trim().to_string(),
        created: now,
        resolved: None,
        tags: build_tags(input.tags)?,
    };
    data.records.insert(0, record.clone());
    Ok(record)
}

/// Rewrites the editable fields. `id`, `created` and `resolved` never change here.
pub fn update_record(data: &mut AppData, id: &str, input: RecordInput) -> Result<Option<Record>, ValidationError> {
    validate_input(&input)?;
    let tags = build_tags(input.tags)?;
    let Some(record) = data.records.iter_mut().find(|record| record.id == id) else {
        return Ok(None);
    };
    record.title = input.title.trim().to_string();
    record.environment = input.environment.trim().to_string();
    record.problem = input.problem.trim().to_string();
    record.action = input.action.trim().to_string();
    record.communication_channel = input.communication_channel.trim().to_string();
    record.created_by = input.created_by.trim().to_string();
    record.tags = tags;
    Ok(Some(record.clone()))
}

/// Returns the record and whether this call resolved it.
pub fn resolve_record(data: &mut AppData, id: &str, now: DateTime<Utc>) -> Option<(Record, bool)> {
    let record = data.records.iter_mut().find(|record| record.id == id)?;
    let changed = record.resolve_at(now);
    Some((record.clone(), changed))
}

pub fn delete_record(data: &mut AppData, id: &str) -> bool {
    let before = data.records.len();
    data.records.retain(|record| record.id != id);
    data.records.len() != before
}

/// Distinct tags across all records, sorted by title. The first color seen wins.
pub fn unique_tags(records: &[Record]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for tag in records.iter().flat_map(|record| &record.tags) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags.sort_by(|a, b| a.title.cmp(&b.title));
    tags
}

fn validate_input(input: &RecordInput) -> Result<(), ValidationError> {
    let required = [
        ("title", &input.title),
        ("environment", &input.environment),
        ("problem", &input.problem),
        ("createdBy", &input.created_by),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }
    Ok(())
}

fn build_tags(inputs: Vec<TagInput>) -> Result<Vec<Tag>, ValidationError> {
    let mut tags: Vec<Tag> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let color = input.color.unwrap_or_else(random_color);
        let tag = Tag::new(&input.title, &color)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

fn random_color() -> String {
    format!("#{:06x}", rand::thread_rng().gen_range(0..=0xff_ffff_u32))
}
