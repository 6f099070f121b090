//! Backup export and validated, all-or-nothing import of the record log.

use crate::errors::ImportError;
use crate::models::{Record, Tag};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;

pub fn export_json(records: &[Record]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(records)
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("blocklog_backup_{}.json", today.format("%Y-%m-%d"))
}

pub fn parse_import(bytes: &[u8]) -> Result<Vec<Record>, ImportError> {
    let value: Value = serde_json::from_slice(bytes)?;
    validate_records(value)
}

/// Turns a JSON array into records, or rejects the whole array at the first bad element.
pub fn validate_records(value: Value) -> Result<Vec<Record>, ImportError> {
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut ids = HashSet::with_capacity(items.len());
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        check_shape(index, &item)?;
        let mut record: Record =
            serde_json::from_value(item).map_err(|err| invalid(index, err.to_string()))?;

        if record.resolved.is_some_and(|resolved| resolved < record.created) {
            return Err(ImportError::ResolvedBeforeCreated { index });
        }
        if !ids.insert(record.id.clone()) {
            return Err(ImportError::DuplicateId { index, id: record.id });
        }

        record.normalize_tags();
        for tag in &mut record.tags {
            *tag = Tag::new(&tag.title, &tag.color).map_err(|err| invalid(index, err.to_string()))?;
        }
        records.push(record);
    }
    Ok(records)
}

fn check_shape(index: usize, item: &Value) -> Result<(), ImportError> {
    let Some(object) = item.as_object() else {
        return Err(invalid(index, "expected an object"));
    };
    for field in ["id", "title", "created"] {
        match object.get(field) {
            Some(Value::String(text)) if !text.trim().is_empty() => {}
            _ => return Err(invalid(index, format!("'{field}' must be a non-empty string"))),
        }
    }
    match object.get("resolved") {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(invalid(index, "'resolved' must be a timestamp string or empty")),
    }
}

fn invalid(index: usize, reason: impl Into<String>) -> ImportError {
    ImportError::InvalidRecord {
        index,
        reason: reason.into(),
    }
}
