use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::OffsetDateTime;

/// Timestamp a task decodes to when its `created_at` field is unreadable.
pub const ZERO_TIME: OffsetDateTime = datetime!(0001-01-01 00:00:00 UTC);

/// Number of fields in a well-formed record: id, description, created_at,
/// is_complete.
pub const FIELD_COUNT: usize = 4;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    /// Second resolution; rendered as RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_complete: bool,
}

impl Task {
    /// A fresh, incomplete task created at `now`.
    ///
    /// Sub-second precision is dropped and CRLF in the description becomes
    /// LF, so the value matches what the file reads back.
    pub fn new(id: u64, description: impl Into<String>, now: OffsetDateTime) -> Self {
        let description: String = description.into();
        Self {
            id,
            description: if description.contains("\r\n") {
                description.replace("\r\n", "\n")
            } else {
                description
            },
            created_at: now.replace_nanosecond(0).unwrap_or(now),
            is_complete: false,
        }
    }

    /// The four on-disk fields of this task.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.description.clone(),
            format_timestamp(self.created_at),
            self.is_complete.to_string(),
        ]
    }
}

/// One line of the backing file, kept exactly as read.
///
/// Mutations work on records rather than decoded tasks so that a rewrite
/// leaves every field it did not change byte-for-byte intact, including
/// fields that fail to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: usize,
    fields: Vec<String>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn from_task(task: &Task) -> Self {
        Self::new(0, task.to_fields())
    }

    /// 1-based line the record starts on, or 0 for records not read from a file.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The record's id with the same leniency as [`Record::decode`].
    pub fn id(&self) -> u64 {
        self.field(Field::Id).and_then(parse_id).unwrap_or(0)
    }

    /// True when the decoded id, written back out in base 10, is exactly `id`.
    ///
    /// `"01"` does not match a task whose id is 1.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id().to_string() == id
    }

    pub fn is_complete(&self) -> bool {
        self.field(Field::IsComplete)
            .and_then(parse_bool)
            .unwrap_or(false)
    }

    /// Set the completion field to `true`, padding a short record first.
    pub fn mark_complete(&mut self) {
        if self.fields.len() < FIELD_COUNT {
            self.fields.resize(FIELD_COUNT, String::new());
        }
        self.fields[Field::IsComplete.index()] = true.to_string();
    }

    /// Decode into a [`Task`], substituting zero values for unreadable
    /// fields and reporting each substitution.
    pub fn decode(&self) -> Decoded {
        let mut issues = Vec::new();
        let mut note = |field: Field, ok: bool| {
            if !ok {
                issues.push(FieldIssue {
                    line: self.line,
                    field,
                    raw: self.field(field).map(str::to_string),
                });
            }
        };

        let id = self.field(Field::Id).and_then(parse_id);
        note(Field::Id, id.is_some());

        let description = self.field(Field::Description);
        note(Field::Description, description.is_some());

        let created_at = self.field(Field::CreatedAt).and_then(parse_timestamp);
        note(Field::CreatedAt, created_at.is_some());

        let is_complete = self.field(Field::IsComplete).and_then(parse_bool);
        note(Field::IsComplete, is_complete.is_some());

        Decoded {
            task: Task {
                id: id.unwrap_or(0),
                description: description.unwrap_or_default().to_string(),
                created_at: created_at.unwrap_or(ZERO_TIME),
                is_complete: is_complete.unwrap_or(false),
            },
            issues,
        }
    }

    fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(field.index()).map(String::as_str)
    }
}

/// Result of decoding one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub task: Task,
    pub issues: Vec<FieldIssue>,
}

/// The positional fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Description,
    CreatedAt,
    IsComplete,
}

impl Field {
    pub fn index(self) -> usize {
        match self {
            Field::Id => 0,
            Field::Description => 1,
            Field::CreatedAt => 2,
            Field::IsComplete => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Description => "description",
            Field::CreatedAt => "created_at",
            Field::IsComplete => "is_complete",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field that was missing or unreadable and decoded to its zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub line: usize,
    pub field: Field,
    /// The raw text, or `None` when the record had too few fields.
    pub raw: Option<String>,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => write!(f, "line {}: unreadable {} {:?}", self.line, self.field, raw),
            None => write!(f, "line {}: missing {}", self.line, self.field),
        }
    }
}

/// Format a timestamp the way it is stored: RFC 3339, whole seconds.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let at = at.replace_nanosecond(0).unwrap_or(at);
    at.format(&Rfc3339)
        .unwrap_or_else(|_| ZERO_TIME.format(&Rfc3339).unwrap_or_default())
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
