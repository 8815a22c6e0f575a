//! Task records (`tasks_c`).

use super::{RecordId, RecordSchema, Reference, codec};
use crate::backend::SortType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    /// Not started
    #[default]
    NotStarted,
    /// Being worked on
    InProgress,
    /// Done
    Completed,
    /// Postponed
    Deferred,
}

super::choice!(TaskStatus, "task status", {
    NotStarted => "Not Started",
    InProgress => "In Progress",
    Completed => "Completed",
    Deferred => "Deferred",
});

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskPriority {
    /// Urgent
    High,
    /// Normal
    #[default]
    Medium,
    /// Can wait
    Low,
}

super::choice!(TaskPriority, "task priority", {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

/// A to-do item, optionally tied to a contact or a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Task name
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Longer description
    #[serde(rename = "description_c", default)]
    pub description: Option<String>,
    /// Due date and time
    #[serde(rename = "due_date_c", default, deserialize_with = "codec::timestamp")]
    pub due: Option<DateTime<Utc>>,
    /// Progress
    #[serde(rename = "status_c", default, deserialize_with = "codec::choice")]
    pub status: Option<TaskStatus>,
    /// Urgency
    #[serde(rename = "priority_c", default, deserialize_with = "codec::choice")]
    pub priority: Option<TaskPriority>,
    /// Comma separated free-text tags
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    /// Contact to follow up with
    #[serde(rename = "contact_id_c", default, deserialize_with = "codec::reference")]
    pub contact: Option<Reference>,
    /// Deal it relates to
    #[serde(rename = "deal_id_c", default, deserialize_with = "codec::reference")]
    pub deal: Option<Reference>,
}

/// Validated input for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name
    pub name: String,
    /// Longer description
    pub description: Option<String>,
    /// Due date and time
    pub due: Option<DateTime<Utc>>,
    /// Progress
    pub status: TaskStatus,
    /// Urgency
    pub priority: TaskPriority,
    /// Comma separated tags
    pub tags: Option<String>,
    /// Contact to follow up with
    pub contact: Option<RecordId>,
    /// Deal it relates to
    pub deal: Option<RecordId>,
}

/// Sparse task update; `None` leaves a field as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New name
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    /// `Some(None)` clears the due date
    pub due: Option<Option<DateTime<Utc>>>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New priority
    pub priority: Option<TaskPriority>,
    /// `Some(None)` clears the tags
    pub tags: Option<Option<String>>,
    /// `Some(None)` unlinks the contact
    pub contact: Option<Option<RecordId>>,
    /// `Some(None)` unlinks the deal
    pub deal: Option<Option<RecordId>>,
}

impl From<TaskDraft> for TaskPatch {
    fn from(draft: TaskDraft) -> Self {
        Self {
            name: Some(draft.name),
            description: Some(draft.description),
            due: Some(draft.due),
            status: Some(draft.status),
            priority: Some(draft.priority),
            tags: Some(draft.tags),
            contact: Some(draft.contact),
            deal: Some(draft.deal),
        }
    }
}

fn text_or_empty(text: Option<&str>) -> Value {
    Value::from(text.unwrap_or_default())
}

fn due_value(due: Option<DateTime<Utc>>) -> Value {
    due.map_or_else(|| Value::from(""), |due| Value::from(due.to_rfc3339()))
}

impl RecordSchema for Task {
    const TABLE: &'static str = "tasks_c";
    const LABEL: &'static str = "task";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "description_c",
        "due_date_c",
        "status_c",
        "priority_c",
        "Tags",
        "contact_id_c",
        "deal_id_c",
    ];
    const ORDER_FIELD: &'static str = "due_date_c";
    const ORDER: SortType = SortType::Asc;

    type Draft = TaskDraft;
    type Patch = TaskPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    // Blank text and a blank due date go out as empty strings on create and update alike.
    // Unset references are omitted on create.
    fn create_fields(draft: &TaskDraft) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("Name".into(), Value::from(draft.name.as_str()));
        fields.insert("description_c".into(), text_or_empty(draft.description.as_deref()));
        fields.insert("due_date_c".into(), due_value(draft.due));
        fields.insert("status_c".into(), Value::from(super::Choice::as_str(draft.status)));
        fields.insert("priority_c".into(), Value::from(super::Choice::as_str(draft.priority)));
        fields.insert("Tags".into(), text_or_empty(draft.tags.as_deref()));
        if let Some(contact) = draft.contact {
            fields.insert("contact_id_c".into(), codec::reference_value(Some(contact)));
        }
        if let Some(deal) = draft.deal {
            fields.insert("deal_id_c".into(), codec::reference_value(Some(deal)));
        }
        fields
    }

    fn patch_fields(patch: &TaskPatch) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &patch.name {
            fields.insert("Name".into(), Value::from(name.as_str()));
        }
        if let Some(description) = &patch.description {
            fields.insert("description_c".into(), text_or_empty(description.as_deref()));
        }
        if let Some(due) = patch.due {
            fields.insert("due_date_c".into(), due_value(due));
        }
        if let Some(status) = patch.status {
            fields.insert("status_c".into(), Value::from(super::Choice::as_str(status)));
        }
        if let Some(priority) = patch.priority {
            fields.insert("priority_c".into(), Value::from(super::Choice::as_str(priority)));
        }
        if let Some(tags) = &patch.tags {
            fields.insert("Tags".into(), text_or_empty(tags.as_deref()));
        }
        if let Some(contact) = patch.contact {
            fields.insert("contact_id_c".into(), codec::reference_value(contact));
        }
        if let Some(deal) = patch.deal {
            fields.insert("deal_id_c".into(), codec::reference_value(deal));
        }
        fields
    }
}
