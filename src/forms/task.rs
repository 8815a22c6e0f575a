//! Task form.

use super::{FieldErrors, PickerSet, RecordForm, optional, optional_reference, required};
use crate::schema::{Choice, Task, TaskDraft, TaskPriority, TaskStatus, codec};

/// Task form state; starts as a not-started, medium-priority task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    /// Task name
    pub name: String,
    /// Longer description
    pub description: String,
    /// `YYYY-MM-DDTHH:MM` (UTC) or blank
    pub due: String,
    /// Status value, e.g. `Not Started`
    pub status: String,
    /// Priority value, e.g. `High`
    pub priority: String,
    /// Comma separated tags
    pub tags: String,
    /// Contact id, or blank
    pub contact: String,
    /// Deal id, or blank
    pub deal: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            due: String::new(),
            status: TaskStatus::default().as_str().to_string(),
            priority: TaskPriority::default().as_str().to_string(),
            tags: String::new(),
            contact: String::new(),
            deal: String::new(),
        }
    }
}

fn parse_choice<T: Choice>(errors: &mut FieldErrors, field: &'static str, value: &str, fallback: T) -> T {
    optional(value).map_or(fallback, |text| {
        T::parse(&text).unwrap_or_else(|e| {
            errors.insert(field, e.to_string());
            fallback
        })
    })
}

impl RecordForm for TaskForm {
    type Entity = Task;

    const FIELDS: &'static [&'static str] = &[
        "Name",
        "description_c",
        "due_date_c",
        "status_c",
        "priority_c",
        "Tags",
        "contact_id_c",
        "deal_id_c",
    ];

    const PICKERS: PickerSet = PickerSet::FollowUp;

    fn from_record(record: &Task) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            due: record.due.map(codec::datetime_input).unwrap_or_default(),
            status: record.status.unwrap_or_default().as_str().to_string(),
            priority: record.priority.unwrap_or_default().as_str().to_string(),
            tags: record.tags.clone().unwrap_or_default(),
            contact: record.contact.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
            deal: record.deal.as_ref().map(|d| d.id.to_string()).unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "Name" => Some(&mut self.name),
            "description_c" => Some(&mut self.description),
            "due_date_c" => Some(&mut self.due),
            "status_c" => Some(&mut self.status),
            "priority_c" => Some(&mut self.priority),
            "Tags" => Some(&mut self.tags),
            "contact_id_c" => Some(&mut self.contact),
            "deal_id_c" => Some(&mut self.deal),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "Name" => Some(self.name.as_str()),
            "description_c" => Some(self.description.as_str()),
            "due_date_c" => Some(self.due.as_str()),
            "status_c" => Some(self.status.as_str()),
            "priority_c" => Some(self.priority.as_str()),
            "Tags" => Some(self.tags.as_str()),
            "contact_id_c" => Some(self.contact.as_str()),
            "deal_id_c" => Some(self.deal.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<TaskDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "Name", &self.name, "Task name is required");
        let due = optional(&self.due).and_then(|text| {
            let parsed = codec::parse_timestamp(&text);
            if parsed.is_none() {
                errors.insert("due_date_c", "Due date must be a valid date and time");
            }
            parsed
        });
        let status = parse_choice(&mut errors, "status_c", &self.status, TaskStatus::default());
        let priority = parse_choice(&mut errors, "priority_c", &self.priority, TaskPriority::default());

        errors.into_result(|| TaskDraft {
            name,
            description: optional(&self.description),
            due,
            status,
            priority,
            tags: optional(&self.tags),
            contact: optional_reference(&self.contact),
            deal: optional_reference(&self.deal),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_defaults_and_required_name() {
        let form = TaskForm::default();
        assert_eq!(form.status, "Not Started");
        assert_eq!(form.priority, "Medium");
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("Name"), Some("Task name is required"));
    }

    #[test]
    fn test_due_round_trips_through_minute_input() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "Id": 4,
            "Name": "Call back",
            "due_date_c": "2024-05-01T10:30:00Z",
            "priority_c": "High"
        }))
        .unwrap();
        let form = TaskForm::from_record(&task);
        assert_eq!(form.due, "2024-05-01T10:30");
        assert_eq!(form.status, "Not Started");

        let draft = form.validate().unwrap();
        assert_eq!(draft.due, Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()));
        assert_eq!(draft.priority, TaskPriority::High);
    }

    #[test]
    fn test_rejects_unknown_priority() {
        let form = TaskForm {
            name: "Call back".into(),
            priority: "Urgent".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate().unwrap_err().get("priority_c"),
            Some("'Urgent' is not a valid task priority")
        );
    }
}
