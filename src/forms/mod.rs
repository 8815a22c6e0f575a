//! Edit forms and the modal state machine that drives them.
//!
//! A form holds every editable field as a string, exactly as typed. Opening a
//! modal on an existing record copies the record into that string state;
//! submitting validates the strings once into a typed draft and hands the draft
//! to the entity's [`RecordService`]. Validation failures never reach the
//! network.

pub mod activity;
pub mod company;
pub mod contact;
pub mod deal;
pub mod picker;
pub mod quote;
pub mod task;

pub use activity::ActivityForm;
pub use company::CompanyForm;
pub use contact::ContactForm;
pub use deal::DealForm;
pub use picker::{PickerOption, PickerSet, Pickers};
pub use quote::QuoteForm;
pub use task::TaskForm;

use crate::app::notify::Notifier;
use crate::backend::RecordClient;
use crate::core::RecordService;
use crate::errors::{Error, Result};
use crate::schema::{RecordId, RecordSchema};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, keeping the first one reported.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Drops the message for `field`.
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> std::result::Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Requires a non-blank value; returns it trimmed.
pub(crate) fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.insert(field, message);
    }
    trimmed.to_string()
}

/// Blank input means "not set".
pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Optional reference picker value; anything that is not an id means "none".
pub(crate) fn optional_reference(value: &str) -> Option<RecordId> {
    crate::schema::codec::parse_reference(value)
}

/// Required reference picker value.
pub(crate) fn required_reference(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> Option<RecordId> {
    let id = optional_reference(value);
    if id.is_none() {
        errors.insert(field, message);
    }
    id
}

/// Editable string state for one entity.
pub trait RecordForm: Default + Clone + Send + Sync {
    /// Entity the form edits
    type Entity: RecordSchema;

    /// Editable fields, in display order
    const FIELDS: &'static [&'static str];

    /// Reference pickers loaded when the modal opens
    const PICKERS: PickerSet = PickerSet::None;

    /// Copies a stored record into form state.
    fn from_record(record: &Self::Entity) -> Self;

    /// Mutable access to one field.
    fn field_mut(&mut self, field: &str) -> Option<&mut String>;

    /// Current value of one field.
    fn field(&self, field: &str) -> Option<&str>;

    /// Converts the form into a typed draft, or reports every invalid field.
    fn validate(&self) -> std::result::Result<<Self::Entity as RecordSchema>::Draft, FieldErrors>;

    /// Sets one field.
    ///
    /// # Errors
    /// [`Error::UnknownField`] when the form has no such field.
    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let slot = self.field_mut(field).ok_or_else(|| Error::UnknownField {
            field: field.to_string(),
        })?;
        value.clone_into(slot);
        Ok(())
    }
}

/// What the modal is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A record not yet stored
    New,
    /// The stored record with this id
    Existing(RecordId),
}

/// Modal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// Not showing
    Closed,
    /// Open and accepting edits
    Editing(EditTarget),
    /// Waiting for the backend
    Submitting(EditTarget),
}

/// Result of [`Modal::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    /// The modal was not open for editing; nothing happened
    NotOpen,
    /// Validation failed; this many fields carry errors and no call was made
    Invalid(usize),
    /// Saved; the modal is closed. `None` when the backend did not echo the record
    Saved(Option<E>),
    /// The service refused; the modal stays open
    Failed(String),
}

pub(crate) fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Create/edit dialog for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal<F> {
    state: ModalState,
    form: F,
    errors: FieldErrors,
}

impl<F: RecordForm> Default for Modal<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: RecordForm> Modal<F> {
    /// A closed modal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ModalState::Closed,
            form: F::default(),
            errors: FieldErrors::new(),
        }
    }

    /// Where the modal is in its cycle.
    #[must_use]
    pub const fn state(&self) -> ModalState {
        self.state
    }

    /// Whether the modal is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    /// The form as currently typed.
    #[must_use]
    pub const fn form(&self) -> &F {
        &self.form
    }

    /// Direct access to the form, for actions beyond single-field edits.
    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    /// Errors from the last submit, minus fields edited since.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Opens an empty form for a new record.
    pub fn open_new(&mut self) {
        self.open_new_with(F::default());
    }

    /// Opens a prefilled form for a new record.
    pub fn open_new_with(&mut self, form: F) {
        self.form = form;
        self.errors = FieldErrors::new();
        self.state = ModalState::Editing(EditTarget::New);
    }

    /// Opens the form on an existing record.
    pub fn open_existing(&mut self, record: &F::Entity) {
        self.form = F::from_record(record);
        self.errors = FieldErrors::new();
        self.state = ModalState::Editing(EditTarget::Existing(record.id()));
        debug!("Editing {} {}", <F::Entity as RecordSchema>::LABEL, record.id());
    }

    /// Closes the modal and discards the form.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    /// Edits one field and clears its error.
    ///
    /// # Errors
    /// [`Error::UnknownField`] when the form has no such field.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.form.set(field, value)?;
        self.errors.clear(field);
        Ok(())
    }

    /// Validates and saves.
    ///
    /// On success a notice is shown and the modal closes; on a service failure
    /// an error notice is shown and the modal returns to editing.
    pub async fn submit<C: RecordClient>(
        &mut self,
        service: &RecordService<'_, F::Entity, C>,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome<F::Entity> {
        let ModalState::Editing(target) = self.state else {
            return SubmitOutcome::NotOpen;
        };
        let label = <F::Entity as RecordSchema>::LABEL;

        let draft = match self.form.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                debug!("{} form has {} invalid field(s)", label, errors.len());
                let count = errors.len();
                self.errors = errors;
                return SubmitOutcome::Invalid(count);
            }
        };
        self.errors = FieldErrors::new();
        self.state = ModalState::Submitting(target);

        let saved = match target {
            EditTarget::New => service.create(&draft).await.map(|record| (record, "created")),
            EditTarget::Existing(id) => service
                .update(id, &<F::Entity as RecordSchema>::Patch::from(draft))
                .await
                .map(|record| (record, "updated")),
        };

        match saved {
            Ok((record, verb)) => {
                match (&record, target) {
                    (Some(stored), _) => info!("{} {} {}", label, stored.id(), verb),
                    (None, EditTarget::Existing(id)) => info!("{} {} {}", label, id, verb),
                    (None, EditTarget::New) => info!("{} {}", label, verb),
                }
                notifier.success(&format!("{} {verb} successfully", capitalized(label)));
                self.close();
                SubmitOutcome::Saved(record)
            }
            Err(e) => {
                notifier.error(&format!("Failed to save {label}"));
                self.state = ModalState::Editing(target);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::app::notify::{Notice, NoticeLevel};
    use crate::backend::{RecordResult, ResponseEnvelope};
    use crate::test_utils::{RecordingNotifier, ScriptedClient, setup_test_services};
    use serde_json::json;

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("deal"), "Deal");
        assert_eq!(capitalized(""), "");
    }

    #[tokio::test]
    async fn test_closed_modal_does_not_submit() {
        let client = ScriptedClient::new();
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<ContactForm>::new();
        let outcome = modal.submit(&RecordService::new(&client, 100), &notifier).await;
        assert_eq!(outcome, SubmitOutcome::NotOpen);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_editing_a_field_clears_its_error() {
        let client = ScriptedClient::new();
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<ContactForm>::new();
        modal.open_new();
        let outcome = modal.submit(&RecordService::new(&client, 100), &notifier).await;
        assert_eq!(outcome, SubmitOutcome::Invalid(4));
        assert_eq!(modal.errors().get("first_name_c"), Some("First name is required"));

        modal.set_field("first_name_c", "Ann").unwrap();
        assert_eq!(modal.errors().get("first_name_c"), None);
        assert_eq!(modal.errors().len(), 3);
        assert!(matches!(modal.set_field("nope_c", "x"), Err(Error::UnknownField { .. })));
    }

    #[tokio::test]
    async fn test_successful_create_notifies_and_closes() -> Result<()> {
        let services = setup_test_services().await?;
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<CompanyForm>::new();
        modal.open_new();
        modal.set_field("name_c", "Acme")?;
        modal.set_field("industry_c", "Retail")?;

        let outcome = modal.submit(&services.companies(), &notifier).await;
        assert!(matches!(outcome, SubmitOutcome::Saved(Some(ref company)) if company.company_name.as_deref() == Some("Acme")));
        assert_eq!(modal.state(), ModalState::Closed);
        assert_eq!(
            notifier.notices(),
            vec![Notice {
                level: NoticeLevel::Success,
                message: "Company created successfully".into()
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_accepted_without_record_still_closes() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope {
            success: true,
            message: None,
            data: None,
            results: None,
        });
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<CompanyForm>::new();
        modal.open_new();
        modal.set_field("name_c", "Acme").unwrap();
        modal.set_field("industry_c", "Retail").unwrap();

        let outcome = modal.submit(&RecordService::new(&client, 100), &notifier).await;
        assert_eq!(outcome, SubmitOutcome::Saved(None));
        assert_eq!(modal.state(), ModalState::Closed);
        assert_eq!(client.call_count(), 1);
        assert_eq!(notifier.notices()[0].message, "Company created successfully");
    }

    #[tokio::test]
    async fn test_service_failure_keeps_modal_open() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::with_results(vec![RecordResult::rejected(
            "Name already taken",
            Vec::new(),
        )]));
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<CompanyForm>::new();
        modal.open_new();
        modal.set_field("name_c", "Acme").unwrap();
        modal.set_field("industry_c", "Retail").unwrap();

        let outcome = modal.submit(&RecordService::new(&client, 100), &notifier).await;
        assert_eq!(outcome, SubmitOutcome::Failed("Name already taken".into()));
        assert_eq!(modal.state(), ModalState::Editing(EditTarget::New));
        assert_eq!(modal.form().field("name_c"), Some("Acme"));
        assert_eq!(notifier.notices()[0].level, NoticeLevel::Error);
        assert_eq!(notifier.notices()[0].message, "Failed to save company");
    }

    #[tokio::test]
    async fn test_editing_existing_record_sends_update() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::with_results(vec![RecordResult::accepted(
            json!({"Id": 8, "name_c": "Acme Ltd", "industry_c": "Retail"}),
        )]));
        let company: crate::schema::Company =
            serde_json::from_value(json!({"Id": 8, "name_c": "Acme", "industry_c": "Retail"})).unwrap();
        let notifier = RecordingNotifier::default();
        let mut modal = Modal::<CompanyForm>::new();
        modal.open_existing(&company);
        assert_eq!(modal.state(), ModalState::Editing(EditTarget::Existing(RecordId(8))));
        modal.set_field("name_c", "Acme Ltd").unwrap();

        let outcome = modal.submit(&RecordService::new(&client, 100), &notifier).await;
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        let call = &client.calls()[0];
        assert_eq!(call.operation, "update_record");
        assert_eq!(call.body["records"][0]["Id"], 8);
        assert_eq!(call.body["records"][0]["name_c"], "Acme Ltd");
        assert_eq!(notifier.notices()[0].message, "Company updated successfully");
    }
}
