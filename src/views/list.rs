//! Load/filter/delete loop shared by every record list.

use crate::app::notify::Notifier;
use crate::backend::RecordClient;
use crate::core::RecordService;
use crate::errors::Error;
use crate::forms::capitalized;
use crate::schema::{Activity, Choice, Company, Contact, Deal, Quote, RecordId, RecordSchema, Reference, Task};
use tracing::{debug, warn};

/// A record type that can be shown in a searchable list.
pub trait Listed: RecordSchema {
    /// Heading of the empty-state placeholder
    const EMPTY_TITLE: &'static str;
    /// Call-to-action of the empty-state placeholder
    const EMPTY_ACTION: &'static str;

    /// Display fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

impl Listed for Contact {
    const EMPTY_TITLE: &'static str = "No contacts found";
    const EMPTY_ACTION: &'static str = "Add Contact";

    fn search_fields(&self) -> Vec<&str> {
        [&self.first_name, &self.last_name, &self.email, &self.company]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect()
    }
}

impl Listed for Company {
    const EMPTY_TITLE: &'static str = "No companies found";
    const EMPTY_ACTION: &'static str = "Add Company";

    fn search_fields(&self) -> Vec<&str> {
        [&self.company_name, &self.industry]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect()
    }
}

impl Listed for Deal {
    const EMPTY_TITLE: &'static str = "No items in sales pipeline";
    const EMPTY_ACTION: &'static str = "Add Deal";

    fn search_fields(&self) -> Vec<&str> {
        [self.title.as_deref(), lookup_name(self.contact.as_ref())].into_iter().flatten().collect()
    }
}

fn lookup_name(reference: Option<&Reference>) -> Option<&str> {
    reference.and_then(|r| r.name.as_deref())
}

impl Listed for Quote {
    const EMPTY_TITLE: &'static str = "No quotes found";
    const EMPTY_ACTION: &'static str = "Add Quote";

    fn search_fields(&self) -> Vec<&str> {
        [
            self.name.as_deref(),
            lookup_name(self.company.as_ref()),
            lookup_name(self.contact.as_ref()),
            lookup_name(self.deal.as_ref()),
            self.status.map(Choice::as_str),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Listed for Task {
    const EMPTY_TITLE: &'static str = "No tasks found";
    const EMPTY_ACTION: &'static str = "Add Task";

    fn search_fields(&self) -> Vec<&str> {
        [
            self.name.as_deref(),
            self.description.as_deref(),
            self.status.map(Choice::as_str),
            self.priority.map(Choice::as_str),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Listed for Activity {
    const EMPTY_TITLE: &'static str = "No activities yet";
    const EMPTY_ACTION: &'static str = "Log Activity";

    fn search_fields(&self) -> Vec<&str> {
        [self.description.as_deref(), self.kind.map(Choice::as_str)]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Records whose display fields contain `term`, ignoring case, in source order.
pub fn filter<'a, E: Listed>(items: &'a [E], term: &str) -> Vec<&'a E> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Blocking yes/no prompt shown before a delete.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Where a list is in its load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<E> {
    /// Load in flight
    Loading,
    /// Load failed; [`RecordList::load`] again to retry
    Error(String),
    /// Loaded, but there are no records
    Empty,
    /// Loaded records, unfiltered
    Loaded(Vec<E>),
}

/// A loaded record collection with its search term.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordList<E> {
    state: LoadState<E>,
    term: String,
}

impl<E: Listed> Default for RecordList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Listed> RecordList<E> {
    /// Empty list in the loading state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            term: String::new(),
        }
    }

    /// Current load state.
    #[must_use]
    pub const fn state(&self) -> &LoadState<E> {
        &self.state
    }

    /// (Re)loads the whole collection; also the retry action of the error state.
    pub async fn load<C: RecordClient>(&mut self, service: &RecordService<'_, E, C>) {
        self.state = LoadState::Loading;
        self.state = match service.try_get_all().await {
            Ok(items) if items.is_empty() => LoadState::Empty,
            Ok(items) => {
                debug!("Listing {} {}(s)", items.len(), E::LABEL);
                LoadState::Loaded(items)
            }
            Err(e) => {
                warn!("Failed to load {} list: {}", E::LABEL, e);
                LoadState::Error(format!("Failed to load {} records", E::LABEL))
            }
        };
    }

    /// Every loaded record, unfiltered.
    #[must_use]
    pub fn items(&self) -> &[E] {
        match &self.state {
            LoadState::Loaded(items) => items,
            _ => &[],
        }
    }

    /// Sets the search term; blank shows everything.
    pub fn set_search(&mut self, term: &str) {
        term.clone_into(&mut self.term);
    }

    /// Current search term.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.term
    }

    /// Loaded records matching the current search term.
    #[must_use]
    pub fn visible(&self) -> Vec<&E> {
        filter(self.items(), &self.term)
    }

    /// Record to open in the edit modal.
    #[must_use]
    pub fn select(&self, id: RecordId) -> Option<&E> {
        self.items().iter().find(|item| item.id() == id)
    }

    /// Asks for confirmation, deletes, then reloads the whole list.
    ///
    /// Returns whether the record was deleted. A declined prompt makes no call;
    /// a failed delete leaves the list as it was.
    pub async fn delete<C: RecordClient>(
        &mut self,
        service: &RecordService<'_, E, C>,
        id: RecordId,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> bool {
        if !confirm.confirm(&format!("Are you sure you want to delete this {}?", E::LABEL)) {
            debug!("Delete of {} {} cancelled", E::LABEL, id);
            return false;
        }
        match service.delete_unreferenced(id).await {
            Ok(true) => {
                notifier.success(&format!("{} deleted successfully", capitalized(E::LABEL)));
                self.load(service).await;
                true
            }
            Ok(false) => {
                notifier.error(&format!("Failed to delete {}", E::LABEL));
                false
            }
            Err(e @ Error::StillReferenced { .. }) => {
                notifier.error(&e.to_string());
                false
            }
            Err(e) => {
                warn!("Delete of {} {} failed: {}", E::LABEL, id, e);
                notifier.error(&format!("Failed to delete {}", E::LABEL));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::app::notify::NoticeLevel;
    use crate::backend::ResponseEnvelope;
    use crate::errors::Result;
    use crate::test_utils::{
        RecordingNotifier, ScriptedClient, sample_contact_draft, sample_deal_draft, setup_test_services,
    };
    use serde_json::json;

    fn contact(id: i64, first: &str) -> Contact {
        serde_json::from_value(json!({"Id": id, "first_name_c": first})).unwrap()
    }

    #[test]
    fn test_filter_is_case_insensitive_and_keeps_order() {
        let contacts = vec![contact(1, "Ann"), contact(2, "Bob")];
        let matched = filter(&contacts, "an");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, RecordId(1));

        let all: Vec<i64> = filter(&contacts, "").iter().map(|c| c.id.0).collect();
        assert_eq!(all, vec![1, 2]);
        assert_eq!(filter(&contacts, "BO").len(), 1);
    }

    #[test]
    fn test_deal_search_uses_contact_lookup_name() {
        let deals: Vec<Deal> = vec![
            serde_json::from_value(json!({"Id": 1, "title_c": "Renewal", "contact_id_c": {"Id": 3, "Name": "Dana Scully"}}))
                .unwrap(),
        ];
        assert_eq!(filter(&deals, "scully").len(), 1);
        assert!(filter(&deals, "mulder").is_empty());
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_calls() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::with_data(json!([{"Id": 1, "first_name_c": "Ann"}])));
        let service = RecordService::<Contact, _>::new(&client, 100);
        let notifier = RecordingNotifier::default();
        let mut list = RecordList::new();
        list.load(&service).await;
        let before = client.call_count();

        let deleted = list.delete(&service, RecordId(1), &|_: &str| false, &notifier).await;
        assert!(!deleted);
        assert_eq!(client.call_count(), before);
        assert_eq!(list.items().len(), 1);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_load_states() {
        let client = ScriptedClient::new();
        client.fail_next("connection refused");
        let service = RecordService::<Task, _>::new(&client, 100);
        let mut list = RecordList::new();
        assert_eq!(list.state(), &LoadState::Loading);

        list.load(&service).await;
        assert_eq!(list.state(), &LoadState::Error("Failed to load task records".into()));

        // Retry hits the exhausted script, which answers with no rows.
        list.load(&service).await;
        assert_eq!(list.state(), &LoadState::Empty);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_confirmed_delete_reloads() -> Result<()> {
        let services = setup_test_services().await?;
        let ann = services.contacts().create(&sample_contact_draft("Ann", "Lee")).await?.unwrap();
        services.contacts().create(&sample_contact_draft("Bob", "Ray")).await?;
        let notifier = RecordingNotifier::default();
        let contacts = services.contacts();
        let mut list = RecordList::new();
        list.load(&contacts).await;
        assert_eq!(list.items().len(), 2);

        assert!(list.delete(&contacts, ann.id, &|_: &str| true, &notifier).await);
        assert_eq!(list.items().len(), 1);
        assert_eq!(notifier.notices()[0].message, "Contact deleted successfully");
        Ok(())
    }

    #[tokio::test]
    async fn test_referenced_delete_is_refused() -> Result<()> {
        let services = setup_test_services().await?;
        let ann = services.contacts().create(&sample_contact_draft("Ann", "Lee")).await?.unwrap();
        services.deals().create(&sample_deal_draft("Renewal", ann.id)).await?;
        let notifier = RecordingNotifier::default();
        let contacts = services.contacts();
        let mut list = RecordList::<Contact>::new();
        list.load(&contacts).await;

        assert!(!list.delete(&contacts, ann.id, &|_: &str| true, &notifier).await);
        assert_eq!(list.items().len(), 1);
        assert_eq!(notifier.notices()[0].level, NoticeLevel::Error);
        Ok(())
    }
}
