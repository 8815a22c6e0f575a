//! One entity page: the list, its edit modal and the refresh key tying them.

use super::notify::Notifier;
use crate::backend::RecordClient;
use crate::core::CrmServices;
use crate::forms::{Modal, Pickers, RecordForm, SubmitOutcome};
use crate::schema::RecordId;
use crate::views::{Confirm, Listed, RecordList};
use tracing::debug;

/// A record list together with its add/edit modal and reference pickers.
pub struct EntityPage<F: RecordForm> {
    list: RecordList<F::Entity>,
    modal: Modal<F>,
    pickers: Pickers,
    refresh_key: u64,
}

impl<F> Default for EntityPage<F>
where
    F: RecordForm,
    F::Entity: Listed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> EntityPage<F>
where
    F: RecordForm,
    F::Entity: Listed,
{
    /// Page with an unloaded list and a closed modal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: RecordList::new(),
            modal: Modal::new(),
            pickers: Pickers::default(),
            refresh_key: 0,
        }
    }

    /// The record list.
    #[must_use]
    pub const fn list(&self) -> &RecordList<F::Entity> {
        &self.list
    }

    /// The add/edit modal.
    #[must_use]
    pub const fn modal(&self) -> &Modal<F> {
        &self.modal
    }

    /// Mutable access to the modal, for field edits.
    pub fn modal_mut(&mut self) -> &mut Modal<F> {
        &mut self.modal
    }

    /// Options for the open modal's reference pickers.
    #[must_use]
    pub const fn pickers(&self) -> &Pickers {
        &self.pickers
    }

    /// Bumped after every successful save.
    #[must_use]
    pub const fn refresh_key(&self) -> u64 {
        self.refresh_key
    }

    /// Loads the list.
    pub async fn open<C: RecordClient>(&mut self, services: &CrmServices<C>) {
        self.list.load(&services.records::<F::Entity>()).await;
    }

    /// Filters the list by `term`.
    pub fn search(&mut self, term: &str) {
        self.list.set_search(term);
    }

    /// Opens the modal on an empty form.
    pub async fn add<C: RecordClient>(&mut self, services: &CrmServices<C>) {
        self.pickers = Pickers::load(F::PICKERS, services).await;
        self.modal.open_new();
    }

    /// Opens the modal on a listed record. Returns `false` when it is not listed.
    pub async fn edit<C: RecordClient>(&mut self, services: &CrmServices<C>, id: RecordId) -> bool {
        let Some(record) = self.list.select(id).cloned() else {
            debug!("Record {} is not in the list", id);
            return false;
        };
        self.pickers = Pickers::load(F::PICKERS, services).await;
        self.modal.open_existing(&record);
        true
    }

    /// Submits the modal; a save bumps the refresh key and reloads the list.
    pub async fn save<C: RecordClient>(
        &mut self,
        services: &CrmServices<C>,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome<F::Entity> {
        let service = services.records::<F::Entity>();
        let outcome = self.modal.submit(&service, notifier).await;
        if matches!(outcome, SubmitOutcome::Saved(_)) {
            self.refresh_key += 1;
            self.list.load(&service).await;
        }
        outcome
    }

    /// Confirmed delete of a listed record, followed by a reload.
    pub async fn delete<C: RecordClient>(
        &mut self,
        services: &CrmServices<C>,
        id: RecordId,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> bool {
        self.list.delete(&services.records::<F::Entity>(), id, confirm, notifier).await
    }
}
