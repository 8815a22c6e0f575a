//! Reference pickers for the deal, quote, task and activity forms.
//!
//! Options are loaded when a modal opens, with independent fetches issued
//! concurrently. A failed load leaves that picker empty.

use crate::backend::RecordClient;
use crate::core::CrmServices;
use crate::schema::{RecordId, RecordSchema};
use tracing::debug;

/// One selectable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    /// Record to link
    pub id: RecordId,
    /// Text shown in the picker
    pub label: String,
}

impl PickerOption {
    /// Option for `record`, labelled by its display name.
    pub fn from_record<E: RecordSchema>(record: &E) -> Self {
        Self {
            id: record.id(),
            label: record.display_name(),
        }
    }
}

fn options<E: RecordSchema>(records: &[E]) -> Vec<PickerOption> {
    records.iter().map(PickerOption::from_record).collect()
}

/// Which pickers a form needs when its modal opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerSet {
    /// No pickers
    None,
    /// Contacts and companies
    Deal,
    /// Contacts, companies and deals
    Quote,
    /// Contacts and deals
    FollowUp,
}

/// Picker options for the references a form can set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pickers {
    /// Contact options
    pub contacts: Vec<PickerOption>,
    /// Company options
    pub companies: Vec<PickerOption>,
    /// Deal options
    pub deals: Vec<PickerOption>,
}

impl Pickers {
    /// Loads the options `set` asks for.
    pub async fn load<C: RecordClient>(set: PickerSet, services: &CrmServices<C>) -> Self {
        match set {
            PickerSet::None => Self::default(),
            PickerSet::Deal => Self::for_deal(services).await,
            PickerSet::Quote => Self::for_quote(services).await,
            PickerSet::FollowUp => Self::for_follow_up(services).await,
        }
    }

    /// Contacts and companies.
    pub async fn for_deal<C: RecordClient>(services: &CrmServices<C>) -> Self {
        let (contacts, companies) = (services.contacts(), services.companies());
        let (contacts, companies) = tokio::join!(contacts.get_all(), companies.get_all());
        debug!("Loaded {} contact and {} company option(s)", contacts.len(), companies.len());
        Self {
            contacts: options(&contacts),
            companies: options(&companies),
            deals: Vec::new(),
        }
    }

    /// Contacts, companies and deals.
    pub async fn for_quote<C: RecordClient>(services: &CrmServices<C>) -> Self {
        let (contacts, companies, deals) = (services.contacts(), services.companies(), services.deals());
        let (contacts, companies, deals) = tokio::join!(contacts.get_all(), companies.get_all(), deals.get_all());
        Self {
            contacts: options(&contacts),
            companies: options(&companies),
            deals: options(&deals),
        }
    }

    /// Contacts and deals, for tasks and activities.
    pub async fn for_follow_up<C: RecordClient>(services: &CrmServices<C>) -> Self {
        let (contacts, deals) = (services.contacts(), services.deals());
        let (contacts, deals) = tokio::join!(contacts.get_all(), deals.get_all());
        Self {
            contacts: options(&contacts),
            companies: Vec::new(),
            deals: options(&deals),
        }
    }

    /// Label of the contact with `id`, if offered.
    #[must_use]
    pub fn contact_label(&self, id: RecordId) -> Option<&str> {
        self.contacts.iter().find(|o| o.id == id).map(|o| o.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::ResponseEnvelope;
    use crate::errors::Result;
    use crate::test_utils::{ScriptedClient, sample_company_draft, sample_contact_draft, sample_deal_draft, setup_test_services};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_quote_pickers_list_every_reference() -> Result<()> {
        let services = setup_test_services().await?;
        let contact = services.contacts().create(&sample_contact_draft("Ann", "Lee")).await?.unwrap();
        services.companies().create(&sample_company_draft("Acme")).await?;
        services.deals().create(&sample_deal_draft("Renewal", contact.id)).await?;

        let pickers = Pickers::for_quote(&services).await;
        assert_eq!(pickers.contacts.len(), 1);
        assert_eq!(pickers.contact_label(contact.id), Some("Ann Lee"));
        assert_eq!(pickers.companies[0].label, "Acme");
        assert_eq!(pickers.deals[0].label, "Renewal");
        Ok(())
    }

    #[tokio::test]
    async fn test_deal_pickers_issue_two_fetches() {
        let client = ScriptedClient::new();
        client.respond(ResponseEnvelope::failure("backend down"));
        let services = CrmServices::new(Arc::new(client), 100);

        let pickers = Pickers::for_deal(&services).await;
        assert!(pickers.deals.is_empty());
        let mut tables: Vec<String> = services.client().calls().into_iter().map(|c| c.table).collect();
        tables.sort();
        assert_eq!(tables, vec!["company_c".to_string(), "contact_c".to_string()]);
    }
}
