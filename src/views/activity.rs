//! Recent activity feed.

use super::names::NameIndex;
use crate::backend::RecordClient;
use crate::core::CrmServices;
use crate::schema::{Activity, ActivityKind, Contact, RecordId};
use chrono::{DateTime, Utc};

/// Icon for an activity without a known type.
pub const DEFAULT_ICON: &str = "Activity";

/// One rendered feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Activity record
    pub id: RecordId,
    /// Activity type, if it parsed
    pub kind: Option<ActivityKind>,
    /// Icon name for the type
    pub icon: &'static str,
    /// What happened
    pub description: String,
    /// Resolved contact name
    pub contact_name: String,
    /// When it happened
    pub timestamp: Option<DateTime<Utc>>,
}

/// Activities newest first, as the backend orders them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFeed {
    entries: Vec<FeedEntry>,
}

impl ActivityFeed {
    /// Builds the feed, keeping at most `limit` entries.
    #[must_use]
    pub fn build(activities: &[Activity], contacts: &[Contact], limit: Option<usize>) -> Self {
        let names = NameIndex::from_contacts(contacts);
        let entries = activities
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|activity| FeedEntry {
                id: activity.id,
                kind: activity.kind,
                icon: activity.kind.map_or(DEFAULT_ICON, ActivityKind::icon),
                description: activity.description.clone().unwrap_or_default(),
                contact_name: names.contact_name(activity.contact.as_ref()),
                timestamp: activity.timestamp,
            })
            .collect();
        Self { entries }
    }

    /// Loads activities and contacts concurrently.
    pub async fn load<C: RecordClient>(services: &CrmServices<C>, limit: Option<usize>) -> Self {
        let (activities, contacts) = (services.activities(), services.contacts());
        let (activities, contacts) = tokio::join!(activities.get_all(), contacts.get_all());
        Self::build(&activities, &contacts, limit)
    }

    /// Feed lines, newest first.
    #[must_use]
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
