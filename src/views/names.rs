//! Contact name resolution for views that show deals and activities.

use crate::schema::{Contact, RecordId, RecordSchema, Reference};
use std::collections::HashMap;

/// Shown when a reference matches no loaded contact.
pub const UNKNOWN_CONTACT: &str = "Unknown Contact";

/// Contact display names keyed by id.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    names: HashMap<RecordId, String>,
}

impl NameIndex {
    /// Index of the display names of `contacts`.
    pub fn from_contacts(contacts: &[Contact]) -> Self {
        Self {
            names: contacts.iter().map(|c| (c.id, c.display_name())).collect(),
        }
    }

    /// Name for a contact reference.
    ///
    /// Loaded contacts win over the name embedded in a lookup value.
    #[must_use]
    pub fn contact_name(&self, reference: Option<&Reference>) -> String {
        let Some(reference) = reference else {
            return UNKNOWN_CONTACT.to_string();
        };
        self.names
            .get(&reference.id)
            .filter(|name| !name.is_empty())
            .or(reference.name.as_ref().filter(|name| !name.is_empty()))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string())
    }

    /// Number of indexed contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no contact is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_name_fallbacks() {
        let ann: Contact =
            serde_json::from_value(json!({"Id": 1, "first_name_c": "Ann", "last_name_c": "Lee"})).unwrap();
        let index = NameIndex::from_contacts(&[ann]);

        assert_eq!(index.contact_name(Some(&Reference::to(RecordId(1)))), "Ann Lee");
        let lookup = Reference {
            id: RecordId(2),
            name: Some("Bo Chan".into()),
        };
        assert_eq!(index.contact_name(Some(&lookup)), "Bo Chan");
        assert_eq!(index.contact_name(Some(&Reference::to(RecordId(3)))), UNKNOWN_CONTACT);
        assert_eq!(index.contact_name(None), UNKNOWN_CONTACT);
    }
}
