//! Contact directory index.
//!
//! Maps normalized phone keys to contacts. Rebuilt from the contact backend
//! at the start of every sync pass and never updated in place, so a contact
//! added mid-session is matched on the very next pass.
//!
//! A contact with several numbers gets one entry per number. When two
//! contacts share a key, the one listed later wins.

use crate::contacts::{Contact, ContactService};
use crate::error::SyncResult;
use crate::phone::{NormalizedPhoneKey, PhoneNormalizer};
use devsync_types::ContactId;
use std::collections::HashMap;
use tracing::debug;

/// What a directory hit resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRef {
    pub id: ContactId,
    pub name: String,
}

impl From<&Contact> for ContactRef {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id.clone(),
            name: contact.name.clone(),
        }
    }
}

/// Read-only snapshot of the contact directory for one pass.
#[derive(Debug, Clone)]
pub struct ContactDirectory {
    normalizer: PhoneNormalizer,
    entries: HashMap<NormalizedPhoneKey, ContactRef>,
}

impl ContactDirectory {
    /// Fetches the full contact set and indexes every phone field.
    pub async fn build(
        service: &dyn ContactService,
        normalizer: PhoneNormalizer,
    ) -> SyncResult<Self> {
        let contacts = service.get_contacts().await?;
        Ok(Self::from_contacts(&contacts, normalizer))
    }

    /// Indexes an already-fetched contact list.
    pub fn from_contacts(contacts: &[Contact], normalizer: PhoneNormalizer) -> Self {
        let mut entries = HashMap::new();
        let mut unparseable = 0usize;

        for contact in contacts {
            for phone in contact.phones() {
                match normalizer.normalize(phone) {
                    Some(key) => {
                        entries.insert(key, ContactRef::from(contact));
                    }
                    None => unparseable += 1,
                }
            }
        }

        debug!(
            "Indexed {} phone keys from {} contacts ({} unparseable)",
            entries.len(),
            contacts.len(),
            unparseable
        );
        Self {
            normalizer,
            entries,
        }
    }

    /// Looks up an already-normalized key.
    pub fn get(&self, key: &NormalizedPhoneKey) -> Option<&ContactRef> {
        self.entries.get(key)
    }

    /// Normalizes a raw device string and looks it up. `None` covers both
    /// unparseable input and unknown numbers.
    pub fn resolve(&self, raw: &str) -> Option<&ContactRef> {
        self.normalizer
            .normalize(raw)
            .and_then(|key| self.entries.get(&key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
