//! Contact list persistence
//!
//! The whole collection is the unit of persistence: every save rewrites
//! the full list, there is no partial update.

use super::JsonStore;
use crate::error::Result;
use crate::models::Contact;
use std::path::{Path, PathBuf};

/// Reads and writes the contacts document
#[derive(Clone)]
pub struct ContactStore {
    store: JsonStore,
}

impl ContactStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            store: JsonStore::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Load the full list. A missing file is an empty list, not an error.
    /// A corrupt file is reported and left as it is on disk.
    pub async fn load_contacts(&self) -> Result<Vec<Contact>> {
        match self.store.read::<Vec<Contact>>().await? {
            Some(contacts) => {
                tracing::info!(
                    "Loaded {} contacts from {:?}",
                    contacts.len(),
                    self.store.path()
                );
                Ok(contacts)
            }
            None => {
                tracing::info!("Contacts file not found, starting with an empty book");
                Ok(Vec::new())
            }
        }
    }

    /// Replace the file with the full list
    pub async fn save_contacts(&self, contacts: &[Contact]) -> Result<()> {
        self.store.write(&contacts).await?;
        tracing::info!(
            "Saved {} contacts to {:?}",
            contacts.len(),
            self.store.path()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tempfile::TempDir;

    fn create_test_store() -> (ContactStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ContactStore::new(temp_dir.path().join("phonebook.json"));
        (store, temp_dir)
    }

    fn contact(first: &str, last: &str, phone: &str) -> Contact {
        let mut contact = Contact::new();
        contact.first_name = first.to_string();
        contact.last_name = last.to_string();
        contact.phone_number = phone.to_string();
        contact
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_book() {
        let (store, _temp) = create_test_store();
        assert!(store.load_contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_preserves_order_and_fields() {
        let (store, _temp) = create_test_store();

        let mut second = contact("Jan", "Kowalski", "700 800 900");
        second.email = Some("jan@example.pl".to_string());
        second.notes = Some("Neighbour".to_string());
        let contacts = vec![contact("Anna", "Nowak", "600 100 200"), second];

        store.save_contacts(&contacts).await.unwrap();
        let loaded = store.load_contacts().await.unwrap();

        assert_eq!(loaded, contacts);
    }

    #[tokio::test]
    async fn test_empty_list_round_trips() {
        let (store, _temp) = create_test_store();

        store.save_contacts(&[]).await.unwrap();

        assert!(store.path().exists());
        assert!(store.load_contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_differently_cased_keys() {
        let (store, _temp) = create_test_store();
        let json = r#"[
          {
            "Id": "6f1c2b3a-0d4e-4f5a-8b6c-7d8e9f0a1b2c",
            "FirstName": "Ewa",
            "LASTNAME": "Zielińska",
            "phoneNumber": "123 456 789",
            "Email": null,
            "CreatedDate": "2023-05-01T08:00:00+02:00",
            "ModifiedDate": "2023-06-01T08:00:00+02:00"
          }
        ]"#;
        std::fs::write(store.path(), json).unwrap();

        let loaded = store.load_contacts().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded[0].id().to_string(),
            "6f1c2b3a-0d4e-4f5a-8b6c-7d8e9f0a1b2c"
        );
        assert_eq!(loaded[0].last_name, "Zielińska");
        assert!(loaded[0].email.is_none());
        assert!(loaded[0].created_date < loaded[0].modified_date);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "[{\"firstName\": ").unwrap();

        let err = store.load_contacts().await.unwrap_err();

        assert!(matches!(err, AppError::PersistenceRead { .. }));
        assert!(err.to_string().contains("phonebook.json"));
    }
}
