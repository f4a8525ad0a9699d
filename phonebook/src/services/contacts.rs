//! Contact book service
//!
//! Owns the ordered in-memory collection and the editing session state.
//! Edits happen on a cloned buffer that is validated before it replaces
//! anything in the collection; every successful add, edit or delete
//! rewrites the whole contacts file.
//!
//! The UI learns about state changes by draining [`BookEvent`]s.

use super::search::SearchQuery;
use super::settings::SettingsService;
use super::validation::validate_contact;
use crate::error::{AppError, Result};
use crate::models::{AppSettings, Contact, Theme};
use crate::storage::ContactStore;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Editing session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Adding,
    Editing,
}

/// Notification for the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    CollectionChanged,
    SelectionChanged(Option<Uuid>),
    EditBufferChanged,
    ModeChanged(EditMode),
    /// The visible (filtered) view must be re-read
    ViewChanged,
    WelcomeChanged(bool),
    ThemeChanged(Theme),
    /// A contacts file could not be read or written; in-memory state is intact
    PersistenceWarning(String),
}

/// In-memory contact collection with its editing state machine
pub struct ContactBook {
    contacts: Vec<Contact>,
    selected: Option<Uuid>,
    edit_buffer: Option<Contact>,
    mode: EditMode,
    query: SearchQuery,
    show_welcome: bool,
    settings: AppSettings,
    store: ContactStore,
    settings_service: SettingsService,
    events: Vec<BookEvent>,
}

impl ContactBook {
    /// Build a book around an already-loaded collection
    pub fn new(
        contacts: Vec<Contact>,
        settings: AppSettings,
        store: ContactStore,
        settings_service: SettingsService,
    ) -> Self {
        Self {
            contacts: dedupe_ids(contacts),
            selected: None,
            edit_buffer: None,
            mode: EditMode::Idle,
            query: SearchQuery::default(),
            show_welcome: true,
            settings,
            store,
            settings_service,
            events: Vec::new(),
        }
    }

    /// Load the contacts file and build a book.
    ///
    /// An unreadable file leaves the book empty and queues a
    /// [`BookEvent::PersistenceWarning`]; the file itself is not touched.
    pub async fn open(
        store: ContactStore,
        settings_service: SettingsService,
        settings: AppSettings,
    ) -> Self {
        let (contacts, warning) = match store.load_contacts().await {
            Ok(contacts) => (contacts, None),
            Err(e) => {
                tracing::warn!("Failed to load contacts: {}", e);
                (Vec::new(), Some(e))
            }
        };

        let mut book = Self::new(contacts, settings, store, settings_service);
        if let Some(e) = warning {
            book.emit(BookEvent::PersistenceWarning(e.to_string()));
        }
        book
    }

    // ===== Collection =====

    /// All contacts in insertion/load order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id() == id)
    }

    // ===== Search =====

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = SearchQuery::new(query);
        if query == self.query {
            return;
        }
        tracing::debug!("Search query changed: {:?}", query.as_str());
        self.query = query;
        self.emit(BookEvent::ViewChanged);
    }

    /// Contacts matching the current query, in collection order
    pub fn visible(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.contacts.iter().filter(|c| self.query.matches(c))
    }

    // ===== Selection and state =====

    pub fn selected(&self) -> Option<&Contact> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    /// Change the selection. While idle the edit buffer follows it.
    pub fn select(&mut self, id: Option<Uuid>) -> Result<()> {
        let Some(id) = id else {
            self.selected = None;
            self.emit(BookEvent::SelectionChanged(None));
            return Ok(());
        };

        let contact = self.get(id).cloned().ok_or(AppError::ContactNotFound(id))?;

        self.selected = Some(id);
        self.emit(BookEvent::SelectionChanged(Some(id)));
        self.set_welcome(false);

        if self.is_idle() {
            self.edit_buffer = Some(contact);
            self.emit(BookEvent::EditBufferChanged);
        }

        tracing::debug!("Selected contact: {}", id);
        Ok(())
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == EditMode::Idle
    }

    pub fn is_adding(&self) -> bool {
        self.mode == EditMode::Adding
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    pub fn can_edit(&self) -> bool {
        self.selected.is_some() && self.is_idle()
    }

    pub fn can_delete(&self) -> bool {
        self.can_edit()
    }

    pub fn show_welcome(&self) -> bool {
        self.show_welcome
    }

    pub fn show_details(&self) -> bool {
        !self.show_welcome && (self.selected.is_some() || !self.is_idle())
    }

    /// Working copy being displayed or edited
    pub fn edit_buffer(&self) -> Option<&Contact> {
        self.edit_buffer.as_ref()
    }

    /// Mutable working copy; only available while adding or editing
    pub fn edit_buffer_mut(&mut self) -> Option<&mut Contact> {
        if self.is_idle() {
            return None;
        }
        self.edit_buffer.as_mut()
    }

    // ===== Editing session =====

    /// Start adding a new contact with a pre-minted identifier
    pub fn begin_add(&mut self) -> Result<()> {
        if !self.is_idle() {
            return Err(AppError::InvalidState(
                "Finish or cancel the current edit first".to_string(),
            ));
        }

        let contact = Contact::new();
        tracing::debug!("Adding new contact: {}", contact.id());

        self.edit_buffer = Some(contact);
        self.emit(BookEvent::EditBufferChanged);
        self.set_mode(EditMode::Adding);
        self.set_welcome(false);
        Ok(())
    }

    /// Start editing a clone of the selected contact
    pub fn begin_edit(&mut self) -> Result<()> {
        if !self.can_edit() {
            return Err(AppError::InvalidState(
                "Select a contact and finish the current edit first".to_string(),
            ));
        }

        let contact = self
            .selected()
            .cloned()
            .ok_or_else(|| AppError::InvalidState("Selected contact is missing".to_string()))?;
        tracing::debug!("Editing contact: {}", contact.id());

        self.edit_buffer = Some(contact);
        self.emit(BookEvent::EditBufferChanged);
        self.set_mode(EditMode::Editing);
        self.set_welcome(false);
        Ok(())
    }

    /// Discard the buffer and return to idle
    pub fn cancel(&mut self) {
        self.set_mode(EditMode::Idle);

        match self.selected().cloned() {
            Some(contact) => {
                self.edit_buffer = Some(contact);
                self.set_welcome(false);
            }
            None => {
                self.edit_buffer = None;
                self.set_welcome(true);
            }
        }
        self.emit(BookEvent::EditBufferChanged);
    }

    /// Validate and commit the buffer, persist, and return to idle.
    ///
    /// Validation failures leave the session untouched. A failed write is
    /// reported as a [`BookEvent::PersistenceWarning`]; the commit stands.
    pub async fn save(&mut self) -> Result<Uuid> {
        let buffer = match (self.mode, &self.edit_buffer) {
            (EditMode::Idle, _) | (_, None) => {
                return Err(AppError::InvalidState("Nothing is being edited".to_string()))
            }
            (_, Some(buffer)) => buffer,
        };

        let errors = validate_contact(buffer);
        if !errors.is_empty() {
            tracing::debug!("Contact rejected with {} violations", errors.len());
            return Err(AppError::Validation(errors));
        }

        let mut contact = buffer.clone();
        contact.clear_blank_optionals();
        let id = contact.id();
        let now = Utc::now();

        if self.is_adding() {
            contact.created_date = now;
            contact.modified_date = now;
            self.contacts.push(contact);
            tracing::info!("Contact added: {}", id);
        } else {
            let Some(index) = self.contacts.iter().position(|c| c.id() == id) else {
                tracing::error!("Edited contact {} is missing from the collection", id);
                return Err(AppError::ContactNotFound(id));
            };
            contact.modified_date = now;
            self.contacts[index] = contact;
            tracing::info!("Contact updated: {}", id);
        }

        self.emit(BookEvent::CollectionChanged);
        self.emit(BookEvent::ViewChanged);

        // Leave the session before selecting so the buffer follows the selection
        self.set_mode(EditMode::Idle);
        self.select(Some(id))?;

        self.persist().await;

        Ok(id)
    }

    /// Remove the selected contact once `confirm` agrees.
    ///
    /// Returns `Ok(false)` when the user declined.
    pub async fn delete_selected<F>(&mut self, confirm: F) -> Result<bool>
    where
        F: FnOnce(&Contact) -> bool,
    {
        if !self.can_delete() {
            return Err(AppError::InvalidState(
                "Select a contact and finish the current edit first".to_string(),
            ));
        }

        let id = self
            .selected
            .ok_or_else(|| AppError::InvalidState("No contact selected".to_string()))?;
        let index = self
            .contacts
            .iter()
            .position(|c| c.id() == id)
            .ok_or(AppError::ContactNotFound(id))?;

        if !confirm(&self.contacts[index]) {
            tracing::debug!("Deletion of {} declined", id);
            return Ok(false);
        }

        self.contacts.remove(index);
        tracing::info!("Contact deleted: {}", id);

        self.selected = None;
        self.edit_buffer = None;
        self.emit(BookEvent::CollectionChanged);
        self.emit(BookEvent::ViewChanged);
        self.emit(BookEvent::SelectionChanged(None));
        self.emit(BookEvent::EditBufferChanged);

        self.persist().await;

        if self.contacts.is_empty() {
            self.set_welcome(true);
        }

        Ok(true)
    }

    // ===== Settings =====

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    /// Switch theme and persist settings silently
    pub async fn set_theme(&mut self, theme: Theme) {
        if self.settings.theme == theme {
            return;
        }

        self.settings.theme = theme;
        self.settings_service.save(&self.settings).await;
        tracing::info!("Theme changed to {}", theme);
        self.emit(BookEvent::ThemeChanged(theme));
    }

    // ===== Events =====

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<BookEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: BookEvent) {
        self.events.push(event);
    }

    fn set_mode(&mut self, mode: EditMode) {
        if self.mode != mode {
            self.mode = mode;
            self.emit(BookEvent::ModeChanged(mode));
        }
    }

    fn set_welcome(&mut self, show: bool) {
        if self.show_welcome != show {
            self.show_welcome = show;
            self.emit(BookEvent::WelcomeChanged(show));
        }
    }

    async fn persist(&mut self) {
        if let Err(e) = self.store.save_contacts(&self.contacts).await {
            tracing::warn!("Failed to save contacts: {}", e);
            self.emit(BookEvent::PersistenceWarning(e.to_string()));
        }
    }
}

/// Give any repeated identifier a fresh one, keeping the first occurrence
fn dedupe_ids(mut contacts: Vec<Contact>) -> Vec<Contact> {
    let mut seen = HashSet::with_capacity(contacts.len());
    for contact in &mut contacts {
        if !seen.insert(contact.id()) {
            let old = contact.id();
            contact.remint_id();
            tracing::warn!("Duplicate contact id {} reassigned to {}", old, contact.id());
            seen.insert(contact.id());
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactField;
    use tempfile::TempDir;

    async fn create_test_book() -> (ContactBook, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ContactStore::new(temp_dir.path().join("phonebook.json"));
        let settings_service = SettingsService::new(temp_dir.path().join("settings.json"));
        let book = ContactBook::open(store, settings_service, AppSettings::default()).await;
        (book, temp_dir)
    }

    async fn reopen(temp: &TempDir) -> ContactBook {
        let store = ContactStore::new(temp.path().join("phonebook.json"));
        let settings_service = SettingsService::new(temp.path().join("settings.json"));
        let settings = settings_service.load().await;
        ContactBook::open(store, settings_service, settings).await
    }

    async fn add(book: &mut ContactBook, first: &str, last: &str, phone: &str) -> Uuid {
        book.begin_add().unwrap();
        let buffer = book.edit_buffer_mut().unwrap();
        buffer.set_field(ContactField::FirstName, first);
        buffer.set_field(ContactField::LastName, last);
        buffer.set_field(ContactField::PhoneNumber, phone);
        book.save().await.unwrap()
    }

    #[tokio::test]
    async fn test_starts_empty_on_welcome() {
        let (mut book, _temp) = create_test_book().await;

        assert!(book.is_empty());
        assert!(book.show_welcome());
        assert!(!book.show_details());
        assert!(book.is_idle());
        assert!(book.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_add_appends_selects_and_persists() {
        let (mut book, temp) = create_test_book().await;

        let id = add(&mut book, "Anna", "Nowak", "600 100 200").await;

        assert_eq!(book.len(), 1);
        assert_eq!(book.selected_id(), Some(id));
        assert!(book.is_idle());
        assert_eq!(book.edit_buffer().map(Contact::id), Some(id));
        assert!(book.show_details());

        let reloaded = reopen(&temp).await;
        assert_eq!(reloaded.contacts(), book.contacts());
    }

    #[tokio::test]
    async fn test_add_mints_unique_ids() {
        let (mut book, _temp) = create_test_book().await;

        let a = add(&mut book, "Anna", "Nowak", "1").await;
        let b = add(&mut book, "Anna", "Nowak", "1").await;

        assert_ne!(a, b);
        assert_eq!(book.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_save_keeps_session() {
        let (mut book, _temp) = create_test_book().await;

        book.begin_add().unwrap();
        book.edit_buffer_mut().unwrap().first_name = "Anna".to_string();

        let err = book.save().await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has(ContactField::LastName));
        assert!(errors.has(ContactField::PhoneNumber));

        assert!(book.is_adding());
        assert!(book.is_empty());
        assert_eq!(book.edit_buffer().unwrap().first_name, "Anna");
    }

    #[tokio::test]
    async fn test_edit_updates_modified_only() {
        let (mut book, _temp) = create_test_book().await;
        let id = add(&mut book, "Jan", "Kowalski", "111").await;
        let before = book.get(id).unwrap().clone();

        book.begin_edit().unwrap();
        book.edit_buffer_mut().unwrap().phone_number = "222 333".to_string();

        // Nothing committed while the buffer is dirty
        assert_eq!(book.get(id).unwrap().phone_number, "111");

        let saved = book.save().await.unwrap();
        let after = book.get(id).unwrap();

        assert_eq!(saved, id);
        assert_eq!(after.phone_number, "222 333");
        assert_eq!(after.created_date, before.created_date);
        assert!(after.modified_date >= before.modified_date);
        assert_eq!(book.len(), 1);
        assert_eq!(book.selected_id(), Some(id));
    }

    #[tokio::test]
    async fn test_edit_keeps_position() {
        let (mut book, _temp) = create_test_book().await;
        add(&mut book, "A", "One", "1").await;
        let middle = add(&mut book, "B", "Two", "2").await;
        add(&mut book, "C", "Three", "3").await;

        book.select(Some(middle)).unwrap();
        book.begin_edit().unwrap();
        book.edit_buffer_mut().unwrap().last_name = "Deux".to_string();
        book.save().await.unwrap();

        let names: Vec<_> = book.contacts().iter().map(|c| c.last_name.as_str()).collect();
        assert_eq!(names, ["One", "Deux", "Three"]);
    }

    #[tokio::test]
    async fn test_cancel_restores_selection_clone() {
        let (mut book, _temp) = create_test_book().await;
        let id = add(&mut book, "Jan", "Kowalski", "111").await;

        book.begin_edit().unwrap();
        book.edit_buffer_mut().unwrap().first_name = "Janusz".to_string();
        book.cancel();

        assert!(book.is_idle());
        assert_eq!(book.edit_buffer().unwrap().first_name, "Jan");
        assert_eq!(book.get(id).unwrap().first_name, "Jan");
        assert!(book.edit_buffer_mut().is_none());
    }

    #[tokio::test]
    async fn test_cancel_add_without_selection_returns_to_welcome() {
        let (mut book, _temp) = create_test_book().await;

        book.begin_add().unwrap();
        assert!(!book.show_welcome());

        book.cancel();

        assert!(book.show_welcome());
        assert!(book.edit_buffer().is_none());
        assert!(book.is_empty());
    }

    #[tokio::test]
    async fn test_guards() {
        let (mut book, _temp) = create_test_book().await;

        assert!(matches!(book.begin_edit(), Err(AppError::InvalidState(_))));
        assert!(matches!(book.save().await, Err(AppError::InvalidState(_))));
        assert!(matches!(
            book.delete_selected(|_| true).await,
            Err(AppError::InvalidState(_))
        ));

        book.begin_add().unwrap();
        assert!(matches!(book.begin_add(), Err(AppError::InvalidState(_))));
        assert!(!book.can_edit());
    }

    #[tokio::test]
    async fn test_select_while_idle_refreshes_buffer() {
        let (mut book, _temp) = create_test_book().await;
        let a = add(&mut book, "Anna", "Nowak", "1").await;
        let b = add(&mut book, "Jan", "Kowalski", "2").await;
        assert_eq!(book.edit_buffer().unwrap().id(), b);

        book.select(Some(a)).unwrap();
        assert_eq!(book.edit_buffer().unwrap().id(), a);

        // While editing, the buffer stays put
        book.begin_edit().unwrap();
        book.select(Some(b)).unwrap();
        assert_eq!(book.edit_buffer().unwrap().id(), a);
    }

    #[tokio::test]
    async fn test_select_unknown_id() {
        let (mut book, _temp) = create_test_book().await;
        let id = Uuid::new_v4();

        assert!(matches!(
            book.select(Some(id)),
            Err(AppError::ContactNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (mut book, _temp) = create_test_book().await;
        let id = add(&mut book, "Anna", "Nowak", "1").await;

        let mut prompted = String::new();
        let deleted = book
            .delete_selected(|c| {
                prompted = c.to_string();
                false
            })
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(prompted, "Anna Nowak (1)");
        assert_eq!(book.selected_id(), Some(id));
        assert_eq!(book.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_last_contact_shows_welcome() {
        let (mut book, temp) = create_test_book().await;
        add(&mut book, "Anna", "Nowak", "1").await;
        book.drain_events();

        assert!(book.delete_selected(|_| true).await.unwrap());

        assert!(book.is_empty());
        assert!(book.selected().is_none());
        assert!(book.show_welcome());
        assert!(book.drain_events().contains(&BookEvent::WelcomeChanged(true)));
        assert!(reopen(&temp).await.is_empty());
    }

    #[tokio::test]
    async fn test_filter_does_not_touch_collection() {
        let (mut book, _temp) = create_test_book().await;
        add(&mut book, "Anna", "Nowak", "1").await;
        add(&mut book, "Jan", "Kowalski", "2").await;
        add(&mut book, "Hanna", "Lis", "3").await;
        book.drain_events();

        book.set_query("ANN");
        let visible: Vec<_> = book.visible().map(|c| c.first_name.as_str()).collect();
        assert_eq!(visible, ["Anna", "Hanna"]);
        assert_eq!(book.len(), 3);
        assert_eq!(book.drain_events(), vec![BookEvent::ViewChanged]);

        book.set_query("  ");
        assert_eq!(book.visible().count(), 3);
    }

    #[tokio::test]
    async fn test_filter_applies_to_new_contacts() {
        let (mut book, _temp) = create_test_book().await;
        book.set_query("zzz");
        add(&mut book, "Anna", "Nowak", "1").await;
        assert_eq!(book.visible().count(), 0);

        add(&mut book, "Zzzeus", "Olympus", "2").await;
        assert_eq!(book.visible().count(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_a_warning() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = ContactStore::new(blocker.join("phonebook.json"));
        let settings_service = SettingsService::new(blocker.join("settings.json"));
        let mut book = ContactBook::open(store, settings_service, AppSettings::default()).await;

        let id = add(&mut book, "Anna", "Nowak", "1").await;

        assert_eq!(book.get(id).map(|c| c.first_name.as_str()), Some("Anna"));
        assert!(book
            .drain_events()
            .iter()
            .any(|e| matches!(e, BookEvent::PersistenceWarning(_))));
    }

    #[tokio::test]
    async fn test_blank_optionals_stored_as_absent() {
        let (mut book, _temp) = create_test_book().await;

        book.begin_add().unwrap();
        let buffer = book.edit_buffer_mut().unwrap();
        buffer.first_name = "Anna".to_string();
        buffer.last_name = "Nowak".to_string();
        buffer.phone_number = "1".to_string();
        buffer.email = Some("  ".to_string());
        let id = book.save().await.unwrap();

        assert!(book.get(id).unwrap().email.is_none());
    }

    #[tokio::test]
    async fn test_theme_change_persists() {
        let (mut book, temp) = create_test_book().await;

        book.set_theme(Theme::Dark).await;
        book.set_theme(Theme::Dark).await;

        assert_eq!(
            book.drain_events(),
            vec![BookEvent::ThemeChanged(Theme::Dark)]
        );
        assert_eq!(reopen(&temp).await.theme(), Theme::Dark);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let original = Contact::new();
        let copy = original.clone();

        let contacts = dedupe_ids(vec![original.clone(), copy]);

        assert_eq!(contacts[0].id(), original.id());
        assert_ne!(contacts[1].id(), original.id());
    }
}
