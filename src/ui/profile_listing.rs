//! Doctor/patient listing screen with account deletion
//!
//! Every fetch takes a ticket from a monotonically increasing counter. Only
//! the completion holding the newest ticket is applied, so a slow response
//! for a tab the user already left cannot overwrite the current one.

use crate::api::Backend;
use crate::registration::{Category, ClientError, PersonRecord, Session};
use crate::ui::{Notification, Route, Shell};
use std::fmt::Write as _;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotLoggedIn,
    Deleted,
    Failed,
}

#[derive(Debug, Default)]
pub struct ProfileListing {
    category: Category,
    records: Vec<PersonRecord>,
    phase: Phase,
    latest: u64,
}

impl ProfileListing {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Switch tabs. Returns `false` when the tab was already selected, in
    /// which case no refetch is due.
    pub fn select(&mut self, category: Category) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        true
    }

    /// Enter the loading phase and hand out the ticket for the new request.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest += 1;
        self.phase = Phase::Loading;
        FetchTicket {
            seq: self.latest,
            category: self.category,
        }
    }

    /// Apply a fetch result. Returns `false` if the ticket is stale and the
    /// result was dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<PersonRecord>, ClientError>,
    ) -> bool {
        if ticket.seq != self.latest {
            debug!(
                "Dropping stale {} response (ticket {}, latest {})",
                ticket.category, ticket.seq, self.latest
            );
            return false;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.phase = Phase::Loaded;
            }
            Err(e) => {
                warn!("Error fetching {}: {}", ticket.category, e);
                // records from the last good fetch stay as they were
                self.phase = Phase::Failed(format!("Failed to load {}.", ticket.category));
            }
        }
        true
    }

    /// Fetch the selected category and wait for it.
    pub async fn refresh(&mut self, backend: &dyn Backend) -> bool {
        let ticket = self.begin_fetch();
        let result = backend.list_records(ticket.category).await;
        self.complete_fetch(ticket, result)
    }

    pub fn render(&self) -> String {
        match &self.phase {
            Phase::Loading => return "Loading...".to_string(),
            Phase::Failed(message) => return message.clone(),
            Phase::Idle | Phase::Loaded => {}
        }

        let mut out = format!("{} List\n", self.category.label());
        if self.records.is_empty() {
            let _ = write!(out, "No {} found.", self.category);
            return out;
        }

        for record in &self.records {
            let _ = writeln!(out, "\n{}", record.name);
            if let Some(picture) = &record.profile_picture {
                let _ = writeln!(out, "  Picture: {}", picture);
            }
            let _ = writeln!(out, "  Email: {}", record.email);
            let _ = writeln!(out, "  Role: {}", record.role);
        }
        out.trim_end().to_string()
    }

    /// Delete the signed-in account. Without a token nothing is sent and the
    /// user is sent to login.
    pub async fn delete_account(
        &self,
        backend: &dyn Backend,
        session: &Session,
        shell: &dyn Shell,
    ) -> DeleteOutcome {
        let token = match session.token() {
            Ok(Some(token)) => token,
            other => {
                if let Err(e) = other {
                    warn!("Could not read session: {}", e);
                }
                shell.notify(Notification::error("You are not logged in."));
                shell.navigate(Route::Login);
                return DeleteOutcome::NotLoggedIn;
            }
        };

        match backend.delete_account(&token).await {
            Ok(()) => {
                shell.notify(Notification::info("Account deleted successfully"));
                if let Err(e) = session.sign_out() {
                    warn!("Account deleted but the session could not be cleared: {}", e);
                }
                info!("Account deleted, session cleared");
                shell.navigate(Route::Register);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!("Deletion failed: {}", e);
                shell.notify(Notification::error("Failed to delete account"));
                DeleteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{MemoryTokenStore, SessionToken};
    use crate::ui::testing::{person, Call, FakeBackend, RecordingShell};
    use crate::ui::Level;

    fn backend() -> FakeBackend {
        FakeBackend {
            doctors: Some(vec![person("d1", "Dr. Grey", "doctor")]),
            patients: Some(vec![
                person("p1", "Sam", "patient"),
                person("p2", "Kim", "patient"),
            ]),
            ..FakeBackend::default()
        }
    }

    #[tokio::test]
    async fn test_each_switch_fetches_once_for_new_category() {
        let backend = backend();
        let mut listing = ProfileListing::default();

        listing.refresh(&backend).await;
        for category in [Category::Patients, Category::Patients, Category::Doctors] {
            if listing.select(category) {
                listing.refresh(&backend).await;
            }
        }

        assert_eq!(
            backend.calls(),
            vec![
                Call::List(Category::Doctors),
                Call::List(Category::Patients),
                Call::List(Category::Doctors),
            ]
        );
        assert_eq!(listing.phase(), &Phase::Loaded);
        assert_eq!(listing.records()[0].name, "Dr. Grey");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_records_and_shows_error() {
        let mut backend = backend();
        backend.patients = None;
        let mut listing = ProfileListing::default();

        listing.refresh(&backend).await;
        let before = listing.records().to_vec();

        listing.select(Category::Patients);
        listing.refresh(&backend).await;

        assert_eq!(listing.records(), before.as_slice());
        assert_eq!(listing.phase(), &Phase::Failed("Failed to load patients.".to_string()));
        assert_eq!(listing.render(), "Failed to load patients.");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut listing = ProfileListing::default();

        let slow_doctors = listing.begin_fetch();
        listing.select(Category::Patients);
        let patients = listing.begin_fetch();

        assert!(listing.complete_fetch(patients, Ok(vec![person("p1", "Sam", "patient")])));
        assert!(!listing.complete_fetch(slow_doctors, Ok(vec![person("d1", "Dr. Grey", "doctor")])));
        assert!(!listing.complete_fetch(slow_doctors, Err(ClientError::ApiError { status: 500, message: None })));

        assert_eq!(listing.records().len(), 1);
        assert_eq!(listing.records()[0].name, "Sam");
        assert_eq!(listing.phase(), &Phase::Loaded);
    }

    #[test]
    fn test_render_states() {
        let mut listing = ProfileListing::new(Category::Patients);

        let ticket = listing.begin_fetch();
        assert_eq!(listing.render(), "Loading...");

        listing.complete_fetch(ticket, Ok(vec![]));
        assert_eq!(listing.render(), "Patients List\nNo patients found.");

        let ticket = listing.begin_fetch();
        listing.complete_fetch(ticket, Ok(vec![person("p1", "Sam", "patient")]));
        assert_eq!(
            listing.render(),
            "Patients List\n\nSam\n  Picture: http://localhost:4600/uploads/p1.png\n  Email: p1@example.org\n  Role: patient"
        );
    }

    #[tokio::test]
    async fn test_delete_without_token_goes_to_login_without_request() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::in_memory();
        let listing = ProfileListing::default();

        let outcome = listing.delete_account(&backend, &session, &shell).await;

        assert_eq!(outcome, DeleteOutcome::NotLoggedIn);
        assert!(backend.calls().is_empty());
        assert_eq!(shell.routes(), vec![Route::Login]);
        assert_eq!(
            shell.messages(),
            vec![(Level::Error, "You are not logged in.".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_with_token_clears_session_and_goes_to_register() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::new(MemoryTokenStore::with_token(
            SessionToken::new("jwt-1").unwrap(),
        ));
        let listing = ProfileListing::default();

        let outcome = listing.delete_account(&backend, &session, &shell).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(backend.calls(), vec![Call::Delete("jwt-1".to_string())]);
        assert!(!session.is_signed_in());
        assert_eq!(shell.routes(), vec![Route::Register]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_token_and_stays() {
        let backend = FakeBackend {
            delete_fails: true,
            ..backend()
        };
        let shell = RecordingShell::default();
        let session = Session::new(MemoryTokenStore::with_token(
            SessionToken::new("jwt-1").unwrap(),
        ));
        let listing = ProfileListing::default();

        let outcome = listing.delete_account(&backend, &session, &shell).await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert!(session.is_signed_in());
        assert!(shell.routes().is_empty());
        assert_eq!(
            shell.messages(),
            vec![(Level::Error, "Failed to delete account".to_string())]
        );
    }
}
