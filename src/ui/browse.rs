//! Interactive listing driven by line commands
//! Fetches run as spawned tasks so switching tabs never waits on the network.

use crate::api::Backend;
use crate::registration::{Category, ClientError, PersonRecord, Session};
use crate::ui::profile_listing::{DeleteOutcome, FetchTicket, ProfileListing};
use crate::ui::{Notification, Shell};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const HELP: &str =
    "Commands: [d]octors, [p]atients, [r]efresh, [x] delete account, [h]elp, [q]uit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show(Category),
    Refresh,
    Delete,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_ascii_lowercase();
        match word.as_str() {
            "r" | "refresh" => Some(Command::Refresh),
            "x" | "delete" => Some(Command::Delete),
            "h" | "help" | "?" => Some(Command::Help),
            "q" | "quit" | "exit" => Some(Command::Quit),
            other => other.parse::<Category>().ok().map(Command::Show),
        }
    }
}

type Completion = (FetchTicket, Result<Vec<PersonRecord>, ClientError>);

fn spawn_fetch(
    backend: &Arc<dyn Backend>,
    ticket: FetchTicket,
    tx: &mpsc::UnboundedSender<Completion>,
) {
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = backend.list_records(ticket.category).await;
        if tx.send((ticket, result)).is_err() {
            debug!("Browser closed before {} fetch finished", ticket.category);
        }
    });
}

/// Run the listing until the input ends, the user quits, or the account is
/// deleted (or turns out not to be signed in). Returns the delete outcome
/// when that is what ended the session.
pub async fn run<R>(
    listing: &mut ProfileListing,
    backend: Arc<dyn Backend>,
    session: &Session,
    shell: &dyn Shell,
    input: R,
) -> Result<Option<DeleteOutcome>, ClientError>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = input.lines();
    let mut pending = 0usize;

    shell.render(HELP);
    spawn_fetch(&backend, listing.begin_fetch(), &tx);
    pending += 1;
    shell.render(&listing.render());

    loop {
        tokio::select! {
            Some((ticket, result)) = rx.recv() => {
                pending -= 1;
                if listing.complete_fetch(ticket, result) {
                    shell.render(&listing.render());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match Command::parse(&line) {
                    Some(Command::Show(category)) => {
                        if listing.select(category) {
                            spawn_fetch(&backend, listing.begin_fetch(), &tx);
                            pending += 1;
                            shell.render(&listing.render());
                        }
                    }
                    Some(Command::Refresh) => {
                        spawn_fetch(&backend, listing.begin_fetch(), &tx);
                        pending += 1;
                        shell.render(&listing.render());
                    }
                    Some(Command::Delete) => {
                        let outcome = listing.delete_account(backend.as_ref(), session, shell).await;
                        if outcome != DeleteOutcome::Failed {
                            return Ok(Some(outcome));
                        }
                    }
                    Some(Command::Help) => shell.render(HELP),
                    Some(Command::Quit) => return Ok(None),
                    None if line.trim().is_empty() => {}
                    None => {
                        shell.notify(Notification::error(format!(
                            "Unknown command '{}'",
                            line.trim()
                        )));
                    }
                }
            }
        }
    }

    info!("Input closed, waiting for {} outstanding fetch(es)", pending);
    while pending > 0 {
        let Some((ticket, result)) = rx.recv().await else {
            break;
        };
        pending -= 1;
        if listing.complete_fetch(ticket, result) {
            shell.render(&listing.render());
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{person, Call, FakeBackend, RecordingShell};
    use crate::ui::{Level, Route};

    fn backend() -> Arc<FakeBackend> {
        Arc::new(FakeBackend {
            doctors: Some(vec![person("d1", "Dr. Grey", "doctor")]),
            patients: Some(vec![person("p1", "Sam", "patient")]),
            ..FakeBackend::default()
        })
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(" P "), Some(Command::Show(Category::Patients)));
        assert_eq!(Command::parse("doctors"), Some(Command::Show(Category::Doctors)));
        assert_eq!(Command::parse("x"), Some(Command::Delete));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("launch"), None);
    }

    #[tokio::test]
    async fn test_switch_fetches_new_category_and_newest_wins() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::in_memory();
        let mut listing = ProfileListing::default();

        let outcome = run(&mut listing, backend.clone(), &session, &shell, &b"p\n"[..])
            .await
            .unwrap();

        assert_eq!(outcome, None);
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&Call::List(Category::Doctors)));
        assert!(calls.contains(&Call::List(Category::Patients)));

        assert_eq!(listing.category(), Category::Patients);
        assert_eq!(listing.records()[0].name, "Sam");
        assert!(shell.last_view().unwrap().starts_with("Patients List"));
    }

    #[tokio::test]
    async fn test_reselecting_current_tab_does_not_refetch() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::in_memory();
        let mut listing = ProfileListing::default();

        run(&mut listing, backend.clone(), &session, &shell, &b"d\ndoctors\n"[..])
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec![Call::List(Category::Doctors)]);
    }

    #[tokio::test]
    async fn test_delete_without_session_ends_at_login() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::in_memory();
        let mut listing = ProfileListing::default();

        let outcome = run(&mut listing, backend.clone(), &session, &shell, &b"x\np\n"[..])
            .await
            .unwrap();

        assert_eq!(outcome, Some(DeleteOutcome::NotLoggedIn));
        assert_eq!(shell.routes(), vec![Route::Login]);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Delete(_) | Call::List(Category::Patients))));
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported() {
        let backend = backend();
        let shell = RecordingShell::default();
        let session = Session::in_memory();
        let mut listing = ProfileListing::default();

        let outcome = run(&mut listing, backend, &session, &shell, &b"bogus\n\nq\n"[..])
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(
            shell.messages(),
            vec![(Level::Error, "Unknown command 'bogus'".to_string())]
        );
    }
}
