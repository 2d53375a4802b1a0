//! Terminal front end: notifications, navigation and the two screens

pub mod browse;
pub mod profile_listing;
pub mod register_form;

pub use profile_listing::{DeleteOutcome, FetchTicket, Phase, ProfileListing};
pub use register_form::{RegistrationForm, SubmitOutcome};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Profiles,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Profiles => "/profiles",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A transient message shown to the user (toast or alert).
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }
}

/// Where screens send everything the user should see.
pub trait Shell: Send + Sync {
    fn notify(&self, notification: Notification);
    fn navigate(&self, route: Route);
    fn render(&self, view: &str);
}

/// Prints everything to stdout.
pub struct ConsoleShell;

impl Shell for ConsoleShell {
    fn notify(&self, notification: Notification) {
        let icon = match notification.level {
            Level::Info => "ℹ️ ",
            Level::Success => "✅",
            Level::Error => "❌",
        };
        println!(
            "{} [{}] {}",
            icon,
            notification.at.format("%H:%M:%S"),
            notification.message
        );
    }

    fn navigate(&self, route: Route) {
        println!("➡️  {}", route);
    }

    fn render(&self, view: &str) {
        println!("{}", view);
    }
}
