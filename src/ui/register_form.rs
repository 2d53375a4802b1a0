//! Registration screen

use crate::api::Backend;
use crate::registration::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::registration::{
    ClientConfig, ClientError, ProfilePicture, RegistrationInput, Role, Violation,
};
use crate::ui::{Notification, Route, Shell};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const GENERIC_FAILURE: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked locally, nothing was sent
    Rejected(Vec<Violation>),
    Registered,
    /// The message shown to the user
    Failed(String),
}

pub struct RegistrationForm {
    input: RegistrationInput,
    busy: bool,
    max_upload_bytes: u64,
    redirect_delay: Duration,
}

impl RegistrationForm {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            input: RegistrationInput::default(),
            busy: false,
            max_upload_bytes: config.max_upload_bytes.min(DEFAULT_MAX_UPLOAD_BYTES),
            redirect_delay: config.redirect_delay(),
        }
    }

    pub fn input(&self) -> &RegistrationInput {
        &self.input
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.input.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.input.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.input.password = password.into();
    }

    pub fn set_role(&mut self, role: Option<Role>) {
        self.input.role = role;
    }

    pub fn toggle_password_visibility(&mut self) {
        self.input.show_password = !self.input.show_password;
    }

    /// The password as the field shows it.
    pub fn password_display(&self) -> String {
        if self.input.show_password {
            self.input.password.clone()
        } else {
            "•".repeat(self.input.password.chars().count())
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            "Registering..."
        } else {
            "Register"
        }
    }

    fn size_limit_message(&self) -> String {
        const MIB: u64 = 1024 * 1024;
        if self.max_upload_bytes % MIB == 0 {
            format!("File size should not exceed {}MB.", self.max_upload_bytes / MIB)
        } else {
            let megabytes = self.max_upload_bytes as f64 / MIB as f64;
            format!("File size should not exceed {:.2}MB.", megabytes)
        }
    }

    /// Attach picture bytes. Oversized files are refused and the form keeps
    /// whatever it had before.
    pub fn attach_picture(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        shell: &dyn Shell,
    ) -> bool {
        let picture = ProfilePicture::from_bytes(file_name, bytes, self.max_upload_bytes);
        self.accept_picture(picture, shell)
    }

    pub async fn attach_picture_path(&mut self, path: impl AsRef<Path>, shell: &dyn Shell) -> bool {
        let path = path.as_ref();
        match ProfilePicture::load(path, self.max_upload_bytes).await {
            Err(ClientError::IoError(e)) => {
                warn!("Could not read picture {}: {}", path.display(), e);
                shell.notify(Notification::error(format!(
                    "Could not read {}: {}",
                    path.display(),
                    e
                )));
                false
            }
            other => self.accept_picture(other, shell),
        }
    }

    fn accept_picture(
        &mut self,
        picture: Result<ProfilePicture, ClientError>,
        shell: &dyn Shell,
    ) -> bool {
        match picture {
            Ok(picture) => {
                self.input.profile_picture = Some(picture);
                true
            }
            Err(e) => {
                warn!("Rejected profile picture: {}", e);
                shell.notify(Notification::error(self.size_limit_message()));
                false
            }
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        self.input.validate()
    }

    /// Validate, send one registration request and redirect to login on success.
    pub async fn submit(&mut self, backend: &dyn Backend, shell: &dyn Shell) -> SubmitOutcome {
        let violations = self.validate();
        if !violations.is_empty() {
            shell.notify(Notification::error("Please fill all required fields."));
            return SubmitOutcome::Rejected(violations);
        }

        self.busy = true;
        shell.render(self.submit_label());
        let result = backend.register(&self.input).await;
        self.busy = false;
        shell.render(self.submit_label());

        match result {
            Ok(()) => {
                info!("Registration accepted");
                shell.notify(Notification::success("Registration Successful!"));
                self.input = RegistrationInput::default();

                tokio::time::sleep(self.redirect_delay).await;
                shell.navigate(Route::Login);
                SubmitOutcome::Registered
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                let message = e.server_message().unwrap_or(GENERIC_FAILURE).to_string();
                shell.notify(Notification::error(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}
