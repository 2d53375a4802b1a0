//! Registration input and the person records served by the API

use crate::registration::image_storage::ProfilePicture;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role '{}' (expected patient or doctor)", other)),
        }
    }
}

/// Which record type the listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Doctors,
    Patients,
}

impl Category {
    /// Path segment under `/api/auth/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Doctors => "doctor",
            Category::Patients => "patient",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Doctors => "Doctors",
            Category::Patients => "Patients",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Doctors => write!(f, "doctors"),
            Category::Patients => write!(f, "patients"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctors" | "doctor" | "d" => Ok(Category::Doctors),
            "patients" | "patient" | "p" => Ok(Category::Patients),
            other => Err(format!("unknown category '{}' (expected doctors or patients)", other)),
        }
    }
}

/// A required field left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    MissingName,
    MissingEmail,
    MissingPassword,
    MissingRole,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = match self {
            Violation::MissingName => "Name",
            Violation::MissingEmail => "Email",
            Violation::MissingPassword => "Password",
            Violation::MissingRole => "Role",
        };
        write!(f, "{} is required", field)
    }
}

/// Form state for a new account. Lives only until it is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub profile_picture: Option<ProfilePicture>,
    /// Display toggle for the password field, never sent.
    pub show_password: bool,
}

impl RegistrationInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn with_picture(mut self, picture: ProfilePicture) -> Self {
        self.profile_picture = Some(picture);
        self
    }

    /// Every required field that is empty, in form order.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(Violation::MissingName);
        }
        if self.email.trim().is_empty() {
            violations.push(Violation::MissingEmail);
        }
        if self.password.is_empty() {
            violations.push(Violation::MissingPassword);
        }
        if self.role.is_none() {
            violations.push(Violation::MissingRole);
        }
        violations
    }
}

/// A doctor or patient profile as returned by the listing endpoints.
///
/// `role` stays a plain string: the server owns the set of roles and the
/// listing only displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "profilePicture", default)]
    pub profile_picture: Option<String>,
}
