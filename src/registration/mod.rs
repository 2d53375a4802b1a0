//! Account registration data, session storage and client configuration

pub mod auth;
pub mod config;
pub mod error;
pub mod image_storage;
pub mod user_info;

pub use auth::{FileTokenStore, MemoryTokenStore, Session, SessionToken, TokenStore};
pub use config::ClientConfig;
pub use error::ClientError;
pub use image_storage::ProfilePicture;
pub use user_info::{Category, PersonRecord, RegistrationInput, Role, Violation};
