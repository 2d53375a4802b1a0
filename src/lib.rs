//! Terminal client for the clinic account API: registration, the
//! doctor/patient directory and account deletion.

pub mod api;
pub mod registration;
pub mod ui;

pub use api::{Backend, HttpBackend};
pub use registration::{ClientConfig, ClientError};
