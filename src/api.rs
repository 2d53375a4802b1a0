//! HTTP client for the account API

use crate::registration::{
    Category, ClientConfig, ClientError, PersonRecord, RegistrationInput, SessionToken,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{info, warn};

/// Calls the components make against the account API.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/auth/register` as multipart form data.
    async fn register(&self, input: &RegistrationInput) -> Result<(), ClientError>;

    /// `GET /api/auth/doctor` or `GET /api/auth/patient`.
    async fn list_records(&self, category: Category) -> Result<Vec<PersonRecord>, ClientError>;

    /// `DELETE /api/auth/delete` with a bearer token.
    async fn delete_account(&self, token: &SessionToken) -> Result<(), ClientError>;
}

// Failure payload sent by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!("Account API client ready for {}", config.api_base_url);
        Ok(Self { client, config })
    }

    fn registration_form(input: &RegistrationInput) -> Result<Form, ClientError> {
        let role = input.role.ok_or_else(|| {
            ClientError::ValidationError("Role is required".to_string())
        })?;

        let mut form = Form::new()
            .text("name", input.name.clone())
            .text("email", input.email.clone())
            .text("password", input.password.clone())
            .text("role", role.as_str());

        if let Some(picture) = &input.profile_picture {
            let part = Part::bytes(picture.bytes.clone())
                .file_name(picture.file_name.clone())
                .mime_str(picture.mime_type)?;
            form = form.part("profilePicture", part);
        }

        Ok(form)
    }
}

/// Turn a non-2xx response into an `ApiError`, keeping the server's `error` text.
async fn api_error(resp: Response) -> ClientError {
    let status = resp.status().as_u16();
    let message = match resp.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error),
        Err(e) => {
            warn!("Failed to read error body ({}): {}", status, e);
            None
        }
    };
    ClientError::ApiError { status, message }
}

fn role_label(input: &RegistrationInput) -> &'static str {
    input.role.map(|r| r.as_str()).unwrap_or("unknown")
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register(&self, input: &RegistrationInput) -> Result<(), ClientError> {
        let form = Self::registration_form(input)?;
        let url = self.config.endpoint("register");

        let resp = self.client.post(&url).multipart(form).send().await?;

        if resp.status().is_success() {
            info!("Registered a new {} account", role_label(input));
            Ok(())
        } else {
            Err(api_error(resp).await)
        }
    }

    async fn list_records(&self, category: Category) -> Result<Vec<PersonRecord>, ClientError> {
        let url = self.config.endpoint(category.endpoint());

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let records: Vec<PersonRecord> = resp.json().await?;
        info!("Fetched {} {}", records.len(), category);
        Ok(records)
    }

    async fn delete_account(&self, token: &SessionToken) -> Result<(), ClientError> {
        let url = self.config.endpoint("delete");

        let resp = self
            .client
            .delete(&url)
            .bearer_auth(token.expose())
            .send()
            .await?;

        if resp.status().is_success() {
            info!("Account deleted");
            Ok(())
        } else {
            Err(api_error(resp).await)
        }
    }
}
