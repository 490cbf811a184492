use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::repository::CredentialNotifier;
use crate::config::NotifierConfig;

/// Errors raised while talking to the credential mail endpoint.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notifier HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("notifier returned status {status}: {body}")]
    Service { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
struct SendCredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendCredentialsResponse {
    #[serde(default)]
    success: bool,
}

/// Posts `{ email, password }` to the mail backend and reads back `{ success }`.
#[derive(Clone)]
pub struct HttpCredentialNotifier {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCredentialNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent("mentor-desk/0.1")
            .build()
            .map_err(NotifierError::Http)?;

        Ok(Self {
            http: client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn deliver(&self, email: &str, credential: &str) -> Result<bool, NotifierError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SendCredentialsRequest {
                email,
                password: credential,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::Service { status, body });
        }

        let payload: SendCredentialsResponse = response.json().await?;
        Ok(payload.success)
    }
}

#[async_trait]
impl CredentialNotifier for HttpCredentialNotifier {
    async fn send(&self, email: &str, credential: &str) -> bool {
        match self.deliver(email, credential).await {
            Ok(delivered) => delivered,
            Err(err) => {
                warn!(email, endpoint = %self.endpoint, error = %err, "credential email failed");
                false
            }
        }
    }
}
