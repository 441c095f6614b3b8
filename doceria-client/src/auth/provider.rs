use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AuthError, Identity};
use crate::config::AuthConfig;

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity Toolkit style REST provider
/// (`accounts:signInWithPassword`, `accounts:signUp`)
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(client: Client, config: &AuthConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn post_credentials(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let url = format!("{}/{}", self.api_url, endpoint);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&CredentialsRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => AuthError::from_code(&envelope.error.message),
                Err(_) => AuthError::Rejected(format!("status {}", status.as_u16())),
            });
        }

        serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.post_credentials("accounts:signInWithPassword", email, password)
            .await
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.post_credentials("accounts:signUp", email, password).await
    }

    /// Tokens are bearer-only; dropping them ends the session
    async fn sign_out(&self, _identity: &Identity) -> Result<(), AuthError> {
        Ok(())
    }
}
