//! HTTP client for the dashboard REST backend

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{PasswordUpdate, Role, RoleUpdate, UserAccount, UserCreate};
use shared::{Collection, RecordId};

use crate::gateway::DataGateway;
use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making requests to the REST backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request; non-success statuses are logged and become `RequestFailed`
    async fn send(&self, target: &str, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                resource = %target,
                status = status.as_u16(),
                body = %body,
                "API request failed"
            );
            return Err(ClientError::request_failed(target, status.as_u16()));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        target: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(target, request).await?;
        response.json().await.map_err(Into::into)
    }

    /// GET a path expected to return a JSON array
    async fn get_sequence(&self, target: &str) -> ClientResult<Vec<Value>> {
        let response = self.send(target, self.request(Method::GET, target)).await?;
        let text = response.text().await?;

        match parse_sequence(target, &text) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(error = %e, "Expected a JSON array, using an empty collection");
                Ok(Vec::new())
            }
        }
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        target: &str,
        body: &B,
    ) -> ClientResult<Value> {
        let response = self
            .send(target, self.request(method, target).json(body))
            .await?;
        read_optional_json(response).await
    }

    // ========== Users API ==========

    /// GET /users
    pub async fn list_users(&self) -> ClientResult<Vec<UserAccount>> {
        let raw = self.get_sequence("users").await?;
        Ok(raw
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    /// GET /users/{id}
    pub async fn get_user(&self, id: &str) -> ClientResult<UserAccount> {
        let target = format!("users/{id}");
        self.send_json(&target, self.request(Method::GET, &target))
            .await
    }

    /// POST /users
    pub async fn create_user(&self, user: &UserCreate) -> ClientResult<UserAccount> {
        let created = self.write(Method::POST, "users", user).await?;
        Ok(serde_json::from_value(created)?)
    }

    /// PUT /users/{id}/role
    pub async fn set_user_role(&self, id: &str, role: Role) -> ClientResult<()> {
        self.write(Method::PUT, &format!("users/{id}/role"), &RoleUpdate { role })
            .await
            .map(|_| ())
    }

    /// PUT /users/{id}/password
    pub async fn set_user_password(&self, id: &str, password: &str) -> ClientResult<()> {
        let body = PasswordUpdate {
            password: password.to_string(),
        };
        self.write(Method::PUT, &format!("users/{id}/password"), &body)
            .await
            .map(|_| ())
    }

    /// DELETE /users/{id}
    pub async fn delete_user(&self, id: &str) -> ClientResult<()> {
        let target = format!("users/{id}");
        self.send(&target, self.request(Method::DELETE, &target))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl DataGateway for HttpClient {
    async fn fetch_collection(&self, collection: Collection) -> ClientResult<Vec<Value>> {
        self.get_sequence(collection.path()).await
    }

    async fn create_record(&self, collection: Collection, payload: Value) -> ClientResult<Value> {
        self.write(Method::POST, collection.path(), &payload).await
    }

    async fn update_record(
        &self,
        collection: Collection,
        id: &RecordId,
        payload: Value,
    ) -> ClientResult<Value> {
        let target = format!("{}/{}", collection.path(), id);
        self.write(Method::PUT, &target, &payload).await
    }

    async fn delete_record(&self, collection: Collection, id: &RecordId) -> ClientResult<()> {
        let target = format!("{}/{}", collection.path(), id);
        self.send(&target, self.request(Method::DELETE, &target))
            .await
            .map(|_| ())
    }
}

/// Parse a body that must be a JSON array
pub(crate) fn parse_sequence(target: &str, body: &str) -> ClientResult<Vec<Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Ok(items),
        _ => Err(ClientError::MalformedResponse(target.to_string())),
    }
}

/// Mutation responses may be empty (204) or JSON
async fn read_optional_json(response: Response) -> ClientResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence_rejects_non_arrays() {
        assert_eq!(parse_sequence("pedidos", "[1, 2]").unwrap().len(), 2);
        assert!(matches!(
            parse_sequence("pedidos", r#"{"error": "boom"}"#),
            Err(ClientError::MalformedResponse(t)) if t == "pedidos"
        ));
        assert!(parse_sequence("pedidos", "<html>").is_err());
        assert!(parse_sequence("pedidos", "").is_err());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:3000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert!(client.token().is_none());
        let client = client.with_token("abc");
        assert_eq!(client.token(), Some("abc"));
    }
}
