//! Marketing copy generation
//!
//! Birthday messages for customers and descriptions for products, produced
//! by a `generateContent` text model. Failures never surface as errors to
//! the operator; they degrade to fixed fallback texts.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::models::{Customer, ProductDraft};
use thiserror::Error;

use crate::config::GeneratorConfig;

/// Shown when the model returned no candidate text
pub const NO_CONTENT_TEXT: &str = "Não foi possível gerar o conteúdo.";
/// Shown when the request itself failed
pub const REQUEST_FAILED_TEXT: &str = "Ocorreu um erro ao tentar gerar o conteúdo.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Product name and category are required")]
    MissingProductFields,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Text model seam
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// `Ok(None)` when the model answered without any candidate text
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError>;
}

// ========== Wire types ==========

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini `models/{model}:generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeneratorConfig,
}

impl GeminiClient {
    pub fn new(client: Client, config: GeneratorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.config.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        Ok(parsed.first_text())
    }
}

/// Prompt builder over a [`TextGenerator`]
pub struct Copywriter<T> {
    generator: T,
}

impl<T: TextGenerator> Copywriter<T> {
    pub fn new(generator: T) -> Self {
        Self { generator }
    }

    pub async fn birthday_message(&self, customer: &Customer) -> String {
        self.generate_or_fallback(&birthday_prompt(customer)).await
    }

    /// Requires the draft's name and category
    pub async fn product_description(&self, draft: &ProductDraft) -> Result<String, GenerationError> {
        let prompt = product_prompt(draft)?;
        Ok(self.generate_or_fallback(&prompt).await)
    }

    async fn generate_or_fallback(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => NO_CONTENT_TEXT.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Text generation failed");
                REQUEST_FAILED_TEXT.to_string()
            }
        }
    }
}

fn birthday_prompt(customer: &Customer) -> String {
    format!(
        "Crie uma mensagem de aniversário curta e amigável para um cliente chamado {}. \
         O cliente tem o status \"{}\" na nossa doceria. \
         A mensagem deve ser calorosa e convidativa.",
        customer.name,
        customer.status.label()
    )
}

fn product_prompt(draft: &ProductDraft) -> Result<String, GenerationError> {
    let name = draft.name.trim();
    let category = draft.category.trim();
    if name.is_empty() || category.is_empty() {
        return Err(GenerationError::MissingProductFields);
    }
    Ok(format!(
        "Crie uma descrição de produto curta e atraente para um(a) \"{name}\" \
         da categoria \"{category}\" de uma doceria. \
         A descrição deve ser apetitosa e destacar a qualidade."
    ))
}
