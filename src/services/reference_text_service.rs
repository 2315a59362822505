use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::ReferenceText,
};

#[async_trait]
pub trait ReferenceTextSource: Send + Sync {
    async fn fetch(&self, topic: &str, language: &str) -> AppResult<ReferenceText>;
}

/// Plain-text article extracts from the MediaWiki API.
pub struct WikipediaClient {
    client: Client,
    api_url_template: String,
}

impl WikipediaClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_url_template: config.wikipedia_api_url.clone(),
        }
    }

    fn api_url(&self, language: &str) -> String {
        self.api_url_template
            .replace("{language}", &language.trim().to_ascii_lowercase())
    }
}

/// Reads the first page's title and extract from an `action=query` response.
pub fn parse_extract_response(body: &Value, topic: &str, language: &str) -> AppResult<ReferenceText> {
    let page = body
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .ok_or_else(|| {
            AppError::ExternalServiceError("Unexpected response from Wikipedia".to_string())
        })?;

    if page.get("missing").is_some() {
        return Err(AppError::NotFound(format!(
            "No article found for topic '{}'",
            topic
        )));
    }

    let extract = page
        .get("extract")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if extract.is_empty() {
        return Err(AppError::NotFound(format!(
            "Article for topic '{}' has no text",
            topic
        )));
    }

    let title = page.get("title").and_then(Value::as_str).unwrap_or(topic);
    Ok(ReferenceText::new(title, extract.to_string(), language))
}

#[async_trait]
impl ReferenceTextSource for WikipediaClient {
    async fn fetch(&self, topic: &str, language: &str) -> AppResult<ReferenceText> {
        let url = self.api_url(language);
        log::info!("Fetching reference text for '{}' ({})", topic, language);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", topic),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Wikipedia returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let text = parse_extract_response(&body, topic, language)?;
        log::info!("Fetched '{}' with {} chars", text.title, text.length);
        Ok(text)
    }
}
