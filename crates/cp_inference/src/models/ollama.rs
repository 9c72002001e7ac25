use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use cp_core::{Error, Result};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use super::TextGenerator;
use crate::stream::{collect_response, ndjson_chunks};
use crate::{Config, SamplingOptions};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a SamplingOptions,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Streaming client for a local Ollama server.
pub struct OllamaGenerator {
    client: Client,
    base_url: Url,
    timeout: Duration,
    options: SamplingOptions,
}

impl fmt::Debug for OllamaGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaGenerator")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn backend_error(e: reqwest::Error) -> Error {
    if e.is_connect() {
        Error::Generation(format!("Model backend unreachable: {}", e))
    } else {
        Error::Generation(format!("Model backend request failed: {}", e))
    }
}

impl OllamaGenerator {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            client: Client::new(),
            base_url,
            timeout: config.timeout,
            options: config.options.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn stream_generate(&self, prompt: &str, model: &str) -> Result<String> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: true,
            options: &self.options,
        };

        let response = self
            .client
            .post(self.endpoint("api/generate")?)
            .header(ACCEPT, "application/x-ndjson")
            .json(&request)
            .send()
            .await
            .map_err(backend_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Generation(format!("API returned status code {}", status.as_u16())));
        }

        let bytes = Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(backend_error)));
        collect_response(ndjson_chunks(bytes)).await
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String> {
        debug!(model, prompt_chars = prompt.chars().count(), "Requesting generation");
        match tokio::time::timeout(self.timeout, self.stream_generate(prompt, model)).await {
            Ok(result) => result,
            Err(_) => {
                error!(model, timeout = ?self.timeout, "Request timed out while generating response");
                Err(Error::Timeout(self.timeout))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.endpoint("api/tags")?)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(backend_error)?
            .error_for_status()
            .map_err(backend_error)?;
        let tags: TagsResponse = response.json().await.map_err(backend_error)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}
