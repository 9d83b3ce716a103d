use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

mod error;

pub use error::LlmError;

use crate::shell::ShellKind;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;

const GENERATE_INSTRUCTIONS: &str = "\
You are an expert command-line assistant helping developers find the right commands for their development tasks.

When a user asks for a command:
1. Provide the most appropriate command for their operating system/shell
2. Be concise, just the command only, no additional details.
3. For example : mv source_folder/ destination_folder/
4. For example : rm -rf folder_name/

Always respond with only the command - no extra commentary.";

const EXPLAIN_INSTRUCTIONS: &str = "\
You are an expert command-line assistant helping developers find the right commands for their development tasks.

When explaining a command:
1. Break down what each part does
2. Explain important flags
3. Provide context about when to use it

Only the explanation with respect to the command - no extra commentary.";

/// Per-client overrides. The defaults are fixed constants; callers cannot
/// vary them per request.
#[derive(Debug, Clone, Default)]
pub struct LlmOptions {
    /// Base URL override, used by tests to point at a local mock server.
    pub api_url: Option<String>,
    pub max_output_tokens: Option<u32>,
}

/// Client for the OpenAI Responses API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    model: String,
    shell: ShellKind,
    api_url: String,
    max_output_tokens: u32,
}

impl LlmClient {
    /// Builds the HTTP client and probes the service once, so a rejected key
    /// or an unreachable endpoint fails at construction time.
    pub async fn connect(
        api_key: &str,
        model: &str,
        shell: ShellKind,
        options: LlmOptions,
    ) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| LlmError::Initialization(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Initialization(e.to_string()))?;

        let client = Self {
            http,
            model: model.to_string(),
            shell,
            api_url: options
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            max_output_tokens: options.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        };

        client.probe().await?;
        Ok(client)
    }

    async fn probe(&self) -> Result<(), LlmError> {
        let url = format!("{}/models/{}", self.api_url, self.model);
        let response = self.http.get(&url).send().await.map_err(|e| {
            LlmError::Connectivity(format!("Failed to connect to OpenAI API: {}", e))
        })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(LlmError::Authentication(
                "Invalid OpenAI API key. Please check your configuration.".to_string(),
            )),
            status => Err(LlmError::Initialization(format!(
                "Connectivity probe failed with status {}",
                status
            ))),
        }
    }

    /// Turns a natural-language query into a single shell command.
    pub async fn generate_command(&self, query: &str) -> Result<String, LlmError> {
        let user_message = format!(
            "For {}, provide a command to: {}",
            self.shell.description(),
            query
        );
        self.complete(GENERATE_INSTRUCTIONS, &user_message).await
    }

    /// Explains a literal command string in prose.
    pub async fn explain_command(&self, command: &str) -> Result<String, LlmError> {
        let user_message = format!("Explain this command in detail: {}", command);
        self.complete(EXPLAIN_INSTRUCTIONS, &user_message).await
    }

    async fn complete(&self, instructions: &str, user_message: &str) -> Result<String, LlmError> {
        let url = format!("{}/responses", self.api_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "model": &self.model,
                "input": [
                    { "role": "developer", "content": instructions },
                    { "role": "user", "content": user_message }
                ],
                "max_output_tokens": self.max_output_tokens,
                "text": { "format": { "type": "text" } },
                "store": false
            }))
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "completion response");

        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(LlmError::Authentication(
                    "OpenAI API authentication failed. Check your API key.".to_string(),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LlmError::RateLimit("Rate limit exceeded".to_string()));
            }
            s => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(LlmError::RemoteService {
                    status: s.as_u16(),
                    message,
                });
            }
        }

        let body: ResponsesBody = response
            .json()
            .await
            .map_err(|e| LlmError::Unknown(format!("Failed to parse completion response: {}", e)))?;

        extract_output_text(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Concatenates the `output_text` parts of the `message` items, trimmed of
/// surrounding whitespace.
fn extract_output_text(body: &ResponsesBody) -> Result<String, LlmError> {
    let mut text = String::new();
    for item in body.output.iter().filter(|item| item.kind == "message") {
        for part in item.content.iter().filter(|part| part.kind == "output_text") {
            text.push_str(&part.text);
        }
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::Unknown(
            "Empty response from the completion service".to_string(),
        ));
    }
    Ok(text.to_string())
}
