use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, Role, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAIFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionRequest<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAITool<'a> {
    r#type: &'a str,
    function: OpenAIToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

/// Any server speaking the OpenAI `/chat/completions` protocol with
/// function tools: OpenAI itself, OpenRouter, Ollama.
pub struct OpenAIProvider {
    client: reqwest::Client,
    name: String,
    api_key: Option<String>,
    model: String,
    base_url: String,
    extra_headers: Vec<(String, String)>,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::build("openai", Some(api_key.into()), "gpt-4o", "https://api.openai.com/v1")
    }

    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::build(
            "openrouter",
            Some(api_key.into()),
            "openai/gpt-4o",
            "https://openrouter.ai/api/v1",
        )
        .with_header("HTTP-Referer", "https://context7.com")
        .with_header("X-Title", "ctx7")
    }

    pub fn ollama() -> Self {
        Self::build("ollama", None, "llama3.1", "http://localhost:11434/v1")
    }

    fn build(name: &str, api_key: Option<String>, model: &str, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            name: name.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url: base_url.to_string(),
            extra_headers: vec![],
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn convert_messages<'a>(&self, messages: &'a [ChatMessage]) -> Vec<OpenAIMessage<'a>> {
        messages
            .iter()
            .map(|m| {
                let tool_calls = m.tool_calls.as_ref().map(|tool_calls| {
                    tool_calls
                        .iter()
                        .map(|tc| OpenAIToolCallRequest {
                            id: &tc.id,
                            r#type: "function",
                            function: OpenAIFunctionRequest {
                                name: &tc.name,
                                arguments: &tc.arguments,
                            },
                        })
                        .collect()
                });

                let content = if m.role == Role::Assistant
                    && tool_calls.is_some()
                    && m.content.is_empty()
                {
                    None
                } else {
                    Some(m.content.as_str())
                };

                OpenAIMessage {
                    role: m.role.as_str(),
                    content,
                    tool_calls,
                    tool_call_id: m.tool_call_id.as_deref(),
                }
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolSpec]) -> Vec<OpenAITool<'_>> {
        tools
            .iter()
            .map(|t| OpenAITool {
                r#type: "function",
                function: OpenAIToolFunction {
                    name: &t.name,
                    description: &t.description,
                    parameters: &t.parameters_schema,
                },
            })
            .collect()
    }

    fn parse_response(response: OpenAIResponse) -> anyhow::Result<ChatResponse> {
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| anyhow::anyhow!("No choices in response"))?;

        let tool_calls: Vec<ToolCall> = message
            .tool_calls
            .map(|calls| {
                calls
                    .into_iter()
                    .map(|c| ToolCall {
                        id: c.id,
                        name: c.function.name,
                        arguments: c.function.arguments,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let text = match message.content {
            Some(c) if !c.trim().is_empty() => Some(c),
            _ => message.reasoning_content.filter(|c| !c.trim().is_empty()),
        };

        if text.is_none() && tool_calls.is_empty() {
            return Err(anyhow::anyhow!(
                "Empty response from API: no content or tool calls"
            ));
        }

        Ok(ChatResponse { text, tool_calls })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let model = request.model.unwrap_or(self.model.as_str());
        let openai_request = OpenAIRequest {
            model,
            messages: self.convert_messages(request.messages),
            tools: request.tools.map(Self::convert_tools),
            temperature: request.temperature,
        };

        debug!(provider = %self.name, model, messages = request.messages.len(), "chat request");
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&openai_request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }
        for (name, value) in &self.extra_headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "{} API error {}: {}",
                self.name,
                status,
                error_text
            ));
        }

        let openai_response: OpenAIResponse = response.json().await?;
        Self::parse_response(openai_response)
    }
}
