use crate::agent::{DEFAULT_SYSTEM_PROMPT, ToolRegistry};
use crate::client::Context7Client;
use crate::tools::context7_tools;
use crate::traits::{ChatMessage, ChatRequest, Provider, Tool, ToolCall, ToolResult};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_STEPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model answered without requesting more tool calls.
    Stop,
    /// The step budget ran out while the model was still calling tools.
    MaxSteps,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentOutput {
    pub text: String,
    pub steps: Vec<AgentStep>,
    pub finish_reason: FinishReason,
}

/// Runs a model against the Context7 tools until it stops calling them.
pub struct Context7Agent {
    provider: Arc<dyn Provider>,
    tool_registry: ToolRegistry,
    model: Option<String>,
    system_prompt: String,
    max_steps: usize,
    temperature: Option<f64>,
}

impl Context7Agent {
    pub fn new(provider: Arc<dyn Provider>, client: Arc<Context7Client>) -> Self {
        let mut tool_registry = ToolRegistry::new();
        tool_registry.extend(context7_tools(client));
        Self::with_registry(provider, tool_registry)
    }

    pub fn with_registry(provider: Arc<dyn Provider>, tool_registry: ToolRegistry) -> Self {
        Self {
            provider,
            tool_registry,
            model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// A value of zero is treated as one step.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tool_registry.register(tool);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub async fn generate(&self, prompt: &str) -> Result<AgentOutput> {
        self.generate_with_history(prompt, vec![]).await
    }

    pub async fn generate_with_history(
        &self,
        prompt: &str,
        history: Vec<ChatMessage>,
    ) -> Result<AgentOutput> {
        let mut messages = self.build_messages(history, prompt);
        let tools = self.tool_registry.get_specs();
        let mut steps: Vec<AgentStep> = Vec::new();

        for step in 1..=self.max_steps {
            let request = ChatRequest {
                messages: &messages,
                tools: if tools.is_empty() { None } else { Some(&tools) },
                model: self.model.as_deref(),
                temperature: self.temperature,
            };

            let response = self.provider.chat(request).await?;
            let text = response.text_or_empty().to_string();

            if !response.has_tool_calls() {
                debug!(step, "model finished without tool calls");
                messages.push(ChatMessage::assistant(text.clone()));
                steps.push(AgentStep {
                    text: text.clone(),
                    tool_calls: vec![],
                    tool_results: vec![],
                });
                return Ok(AgentOutput {
                    text,
                    steps,
                    finish_reason: FinishReason::Stop,
                });
            }

            messages.push(ChatMessage::assistant_with_tool_calls(
                text.clone(),
                response.tool_calls.clone(),
            ));

            let mut tool_results = Vec::with_capacity(response.tool_calls.len());
            for tool_call in &response.tool_calls {
                info!(step, tool = %tool_call.name, "executing tool call");
                let result = self.run_tool_call(tool_call).await;
                messages.push(ChatMessage::tool_result(
                    tool_call.id.clone(),
                    result.to_model_content(),
                ));
                tool_results.push(result);
            }

            steps.push(AgentStep {
                text,
                tool_calls: response.tool_calls,
                tool_results,
            });
        }

        let text = steps
            .iter()
            .rev()
            .map(|s| s.text.as_str())
            .find(|t| !t.trim().is_empty())
            .unwrap_or_default()
            .to_string();

        info!(max_steps = self.max_steps, "agent stopped at step limit");
        Ok(AgentOutput {
            text,
            steps,
            finish_reason: FinishReason::MaxSteps,
        })
    }

    fn build_messages(&self, history: Vec<ChatMessage>, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(self.system_prompt.clone()));
        }
        messages.extend(history);
        messages.push(ChatMessage::user(prompt));
        messages
    }

    async fn run_tool_call(&self, tool_call: &ToolCall) -> ToolResult {
        let raw = tool_call.arguments.trim();
        let args = if raw.is_empty() {
            Ok(serde_json::Value::Object(Default::default()))
        } else {
            serde_json::from_str::<serde_json::Value>(raw)
        };

        match args {
            Ok(args) => self.tool_registry.execute(&tool_call.name, args).await,
            Err(e) => ToolResult::error(format!(
                "Failed to parse tool arguments for {}: {}",
                tool_call.name, e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatResponse, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request it sees.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<ChatResponse>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            self.seen.lock().unwrap().push(request.messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    struct LookupTool;

    #[async_trait]
    impl Tool for LookupTool {
        fn name(&self) -> &str {
            "lookup"
        }

        fn description(&self) -> &str {
            "test lookup"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"q": {"type": "string"}}})
        }

        async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
            let q = args.get("q").and_then(|v| v.as_str()).unwrap_or("?");
            Ok(ToolResult::success(format!("result for {q}")))
        }
    }

    fn text(t: &str) -> ChatResponse {
        ChatResponse {
            text: Some(t.to_string()),
            tool_calls: vec![],
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            text: None,
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> Context7Agent {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(LookupTool));
        Context7Agent::with_registry(provider, registry)
    }

    #[tokio::test]
    async fn returns_text_when_no_tools_called() {
        let provider = ScriptedProvider::new(vec![text("hello")]);
        let output = agent(provider.clone()).generate("hi").await.unwrap();

        assert_eq!(output.text, "hello");
        assert_eq!(output.finish_reason, FinishReason::Stop);
        assert_eq!(output.steps.len(), 1);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0][0].role, Role::System);
        assert_eq!(seen[0].last().unwrap().content, "hi");
    }

    #[tokio::test]
    async fn feeds_tool_results_back_to_model() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "lookup", r#"{"q": "tokio"}"#),
            text("tokio is an async runtime"),
        ]);
        let output = agent(provider.clone()).generate("what is tokio?").await.unwrap();

        assert_eq!(output.text, "tokio is an async runtime");
        assert_eq!(output.steps.len(), 2);
        assert_eq!(
            output.steps[0].tool_results,
            vec![ToolResult::success("result for tokio")]
        );

        let seen = provider.seen.lock().unwrap();
        let tool_msg = seen[1].last().unwrap();
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_msg.content, "result for tokio");
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported_to_model() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "lookup", "{not json"),
            text("sorry"),
        ]);
        let output = agent(provider.clone()).generate("x").await.unwrap();

        let result = &output.steps[0].tool_results[0];
        assert!(!result.success);
        assert!(
            result
                .error
                .as_deref()
                .unwrap()
                .starts_with("Failed to parse tool arguments for lookup")
        );
        assert_eq!(output.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn stops_at_step_limit() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "lookup", "{}"),
            call("c2", "lookup", "{}"),
            call("c3", "lookup", "{}"),
        ]);
        let output = agent(provider.clone())
            .with_max_steps(2)
            .generate("loop")
            .await
            .unwrap();

        assert_eq!(output.finish_reason, FinishReason::MaxSteps);
        assert_eq!(output.steps.len(), 2);
        assert_eq!(provider.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn step_limit_returns_last_non_empty_text() {
        let mut first = call("c1", "lookup", r#"{"q": "axum"}"#);
        first.text = Some("Looking up axum".to_string());
        let mut second = call("c2", "lookup", r#"{"q": "axum routing"}"#);
        second.text = Some("Narrowing to routing".to_string());
        let third = call("c3", "lookup", r#"{"q": "axum extractors"}"#);

        let provider = ScriptedProvider::new(vec![first, second, third]);
        let output = agent(provider)
            .with_max_steps(3)
            .generate("how do axum routes work?")
            .await
            .unwrap();

        assert_eq!(output.finish_reason, FinishReason::MaxSteps);
        assert_eq!(output.steps.len(), 3);
        assert_eq!(output.steps[2].text, "");
        assert_eq!(output.text, "Narrowing to routing");
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = ScriptedProvider::new(vec![]);
        let err = agent(provider).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[tokio::test]
    async fn history_precedes_prompt() {
        let provider = ScriptedProvider::new(vec![text("ok")]);
        agent(provider.clone())
            .with_system_prompt("")
            .generate_with_history("second", vec![ChatMessage::user("first")])
            .await
            .unwrap();

        let seen = provider.seen.lock().unwrap();
        let contents: Vec<&str> = seen[0].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }
}
