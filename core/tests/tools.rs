use async_trait::async_trait;
use ctx7_core::agent::{Context7Agent, FinishReason};
use ctx7_core::client::{ClientConfig, Context7Client};
use ctx7_core::tools::{GetLibraryDocsTool, ResolveLibraryTool, context7_tools};
use ctx7_core::traits::{ChatRequest, ChatResponse, Provider, Role, Tool, ToolCall};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<Context7Client> {
    Arc::new(
        Context7Client::new(
            ClientConfig::default()
                .with_api_key("ctx7sk-test")
                .with_base_url(server.uri()),
        )
        .unwrap(),
    )
}

async fn mount_search(server: &MockServer) {
    Mock::given(path("/v2/libs/search"))
        .and(query_param("query", "react hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "/facebook/react", "title": "React", "totalSnippets": 2000, "trustScore": 10},
                {"id": "/preactjs/preact", "title": "Preact", "totalSnippets": 300}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_docs(server: &MockServer) {
    Mock::given(path("/v2/docs/code/facebook/react"))
        .and(query_param("type", "txt"))
        .and(query_param("topic", "hooks"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-context7-page", "1")
                .insert_header("x-context7-total-pages", "2")
                .insert_header("x-context7-has-next", "true")
                .set_body_string("### useState\n\nconst [v, setV] = useState(0);"),
        )
        .mount(server)
        .await;
}

#[test]
fn tool_specs_describe_required_parameters() {
    let client = Arc::new(
        Context7Client::new(ClientConfig::default().with_api_key("ctx7sk-test")).unwrap(),
    );
    let tools = context7_tools(client);
    let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["resolveLibrary", "getLibraryDocs"]);

    let resolve = tools[0].spec();
    assert_eq!(resolve.parameters_schema["required"], json!(["query"]));
    let docs = tools[1].spec();
    assert_eq!(docs.parameters_schema["required"], json!(["libraryId"]));
    assert_eq!(
        docs.parameters_schema["properties"]["mode"]["enum"],
        json!(["code", "info"])
    );
}

#[tokio::test]
async fn resolve_library_lists_matches() {
    let server = MockServer::start().await;
    mount_search(&server).await;

    let tool = ResolveLibraryTool::new(client_for(&server));
    let result = tool.execute(json!({"query": "react hooks"})).await.unwrap();

    assert!(result.success);
    assert!(result.output.contains("- Context7-compatible library ID: /facebook/react"));
    assert!(result.output.contains("- Context7-compatible library ID: /preactjs/preact"));
}

#[tokio::test]
async fn resolve_library_reports_empty_results() {
    let server = MockServer::start().await;
    Mock::given(path("/v2/libs/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let tool = ResolveLibraryTool::new(client_for(&server));
    let result = tool.execute(json!({"query": "zzzz"})).await.unwrap();
    assert!(result.success);
    assert!(result.output.starts_with("No libraries found matching 'zzzz'"));
}

#[tokio::test]
async fn resolve_library_requires_query() {
    let server = MockServer::start().await;
    let tool = ResolveLibraryTool::new(client_for(&server));
    assert!(tool.execute(json!({"libraryName": "react"})).await.is_err());
}

#[tokio::test]
async fn library_docs_returns_text_with_footer() {
    let server = MockServer::start().await;
    mount_docs(&server).await;

    let tool = GetLibraryDocsTool::new(client_for(&server));
    let result = tool
        .execute(json!({"libraryId": "/facebook/react", "topic": "hooks"}))
        .await
        .unwrap();

    assert!(result.success, "{:?}", result.error);
    assert!(result.output.starts_with("### useState"));
    assert!(result.output.contains("Page 1 of 2 for /facebook/react (mode: code)."));
    assert!(result.output.contains("page=2"));
}

#[tokio::test]
async fn library_docs_turns_api_errors_into_results() {
    let server = MockServer::start().await;
    Mock::given(path("/v2/docs/info/org/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Library not found"})))
        .mount(&server)
        .await;

    let tool = GetLibraryDocsTool::new(client_for(&server));
    let result = tool
        .execute(json!({"libraryId": "/org/missing", "mode": "info", "page": "1"}))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to fetch documentation for '/org/missing': Not found: Library not found")
    );
}

#[tokio::test]
async fn library_docs_rejects_bad_arguments() {
    let server = MockServer::start().await;
    let tool = GetLibraryDocsTool::new(client_for(&server));

    assert!(tool.execute(json!({})).await.is_err());
    assert!(
        tool.execute(json!({"libraryId": "/a/b", "mode": "pictures"}))
            .await
            .is_err()
    );
    assert!(
        tool.execute(json!({"libraryId": "/a/b", "page": "two"}))
            .await
            .is_err()
    );
}

struct ScriptedProvider {
    responses: Mutex<VecDeque<ChatResponse>>,
    tool_messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        assert_eq!(request.tools.map(|t| t.len()), Some(2));
        if let Some(last) = request.messages.last()
            && last.role == Role::Tool
        {
            self.tool_messages.lock().unwrap().push(last.content.clone());
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ChatResponse {
    ChatResponse {
        text: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    }
}

#[tokio::test]
async fn agent_resolves_then_fetches_docs() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    mount_docs(&server).await;

    let provider = Arc::new(ScriptedProvider {
        responses: Mutex::new(VecDeque::from(vec![
            tool_call("c1", "resolveLibrary", json!({"query": "react hooks"})),
            tool_call(
                "c2",
                "getLibraryDocs",
                json!({"libraryId": "/facebook/react", "topic": "hooks"}),
            ),
            ChatResponse {
                text: Some("Use useState to hold component state.".into()),
                tool_calls: vec![],
            },
        ])),
        tool_messages: Mutex::new(vec![]),
    });

    let agent = Context7Agent::new(provider.clone(), client_for(&server));
    let output = agent.generate("How do I use React hooks?").await.unwrap();

    assert_eq!(output.finish_reason, FinishReason::Stop);
    assert_eq!(output.text, "Use useState to hold component state.");
    assert_eq!(output.steps.len(), 3);
    assert!(output.steps[0].tool_results[0].success);
    assert!(output.steps[1].tool_results[0].success);

    let tool_messages = provider.tool_messages.lock().unwrap();
    assert_eq!(tool_messages.len(), 2);
    assert!(tool_messages[0].contains("/facebook/react"));
    assert!(tool_messages[1].contains("useState"));
}
