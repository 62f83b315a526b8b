use crate::client::{Context7Client, Library};
use crate::tools::{extract_string_arg, extract_string_arg_opt};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

const RESULT_SEPARATOR: &str = "----------";

/// Resolves a package or product name to Context7 library identifiers.
pub struct ResolveLibraryTool {
    client: Arc<Context7Client>,
}

impl ResolveLibraryTool {
    pub fn new(client: Arc<Context7Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ResolveLibraryTool {
    fn name(&self) -> &str {
        "resolveLibrary"
    }

    fn description(&self) -> &str {
        "Search Context7 for libraries matching a name or question and return their \
         Context7-compatible library IDs (e.g. '/vercel/next.js'). Call this before \
         getLibraryDocs unless the user already supplied an ID of the form '/org/project'. \
         Prefer results with a high trust score and many code snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for, e.g. a library name or the user's question"
                },
                "libraryName": {
                    "type": "string",
                    "description": "Optional library or package name to narrow the search"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let query = extract_string_arg(&args, "query")?;
        let library_name = extract_string_arg_opt(&args, "libraryName");

        debug!(%query, library_name = ?library_name, "resolveLibrary");
        match self
            .client
            .search_library(&query, library_name.as_deref())
            .await
        {
            Ok(response) if response.results.is_empty() => Ok(ToolResult::success(format!(
                "No libraries found matching '{query}'. Try a shorter or differently spelled name."
            ))),
            Ok(response) => Ok(ToolResult::success(format_libraries(&response.results))),
            Err(e) => Ok(ToolResult::error(format!("Failed to search libraries: {e}"))),
        }
    }
}

pub fn format_libraries(libraries: &[Library]) -> String {
    let separator = format!("\n{RESULT_SEPARATOR}\n");
    let blocks: Vec<String> = libraries.iter().map(format_library).collect();
    format!(
        "Available libraries ({}):\n\n{}",
        libraries.len(),
        blocks.join(separator.as_str())
    )
}

fn format_library(lib: &Library) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "- Title: {}", lib.title);
    let _ = writeln!(out, "- Context7-compatible library ID: {}", lib.id);

    if let Some(description) = lib.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "- Description: {description}");
    }
    if let Some(snippets) = lib.total_snippets {
        let _ = writeln!(out, "- Code Snippets: {snippets}");
    }
    if let Some(score) = lib.trust_score.filter(|s| *s >= 0.0) {
        let _ = writeln!(out, "- Trust Score: {score}");
    }
    if let Some(score) = lib.benchmark_score.filter(|s| *s >= 0.0) {
        let _ = writeln!(out, "- Benchmark Score: {score}");
    }
    if !lib.versions.is_empty() {
        let _ = writeln!(out, "- Versions: {}", lib.versions.join(", "));
    }

    out.trim_end().to_string()
}
