use crate::client::{Context7Client, DocsMode, DocsOptions, TextDocs};
use crate::tools::{extract_string_arg, extract_string_arg_opt, extract_u32_arg_opt};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Fetches a page of documentation for a resolved library.
pub struct GetLibraryDocsTool {
    client: Arc<Context7Client>,
}

impl GetLibraryDocsTool {
    pub fn new(client: Arc<Context7Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetLibraryDocsTool {
    fn name(&self) -> &str {
        "getLibraryDocs"
    }

    fn description(&self) -> &str {
        "Fetch up-to-date documentation for a library from Context7. Requires a \
         Context7-compatible library ID such as '/vercel/next.js' (use resolveLibrary first). \
         Use mode 'code' for API references and examples, 'info' for conceptual guides. \
         Results are paginated; request the next page if the answer is not in the first one."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "libraryId": {
                    "type": "string",
                    "description": "Context7-compatible library ID, e.g. '/mongodb/docs' or '/vercel/next.js/v14.3.0'"
                },
                "mode": {
                    "type": "string",
                    "enum": ["code", "info"],
                    "description": "'code' for code snippets (default), 'info' for conceptual documentation"
                },
                "topic": {
                    "type": "string",
                    "description": "Topic to focus on, e.g. 'routing' or 'hooks'"
                },
                "version": {
                    "type": "string",
                    "description": "Library version to fetch, if not part of libraryId"
                },
                "page": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Page number (default: 1)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Results per page"
                }
            },
            "required": ["libraryId"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let library_id = extract_string_arg(&args, "libraryId")?;
        let mode = match extract_string_arg_opt(&args, "mode") {
            Some(mode) => mode.parse::<DocsMode>()?,
            None => DocsMode::Code,
        };

        let mut options = DocsOptions::new().with_mode(mode);
        options.topic = extract_string_arg_opt(&args, "topic");
        options.version = extract_string_arg_opt(&args, "version");
        options.page = extract_u32_arg_opt(&args, "page")?;
        options.limit = extract_u32_arg_opt(&args, "limit")?;

        debug!(%library_id, %mode, page = ?options.page, "getLibraryDocs");
        match self.client.get_text_docs(&library_id, options).await {
            Ok(docs) => Ok(ToolResult::success(format_docs(&docs, mode))),
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to fetch documentation for '{library_id}': {e}"
            ))),
        }
    }
}

pub fn format_docs(docs: &TextDocs, mode: DocsMode) -> String {
    let content = docs.content.trim();
    let body = if content.is_empty() {
        "No documentation found for this query.".to_string()
    } else {
        content.to_string()
    };

    let p = &docs.pagination;
    let mut footer = format!(
        "Page {} of {} for {} (mode: {})",
        p.page,
        p.total_pages.max(p.page),
        docs.metadata.library_id,
        mode
    );
    if let Some(version) = &docs.metadata.version {
        footer.push_str(&format!(", version {version}"));
    }
    footer.push('.');
    if p.has_next {
        footer.push_str(&format!(
            " More documentation is available: call getLibraryDocs again with page={}.",
            p.page + 1
        ));
    }

    format!("{body}\n\n---\n{footer}")
}
