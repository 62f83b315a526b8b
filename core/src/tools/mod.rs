use crate::client::Context7Client;
use crate::traits::Tool;
use serde_json::Value;
use std::sync::Arc;

pub mod library_docs;
pub mod resolve_library;

pub use library_docs::GetLibraryDocsTool;
pub use resolve_library::ResolveLibraryTool;

/// Both Context7 tools, sharing one client.
pub fn context7_tools(client: Arc<Context7Client>) -> Vec<Arc<dyn Tool>> {
    let resolve: Arc<dyn Tool> = Arc::new(ResolveLibraryTool::new(client.clone()));
    let docs: Arc<dyn Tool> = Arc::new(GetLibraryDocsTool::new(client));
    vec![resolve, docs]
}

pub fn extract_string_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_string_arg_opt(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Accepts integers and numeric strings; models emit both.
pub fn extract_u32_arg_opt(args: &Value, key: &str) -> anyhow::Result<Option<u32>> {
    let value = match args.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("Parameter '{}' must be a positive integer", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arg_trims_and_rejects_blank() {
        let args = json!({"query": "  hooks ", "blank": "  "});
        assert_eq!(extract_string_arg(&args, "query").unwrap(), "hooks");
        assert!(extract_string_arg(&args, "blank").is_err());
        assert!(extract_string_arg(&args, "missing").is_err());
        assert_eq!(extract_string_arg_opt(&args, "blank"), None);
    }

    #[test]
    fn u32_arg_accepts_numbers_and_strings() {
        let args = json!({"a": 3, "b": "4", "c": null, "d": -1, "e": true});
        assert_eq!(extract_u32_arg_opt(&args, "a").unwrap(), Some(3));
        assert_eq!(extract_u32_arg_opt(&args, "b").unwrap(), Some(4));
        assert_eq!(extract_u32_arg_opt(&args, "c").unwrap(), None);
        assert_eq!(extract_u32_arg_opt(&args, "missing").unwrap(), None);
        assert!(extract_u32_arg_opt(&args, "d").is_err());
        assert!(extract_u32_arg_opt(&args, "e").is_err());
    }
}
