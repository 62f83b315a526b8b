use crate::client::error::{Context7Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_PAGE: u32 = 1000;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub last_update_date: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_snippets: Option<u64>,
    #[serde(default)]
    pub stars: Option<i64>,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub benchmark_score: Option<f64>,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLibraryResponse {
    pub results: Vec<Library>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_filter_applied: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsMode {
    /// Code snippets with titles and descriptions.
    #[default]
    Code,
    /// Prose documentation pages.
    Info,
}

impl DocsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for DocsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocsMode {
    type Err = Context7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(Self::Code),
            "info" => Ok(Self::Info),
            other => Err(Context7Error::invalid_parameter(
                "mode",
                format!("expected 'code' or 'info', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsFormat {
    #[default]
    Json,
    Txt,
}

impl DocsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocsFormat {
    type Err = Context7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(Context7Error::invalid_parameter(
                "format",
                format!("expected 'json' or 'txt', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsOptions {
    pub mode: DocsMode,
    pub format: DocsFormat,
    pub topic: Option<String>,
    pub version: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl DocsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: DocsMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_format(mut self, format: DocsFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks ranges and returns the query pairs for the docs endpoint.
    /// Blank `topic` values are dropped.
    pub(crate) fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let mut pairs = vec![("type", self.format.as_str().to_string())];

        if let Some(topic) = non_blank(self.topic.as_deref()) {
            pairs.push(("topic", topic.to_string()));
        }

        if let Some(page) = self.page {
            if page == 0 || page > MAX_PAGE {
                return Err(Context7Error::invalid_parameter(
                    "page",
                    format!("must be between 1 and {MAX_PAGE}, got {page}"),
                ));
            }
            pairs.push(("page", page.to_string()));
        }

        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Err(Context7Error::invalid_parameter(
                    "limit",
                    format!("must be between 1 and {MAX_LIMIT}, got {limit}"),
                ));
            }
            pairs.push(("limit", limit.to_string()));
        }

        Ok(pairs)
    }

    pub(crate) fn requested_version(&self) -> Option<&str> {
        non_blank(self.version.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 0,
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocsMetadata {
    pub library_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_snippets: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    pub code_title: String,
    #[serde(default)]
    pub code_description: String,
    #[serde(default)]
    pub code_language: String,
    #[serde(default)]
    pub code_tokens: u64,
    #[serde(default)]
    pub code_id: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub code_list: Vec<CodeExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoSnippet {
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub breadcrumb: String,
    pub content: String,
    #[serde(default)]
    pub content_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDocs {
    pub snippets: Vec<CodeSnippet>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub metadata: DocsMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDocs {
    pub snippets: Vec<InfoSnippet>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub metadata: DocsMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDocs {
    pub content: String,
    pub pagination: Pagination,
    pub metadata: DocsMetadata,
}

/// Documentation page, discriminated by the requested mode and format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Docs {
    Code(CodeDocs),
    Info(InfoDocs),
    Text(TextDocs),
}

impl Docs {
    pub fn pagination(&self) -> &Pagination {
        match self {
            Self::Code(d) => &d.pagination,
            Self::Info(d) => &d.pagination,
            Self::Text(d) => &d.pagination,
        }
    }

    pub fn metadata(&self) -> &DocsMetadata {
        match self {
            Self::Code(d) => &d.metadata,
            Self::Info(d) => &d.metadata,
            Self::Text(d) => &d.metadata,
        }
    }
}
