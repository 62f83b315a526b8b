use crate::client::error::{Context7Error, Result};
use crate::client::library_id::LibraryId;
use crate::client::types::{
    CodeDocs, Docs, DocsFormat, DocsMetadata, DocsMode, DocsOptions, InfoDocs, Pagination,
    SearchLibraryResponse, TextDocs, non_blank,
};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://context7.com/api";
pub const API_KEY_ENV: &str = "CONTEXT7_API_KEY";
const API_KEY_PREFIX: &str = "ctx7sk";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_BODY_CHARS: usize = 300;

const HEADER_PAGE: &str = "x-context7-page";
const HEADER_LIMIT: &str = "x-context7-limit";
const HEADER_TOTAL_PAGES: &str = "x-context7-total-pages";
const HEADER_HAS_NEXT: &str = "x-context7-has-next";
const HEADER_HAS_PREV: &str = "x-context7-has-prev";
const HEADER_LIBRARY_ID: &str = "x-context7-library-id";
const HEADER_VERSION: &str = "x-context7-version";
const HEADER_TOTAL_TOKENS: &str = "x-context7-total-tokens";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Typed client for the Context7 REST API.
#[derive(Clone)]
pub struct Context7Client {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for Context7Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context7Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Context7Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_key = resolve_api_key(config.api_key.as_deref(), |var| std::env::var(var).ok())?;
        if !api_key.starts_with(API_KEY_PREFIX) {
            warn!("Context7 API key does not start with '{API_KEY_PREFIX}', requests may be rejected");
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("ctx7/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Searches the Context7 index for libraries matching `query`, optionally
    /// narrowed to a library name.
    pub async fn search_library(
        &self,
        query: &str,
        library_name: Option<&str>,
    ) -> Result<SearchLibraryResponse> {
        let query = non_blank(Some(query))
            .ok_or_else(|| Context7Error::invalid_parameter("query", "must not be empty"))?;

        let mut url = self.endpoint(&["v2", "libs", "search"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if let Some(name) = non_blank(library_name) {
                pairs.append_pair("libraryName", name);
            }
        }

        debug!(%url, "searching Context7 libraries");
        let response = self.get(url).await?;
        let body = response.text().await?;
        decode_json(&body)
    }

    /// Fetches one page of documentation for `library_id`. The variant of
    /// the returned [`Docs`] follows `options.mode` and `options.format`.
    pub async fn get_docs(&self, library_id: &str, options: &DocsOptions) -> Result<Docs> {
        let id = LibraryId::parse(library_id)?;
        let query = options.query_pairs()?;
        let version = options
            .requested_version()
            .map(str::to_string)
            .or_else(|| id.version.clone());

        let mode = options.mode.as_str();
        let mut segments = vec!["v2", "docs", mode, id.owner.as_str(), id.repo.as_str()];
        if let Some(version) = version.as_deref() {
            segments.push(version);
        }
        let mut url = self.endpoint(&segments)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        debug!(%url, mode, format = %options.format, "fetching Context7 docs");
        let response = self.get(url).await?;

        match (options.format, options.mode) {
            (DocsFormat::Txt, _) => {
                let (pagination, mut metadata) =
                    read_text_headers(response.headers(), options.limit);
                if metadata.library_id.is_empty() {
                    metadata.library_id = id.base();
                }
                if metadata.version.is_none() {
                    metadata.version = version;
                }
                let content = response.text().await?;
                Ok(Docs::Text(TextDocs {
                    content,
                    pagination,
                    metadata,
                }))
            }
            (DocsFormat::Json, DocsMode::Code) => {
                let mut docs: CodeDocs = decode_json(&response.text().await?)?;
                fill_metadata(&mut docs.metadata, &id, version);
                Ok(Docs::Code(docs))
            }
            (DocsFormat::Json, DocsMode::Info) => {
                let mut docs: InfoDocs = decode_json(&response.text().await?)?;
                fill_metadata(&mut docs.metadata, &id, version);
                Ok(Docs::Info(docs))
            }
        }
    }

    pub async fn get_code_docs(&self, library_id: &str, options: DocsOptions) -> Result<CodeDocs> {
        let options = options.with_mode(DocsMode::Code).with_format(DocsFormat::Json);
        match self.get_docs(library_id, &options).await? {
            Docs::Code(docs) => Ok(docs),
            other => Err(unexpected_variant("code", &other)),
        }
    }

    pub async fn get_info_docs(&self, library_id: &str, options: DocsOptions) -> Result<InfoDocs> {
        let options = options.with_mode(DocsMode::Info).with_format(DocsFormat::Json);
        match self.get_docs(library_id, &options).await? {
            Docs::Info(docs) => Ok(docs),
            other => Err(unexpected_variant("info", &other)),
        }
    }

    pub async fn get_text_docs(&self, library_id: &str, options: DocsOptions) -> Result<TextDocs> {
        let options = options.with_format(DocsFormat::Txt);
        match self.get_docs(library_id, &options).await? {
            Docs::Text(docs) => Ok(docs),
            other => Err(unexpected_variant("text", &other)),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Context7Error::invalid_parameter("base_url", e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                Context7Error::invalid_parameter("base_url", "cannot be used as a base URL")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json, text/plain")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = parse_header::<u64>(response.headers(), RETRY_AFTER.as_str());
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "Context7 request failed");
        Err(error_for_status(status, &body, retry_after))
    }
}

pub(crate) fn resolve_api_key(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(key) = non_blank(explicit) {
        return Ok(key.to_string());
    }
    env(API_KEY_ENV)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(Context7Error::MissingApiKey)
}

pub(crate) fn error_for_status(
    status: StatusCode,
    body: &str,
    retry_after: Option<u64>,
) -> Context7Error {
    let message = error_message(status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => Context7Error::RateLimited { retry_after },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Context7Error::Unauthorized(message),
        StatusCode::NOT_FOUND => Context7Error::NotFound(message),
        _ => Context7Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str())
                && !msg.trim().is_empty()
            {
                return msg.trim().to_string();
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return truncate_chars(trimmed, MAX_ERROR_BODY_CHARS);
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Context7Error::Decode(e.to_string()))
}

fn fill_metadata(metadata: &mut DocsMetadata, id: &LibraryId, version: Option<String>) {
    if metadata.library_id.is_empty() {
        metadata.library_id = id.base();
    }
    if metadata.version.is_none() {
        metadata.version = version;
    }
}

/// Missing headers default to a single page; the limit falls back to the
/// one requested.
fn read_text_headers(
    headers: &HeaderMap,
    requested_limit: Option<u32>,
) -> (Pagination, DocsMetadata) {
    let defaults = Pagination::default();
    let page = parse_header(headers, HEADER_PAGE).unwrap_or(defaults.page);
    let total_pages = parse_header(headers, HEADER_TOTAL_PAGES).unwrap_or(defaults.total_pages);

    let pagination = Pagination {
        page,
        limit: parse_header(headers, HEADER_LIMIT)
            .or(requested_limit)
            .unwrap_or(defaults.limit),
        total_pages,
        has_next: parse_header(headers, HEADER_HAS_NEXT).unwrap_or(page < total_pages),
        has_prev: parse_header(headers, HEADER_HAS_PREV).unwrap_or(page > 1),
    };

    let metadata = DocsMetadata {
        library_id: header_str(headers, HEADER_LIBRARY_ID).unwrap_or_default(),
        version: header_str(headers, HEADER_VERSION),
        total_tokens: parse_header(headers, HEADER_TOTAL_TOKENS),
        total_snippets: None,
    };

    (pagination, metadata)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}

fn unexpected_variant(expected: &str, got: &Docs) -> Context7Error {
    let got = match got {
        Docs::Code(_) => "code",
        Docs::Info(_) => "info",
        Docs::Text(_) => "text",
    };
    Context7Error::Decode(format!("expected {expected} docs, got {got} docs"))
}
