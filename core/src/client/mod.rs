pub mod error;
pub mod http;
pub mod library_id;
pub mod types;

pub use error::{Context7Error, Result};
pub use http::{API_KEY_ENV, ClientConfig, Context7Client, DEFAULT_BASE_URL};
pub use library_id::LibraryId;
pub use types::{
    CodeDocs, CodeExample, CodeSnippet, Docs, DocsFormat, DocsMetadata, DocsMode, DocsOptions,
    InfoDocs, InfoSnippet, Library, Pagination, SearchLibraryResponse, TextDocs,
};
