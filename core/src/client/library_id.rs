use crate::client::error::{Context7Error, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed Context7 library identifier such as `/vercel/next.js` or
/// `/vercel/next.js/v14.3.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryId {
    pub owner: String,
    pub repo: String,
    pub version: Option<String>,
}

impl LibraryId {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Context7Error::InvalidLibraryId(raw.to_string());

        let trimmed = raw.trim();
        let rest = trimmed.strip_prefix('/').ok_or_else(invalid)?;
        if rest.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }

        match segments.as_slice() {
            [owner, repo] => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
                version: None,
            }),
            [owner, repo, version] => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
                version: Some(version.to_string()),
            }),
            _ => Err(invalid()),
        }
    }

    /// Identifier without the version segment.
    pub fn base(&self) -> String {
        format!("/{}/{}", self.owner, self.repo)
    }
}

impl FromStr for LibraryId {
    type Err = Context7Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "/{}/{}/{}", self.owner, self.repo, version),
            None => write!(f, "/{}/{}", self.owner, self.repo),
        }
    }
}
