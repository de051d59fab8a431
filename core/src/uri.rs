use std::fmt;
use std::str::FromStr;

use crate::error::{IntelError, IntelResult};

pub const URI_SCHEME: &str = "git://";

/// A file at an exact revision of a repository, as addressed by a location
/// token of the form `git://repo?rev#path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoLocation {
    pub repo: String,
    pub rev: String,
    pub path: String,
}

impl RepoLocation {
    pub fn new(repo: impl Into<String>, rev: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            rev: rev.into(),
            path: path.into(),
        }
    }

    pub fn to_uri(&self) -> String {
        serialize_uri(&self.repo, &self.rev, &self.path)
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URI_SCHEME}{}?{}#{}", self.repo, self.rev, self.path)
    }
}

impl FromStr for RepoLocation {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uri(s)
    }
}

/// Split a location token into repository, revision and path.
///
/// The first `?` ends the repository and the first `#` after it ends the
/// revision. Substrings are returned verbatim; no percent-decoding happens.
pub fn parse_uri(uri: &str) -> IntelResult<RepoLocation> {
    let malformed = || IntelError::MalformedUri(uri.to_string());

    let repo_rev_path = uri.strip_prefix(URI_SCHEME).ok_or_else(malformed)?;
    let (repo, rev_path) = repo_rev_path.split_once('?').ok_or_else(malformed)?;
    let (rev, path) = rev_path.split_once('#').ok_or_else(malformed)?;

    Ok(RepoLocation::new(repo, rev, path))
}

pub fn serialize_uri(repo: &str, rev: &str, path: &str) -> String {
    format!("{URI_SCHEME}{repo}?{rev}#{path}")
}
