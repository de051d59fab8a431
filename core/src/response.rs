//! Typed views of the search API responses.
//!
//! Every level that the service may omit or null out is an `Option`; the
//! presence checks happen once, in [`flatten_search`] and
//! [`FileContentResponse::into_content`].

use serde::Deserialize;
use tracing::debug;

use crate::error::{IntelError, IntelResult};
use crate::model::{MatchKind, Position, SearchResult, SymbolMatch, TextMatch};

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: Option<Search>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
    pub results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub limit_hit: bool,
    pub results: Option<Vec<FileMatch>>,
}

/// One per-file match group. Entries of other result types come back as
/// empty objects because the query only selects fields on `FileMatch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMatch {
    pub file: Option<FileInfo>,
    pub repository: Option<RepositoryInfo>,
    pub symbols: Option<Vec<Symbol>>,
    pub line_matches: Option<Vec<LineMatch>>,
}

#[derive(Debug, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub commit: Option<CommitInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CommitInfo {
    pub oid: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub container_name: Option<String>,
    pub kind: String,
    pub file_local: Option<bool>,
    pub location: SymbolLocation,
}

#[derive(Debug, Deserialize)]
pub struct SymbolLocation {
    pub resource: Resource,
    pub range: WireRange,
}

#[derive(Debug, Deserialize)]
pub struct Resource {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct WireRange {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMatch {
    pub preview: String,
    pub line_number: u32,
    pub offset_and_lengths: Vec<[u32; 2]>,
}

/// Flatten the per-file match groups into one result per symbol and one
/// result per `(offset, length)` occurrence, in response order.
pub fn flatten_search(response: SearchResponse) -> IntelResult<Vec<SearchResult>> {
    let groups = response
        .data
        .and_then(|d| d.search)
        .and_then(|s| s.results)
        .ok_or_else(|| missing("data.search.results"))?;

    if groups.limit_hit {
        debug!("search: result limit hit, results are incomplete");
    }

    let mut results = Vec::new();
    for group in groups.results.unwrap_or_default() {
        let (file, repository) = match (group.file, group.repository) {
            (Some(file), Some(repository)) => (file, repository),
            (None, None) => {
                debug!("search: skipping non-file result");
                continue;
            }
            (None, Some(_)) => return Err(missing("results[].file")),
            (Some(_), None) => return Err(missing("results[].repository")),
        };
        let rev = file
            .commit
            .ok_or_else(|| missing("results[].file.commit"))?
            .oid;
        let repo = repository.name;

        for sym in group.symbols.unwrap_or_default() {
            results.push(SearchResult {
                repo: repo.clone(),
                rev: rev.clone(),
                file: sym.location.resource.path,
                start: sym.location.range.start,
                end: sym.location.range.end,
                kind: MatchKind::Symbol(SymbolMatch {
                    name: sym.name,
                    kind: sym.kind,
                    container_name: sym.container_name,
                    file_local: sym.file_local,
                }),
            });
        }

        for line_match in group.line_matches.unwrap_or_default() {
            let line = line_match.line_number;
            for [offset, length] in line_match.offset_and_lengths {
                results.push(SearchResult {
                    repo: repo.clone(),
                    rev: rev.clone(),
                    file: file.path.clone(),
                    start: Position::new(line, offset),
                    end: Position::new(line, offset.saturating_add(length)),
                    kind: MatchKind::Text(TextMatch {
                        preview: line_match.preview.clone(),
                    }),
                });
            }
        }
    }

    Ok(results)
}

#[derive(Debug, Deserialize)]
pub struct FileContentResponse {
    pub data: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<RepositoryCommit>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryCommit {
    pub commit: Option<CommitFile>,
}

#[derive(Debug, Deserialize)]
pub struct CommitFile {
    pub file: Option<FileContent>,
}

#[derive(Debug, Deserialize)]
pub struct FileContent {
    pub content: Option<String>,
}

impl FileContentResponse {
    /// `Ok(None)` when the repository or commit does not resolve. A resolved
    /// commit without file content is reported as a malformed response.
    pub fn into_content(self) -> IntelResult<Option<String>> {
        let Some(commit) = self
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.commit)
        else {
            return Ok(None);
        };

        commit
            .file
            .and_then(|f| f.content)
            .map(Some)
            .ok_or_else(|| missing("data.repository.commit.file.content"))
    }
}

fn missing(field: &str) -> IntelError {
    IntelError::MalformedResponse(format!("missing field `{field}`"))
}
