use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::IntelResult;
use crate::graphql::GraphQlTransport;
use crate::model::{Location, MatchKind, Position, SearchResult};
use crate::search::SearchClient;
use crate::settings::SettingsSource;
use crate::uri::{parse_uri, serialize_uri};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid identifier regex"));

/// Answers definition and reference lookups with plain search queries.
pub struct Provider<T, S> {
    client: SearchClient<T, S>,
}

impl<T, S> Provider<T, S>
where
    T: GraphQlTransport,
    S: SettingsSource,
{
    pub fn new(client: SearchClient<T, S>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SearchClient<T, S> {
        &self.client
    }

    /// Symbols named like the identifier under `pos`.
    pub async fn definition(&self, uri: &str, pos: Position) -> IntelResult<Vec<Location>> {
        let Some((word, path)) = self.word_at(uri, pos).await? else {
            return Ok(Vec::new());
        };

        let results = self.client.search(&definition_query(&word, &path)).await?;
        let symbols = results
            .into_iter()
            .filter(|r| matches!(&r.kind, MatchKind::Symbol(sym) if sym.name == word));
        Ok(to_locations(symbols))
    }

    /// Word-boundary text occurrences of the identifier under `pos`.
    pub async fn references(&self, uri: &str, pos: Position) -> IntelResult<Vec<Location>> {
        let Some((word, path)) = self.word_at(uri, pos).await? else {
            return Ok(Vec::new());
        };

        let results = self.client.search(&references_query(&word, &path)).await?;
        let texts = results
            .into_iter()
            .filter(|r| matches!(r.kind, MatchKind::Text(_)));
        Ok(to_locations(texts))
    }

    async fn word_at(&self, uri: &str, pos: Position) -> IntelResult<Option<(String, String)>> {
        let path = parse_uri(uri)?.path;
        let Some(content) = self.client.file_content(uri).await? else {
            debug!("word_at: no content for {uri}");
            return Ok(None);
        };

        let word = identifier_at(&content, pos).map(str::to_string);
        if word.is_none() {
            debug!("word_at: no identifier at {}:{}", pos.line, pos.character);
        }
        Ok(word.map(|w| (w, path)))
    }
}

/// The identifier covering `pos`, if any. `character` is a byte offset into
/// the line; a position just past the end of a word still selects it.
pub fn identifier_at(text: &str, pos: Position) -> Option<&str> {
    let line = text.lines().nth(pos.line as usize)?;
    let col = pos.character as usize;
    IDENTIFIER
        .find_iter(line)
        .find(|m| m.start() <= col && col <= m.end())
        .map(|m| m.as_str())
}

pub fn definition_query(word: &str, path: &str) -> String {
    let mut query = format!("^{word}$ type:symbol patternType:regexp case:yes");
    push_file_filter(&mut query, path);
    query
}

pub fn references_query(word: &str, path: &str) -> String {
    let mut query = format!(r"\b{word}\b type:file patternType:regexp case:yes");
    push_file_filter(&mut query, path);
    query
}

fn push_file_filter(query: &mut String, path: &str) {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if let Some((stem, ext)) = file_name.rsplit_once('.')
        && !stem.is_empty()
        && !ext.is_empty()
    {
        query.push_str(&format!(r" file:\.{}$", regex::escape(ext)));
    }
}

/// Map results to locations, keeping the first occurrence of each.
fn to_locations(results: impl IntoIterator<Item = SearchResult>) -> Vec<Location> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .map(|r| Location {
            uri: serialize_uri(&r.repo, &r.rev, &r.file),
            range: r.range(),
        })
        .filter(|loc| seen.insert(loc.clone()))
        .collect()
}
