use serde::{Deserialize, Serialize};

/// Zero-based line/character position inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Structural match against a named program symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMatch {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_local: Option<bool>,
}

/// Raw substring match on one line of file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMatch {
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchKind {
    Symbol(SymbolMatch),
    Text(TextMatch),
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub repo: String,
    pub rev: String,
    pub file: String,
    pub start: Position,
    pub end: Position,
    #[serde(flatten)]
    pub kind: MatchKind,
}

impl SearchResult {
    pub fn range(&self) -> Range {
        Range {
            start: self.start,
            end: self.end,
        }
    }

    pub fn symbol(&self) -> Option<&SymbolMatch> {
        match &self.kind {
            MatchKind::Symbol(sym) => Some(sym),
            MatchKind::Text(_) => None,
        }
    }

    pub fn preview(&self) -> Option<&str> {
        match &self.kind {
            MatchKind::Text(text) => Some(&text.preview),
            MatchKind::Symbol(_) => None,
        }
    }
}

/// A range in a file addressed by a `git://repo?rev#path` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}
