use serde::Deserialize;
use tracing::{debug, info};

use crate::error::IntelResult;
use crate::graphql::{GraphQlRequest, GraphQlTransport, MemoizedTransport};
use crate::memo::FailurePolicy;
use crate::model::SearchResult;
use crate::response::{FileContentResponse, SearchResponse, flatten_search};
use crate::settings::{Settings, SettingsSource};
use crate::uri::parse_uri;

const FILE_CONTENT_QUERY: &str = r#"query GetContextLines($repo: String!, $rev: String!, $path: String!) {
  repository(name: $repo) {
    commit(rev: $rev) {
      file(path: $path) {
        content
      }
    }
  }
}"#;

/// Build the search document. `fileLocal` is only selected when asked for.
pub fn search_query(file_local: bool) -> String {
    let file_local_field = if file_local { "\n          fileLocal" } else { "" };
    format!(
        r#"query Search($query: String!) {{
  search(query: $query) {{
    results {{
      __typename
      limitHit
      results {{
        ... on FileMatch {{
          __typename
          file {{
            path
            url
            commit {{
              oid
            }}
          }}
          repository {{
            name
            url
          }}
          limitHit
          symbols {{
            name
            containerName{file_local_field}
            url
            kind
            location {{
              resource {{
                path
              }}
              range {{
                start {{
                  line
                  character
                }}
                end {{
                  line
                  character
                }}
              }}
            }}
          }}
          lineMatches {{
            preview
            lineNumber
            offsetAndLengths
          }}
        }}
      }}
    }}
  }}
}}"#
    )
}

/// Search and file-content client over a memoized GraphQL transport.
pub struct SearchClient<T, S = Settings> {
    transport: MemoizedTransport<T>,
    settings: S,
}

impl<T, S> SearchClient<T, S>
where
    T: GraphQlTransport,
    S: SettingsSource,
{
    pub fn new(transport: T, settings: S) -> Self {
        Self::with_policy(transport, settings, FailurePolicy::default())
    }

    pub fn with_policy(transport: T, settings: S, policy: FailurePolicy) -> Self {
        Self {
            transport: MemoizedTransport::new(transport, policy),
            settings,
        }
    }

    /// Run a search and return every symbol and text occurrence, in the
    /// order the service returned them. No sorting or de-duplication.
    pub async fn search(&self, query: &str) -> IntelResult<Vec<SearchResult>> {
        let settings = self.settings.settings();

        if settings.trace_search {
            info!(query, "search");
        }

        let request = GraphQlRequest::new(search_query(settings.file_local)).var("query", query);
        let raw = self.transport.execute(&request).await?;
        let response = SearchResponse::deserialize(raw.as_ref())?;
        let results = flatten_search(response)?;

        debug!("search: {} results for {:?}", results.len(), query);
        Ok(results)
    }

    /// Fetch the full text of the file addressed by a `git://repo?rev#path`
    /// token. `Ok(None)` when the repository or revision does not resolve.
    pub async fn file_content(&self, uri: &str) -> IntelResult<Option<String>> {
        let loc = parse_uri(uri)?;

        let request = GraphQlRequest::new(FILE_CONTENT_QUERY)
            .var("repo", loc.repo)
            .var("rev", loc.rev)
            .var("path", loc.path);
        let raw = self.transport.execute(&request).await?;
        let content = FileContentResponse::deserialize(raw.as_ref())?.into_content()?;

        if content.is_none() {
            debug!("file_content: {uri} not found");
        }
        Ok(content)
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        self.transport.inner()
    }

    /// Forget every memoized response.
    pub fn clear_cache(&self) {
        self.transport.clear();
    }

    pub fn cached_responses(&self) -> usize {
        self.transport.cached_len()
    }
}
