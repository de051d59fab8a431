use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::TransportError;
use crate::memo::{FailurePolicy, Memoizer};

/// A GraphQL document plus its variables. User input only ever travels in
/// `variables`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    pub fn var(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Canonical key for memoization: identical documents with identical
    /// variables map to the same string regardless of insertion order.
    pub fn cache_key(&self) -> String {
        json!({ "query": self.query, "vars": self.variables }).to_string()
    }
}

/// The remote call: send a request, get back the raw JSON response.
pub trait GraphQlTransport: Send + Sync + 'static {
    fn execute(
        &self,
        request: &GraphQlRequest,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// Wraps a transport so that identical requests share one remote call.
pub struct MemoizedTransport<T> {
    inner: Arc<T>,
    memo: Memoizer<Arc<Value>, TransportError>,
}

impl<T: GraphQlTransport> MemoizedTransport<T> {
    pub fn new(inner: T, policy: FailurePolicy) -> Self {
        Self {
            inner: Arc::new(inner),
            memo: Memoizer::new(policy),
        }
    }

    pub async fn execute(&self, request: &GraphQlRequest) -> Result<Arc<Value>, TransportError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        self.memo
            .run(request.cache_key(), move || async move {
                inner.execute(&request).await.map(Arc::new)
            })
            .await
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn clear(&self) {
        self.memo.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.memo.len()
    }
}
