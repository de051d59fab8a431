pub mod error;
pub mod graphql;
pub mod http;
pub mod intel;
pub mod memo;
pub mod model;
pub mod response;
pub mod search;
pub mod settings;
pub mod uri;

pub use error::{IntelError, IntelResult, TransportError};
pub use graphql::{GraphQlRequest, GraphQlTransport, MemoizedTransport};
pub use http::{HttpConfig, HttpTransport};
pub use intel::Provider;
pub use memo::{FailurePolicy, Memoizer};
pub use model::{Location, MatchKind, Position, Range, SearchResult, SymbolMatch, TextMatch};
pub use search::SearchClient;
pub use settings::{EnvSettings, Settings, SettingsSource};
pub use uri::{RepoLocation, parse_uri, serialize_uri};
