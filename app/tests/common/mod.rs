//! Test helper module for E2E tests
//!
//! Provides `MockGraphQl`, a wiremock server answering canned GraphQL
//! responses, and helpers for running the `si` CLI against it.

#![allow(dead_code)] // Test helpers may not be used in all test modules
#![allow(deprecated)] // cargo_bin() deprecation

pub mod mcp;

use assert_cmd::Command;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const REPO: &str = "example/repo";
pub const REV: &str = "c0ffee";
pub const MAIN_GO: &str = "package main\n\nfunc main() {\n\tgreet(\"world\")\n}\n";

const GRAPHQL_PATH: &str = "/.api/graphql";

/// The document the fixtures are built around.
pub fn main_uri() -> String {
    format!("git://{REPO}?{REV}#main.go")
}

/// Mock GraphQL endpoint serving one fixed repository.
///
/// `si` runs as a subprocess, so the server lives on its own runtime for as
/// long as this value does.
pub struct MockGraphQl {
    pub endpoint: String,
    server: MockServer,
    runtime: Runtime,
}

impl MockGraphQl {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("mock server runtime");
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            mount_fixtures(&server).await;
            server
        });

        Self {
            endpoint: format!("{}{GRAPHQL_PATH}", server.uri()),
            server,
            runtime,
        }
    }

    /// Number of GraphQL requests the server has received so far.
    pub fn requests(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .expect("request recording is enabled")
            .len()
    }

    /// Create a Command for running `si` against this endpoint
    pub fn si(&self) -> Command {
        let mut cmd = si();
        cmd.arg("--endpoint").arg(&self.endpoint);
        cmd
    }
}

/// Create a Command for running `si` with a clean environment
pub fn si() -> Command {
    let mut cmd = Command::cargo_bin("si").unwrap();
    cmd.env_remove("SEARCH_INTEL_ENDPOINT");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn graphql() -> MockBuilder {
    Mock::given(method("POST")).and(path(GRAPHQL_PATH))
}

fn data(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": body }))
}

/// Mount order matters: the first matching mock answers.
async fn mount_fixtures(server: &MockServer) {
    graphql()
        .and(body_partial_json(
            json!({ "variables": { "repo": REPO, "rev": REV, "path": "main.go" } }),
        ))
        .respond_with(data(
            json!({ "repository": { "commit": { "file": { "content": MAIN_GO } } } }),
        ))
        .mount(server)
        .await;

    graphql()
        .and(body_partial_json(json!({ "variables": { "repo": REPO, "rev": REV } })))
        .respond_with(data(json!({ "repository": { "commit": { "file": null } } })))
        .mount(server)
        .await;

    graphql()
        .and(body_partial_json(json!({ "variables": { "repo": REPO } })))
        .respond_with(data(json!({ "repository": { "commit": null } })))
        .mount(server)
        .await;

    graphql()
        .and(body_string_contains("GetContextLines"))
        .respond_with(data(json!({ "repository": null })))
        .mount(server)
        .await;

    graphql()
        .and(body_string_contains("greet"))
        .respond_with(data(greet_results()))
        .mount(server)
        .await;

    graphql()
        .respond_with(data(json!({ "search": { "results": { "results": [] } } })))
        .mount(server)
        .await;
}

fn greet_results() -> Value {
    json!({ "search": { "results": { "limitHit": false, "results": [
        {
            "__typename": "FileMatch",
            "file": { "path": "greet.go", "commit": { "oid": REV } },
            "repository": { "name": REPO },
            "symbols": [{
                "name": "greet",
                "containerName": "main",
                "kind": "FUNCTION",
                "location": {
                    "resource": { "path": "greet.go" },
                    "range": { "start": { "line": 2, "character": 5 }, "end": { "line": 2, "character": 10 } }
                }
            }],
            "lineMatches": []
        },
        {
            "__typename": "FileMatch",
            "file": { "path": "main.go", "commit": { "oid": REV } },
            "repository": { "name": REPO },
            "symbols": [],
            "lineMatches": [
                { "preview": "\tgreet(\"world\")", "lineNumber": 3, "offsetAndLengths": [[1, 5]] }
            ]
        }
    ] } } })
}
