use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

pub struct McpServerProcess {
    child: Child,
    stdin: ChildStdin,
    rx: mpsc::Receiver<String>,
}

impl McpServerProcess {
    /// Start `si server` against `endpoint` with stdio piped.
    pub fn spawn(endpoint: &str) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_si"))
            .args(["--endpoint", endpoint, "server"])
            .env_remove("SEARCH_INTEL_LOG_PATH")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start si server");

        let stdin = child.stdin.take().expect("Failed to take stdin");
        let stdout = child.stdout.take().expect("Failed to take stdout");

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self { child, stdin, rx }
    }

    fn send_line(&mut self, line: &str) {
        writeln!(self.stdin, "{line}").expect("Failed to write to server stdin");
        self.stdin.flush().expect("Failed to flush server stdin");
    }

    fn recv_json(&mut self, timeout: Duration) -> Option<Value> {
        let line = self.rx.recv_timeout(timeout).ok()?;
        serde_json::from_str::<Value>(line.trim()).ok()
    }

    pub fn initialize(&mut self) -> Value {
        let init_request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;
        self.send_line(init_request);
        let resp = self
            .recv_json(Duration::from_secs(5))
            .expect("No initialize response from server");

        // MCP requires a `notifications/initialized` notification after successful initialize.
        let initialized = r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#;
        self.send_line(initialized);

        resp
    }

    /// Send a request and wait for the response carrying the same id.
    pub fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        let req = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        self.send_line(&req.to_string());

        let deadline = Duration::from_secs(10);
        let start = std::time::Instant::now();
        loop {
            let remaining = deadline.saturating_sub(start.elapsed());
            let Some(msg) = self.recv_json(remaining) else {
                panic!("Timed out waiting for {method} response");
            };
            if msg.get("id").and_then(|v| v.as_u64()) == Some(id) {
                return msg;
            }
        }
    }

    pub fn call_tool(&mut self, id: u64, name: &str, arguments: Value) -> Value {
        self.request(
            id,
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )
    }

}

impl Drop for McpServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn response_has_error(resp: &Value) -> bool {
    resp.get("error").is_some()
}

/// Concatenate every text content item of a tools/call response.
pub fn response_text_blob(resp: &Value) -> String {
    let mut out = String::new();
    let Some(contents) = resp
        .get("result")
        .and_then(|r| r.get("content"))
        .and_then(|c| c.as_array())
    else {
        return out;
    };

    for item in contents {
        if let Some(text) = item.get("text").and_then(|t| t.as_str()) {
            out.push_str(text);
            out.push('\n');
        }
    }
    out
}
