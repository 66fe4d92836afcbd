// tests/common/http.rs
//! Minimal HTTP/1.1 server on 127.0.0.1 serving canned replies.

use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    /// Content-Length to announce; the body length when `None`
    pub declared_length: Option<usize>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            declared_length: None,
        }
    }

    pub fn json(value: &Value) -> Self {
        Self::ok(value.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            declared_length: None,
        }
    }

    /// Announce `declared_length` bytes but close after sending `body`
    pub fn truncated(body: impl Into<Vec<u8>>, declared_length: usize) -> Self {
        Self {
            declared_length: Some(declared_length),
            ..Self::ok(body)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    /// Request target with `%27` decoded, e.g. `/odata/v1/Products('a')/Nodes?$format=json`
    pub target: String,
    pub authorization: Option<String>,
}

impl Request {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    /// Value of query parameter `name`, undecoded
    pub fn param(&self, name: &str) -> Option<&str> {
        self.target
            .split_once('?')?
            .1
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

pub struct FixtureServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl FixtureServer {
    /// Serve every connection with `handler` until the test process exits
    pub fn start(handler: impl Fn(&Request) -> Reply + Send + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(read_half) = stream.try_clone() else { continue };
                let mut reader = BufReader::new(read_half);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
                    continue;
                }
                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .replace("%27", "'");

                let mut authorization = None;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("authorization") {
                            authorization = Some(value.trim().to_string());
                        }
                    }
                }

                let request = Request {
                    target,
                    authorization,
                };
                let reply = handler(&request);
                log.lock().unwrap().push(request);

                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    reply.status,
                    reason(reply.status),
                    reply.declared_length.unwrap_or(reply.body.len())
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&reply.body);
                let _ = stream.flush();
            }
        });

        Self { base_url, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
