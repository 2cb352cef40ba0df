//! Test fixtures for the HTTP document store
//!
//! [`MockEngine`] listens on a loopback port and answers each incoming
//! connection with the next canned response, recording what it received.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;

use serde_json::Value;
use shared::EngineConfig;

/// One request as seen by the mock engine
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/index1/_doc/employee:1?refresh=wait_for`
    pub target: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Canned-response engine on 127.0.0.1
pub struct MockEngine {
    port: u16,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl MockEngine {
    /// Serve `responses` in order, one connection per response
    pub fn serve(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        let handle = std::thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().unwrap();
                    answer(stream, status, &body)
                })
                .collect()
        });

        Self { port, handle }
    }

    /// Client configuration pointing at this engine
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            timeout_ms: 2_000,
            connect_timeout_ms: 500,
            page_size: 2,
            ..EngineConfig::default()
        }
    }

    /// Wait until every canned response was served
    pub fn requests(self) -> Vec<RecordedRequest> {
        self.handle.join().unwrap()
    }
}

fn answer(stream: TcpStream, status: u16, body: &str) -> RecordedRequest {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut request_body = vec![0; content_length];
    reader.read_exact(&mut request_body).unwrap();

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .unwrap();
    stream.flush().unwrap();

    RecordedRequest {
        method,
        target,
        body: String::from_utf8(request_body).unwrap(),
    }
}
