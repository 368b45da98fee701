//! Shared fixtures for integration tests: a live server on a random port and a
//! minimal raw-HTTP client.

#![allow(dead_code)]

use pkgmeta::server::{Server, ServerHandle};
use serde_json::Value;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Once;
use std::time::Duration;

static MAY_INIT: Once = Once::new();

/// Configure the may runtime once per test binary.
pub fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x40000);
    });
}

/// Reserve an ephemeral port on localhost.
pub fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Running server, stopped on drop.
pub struct TestServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
}

impl TestServer {
    /// Start `server` (which must have been created with [`free_addr`]).
    pub fn start(server: Server) -> Self {
        setup_may_runtime();
        let handle = server.start().unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.addr();
        Self {
            handle: Some(handle),
            addr,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn get(&self, path: &str) -> Reply {
        self.send("GET", path, &[], None)
    }

    pub fn post_json(&self, path: &str, body: &str) -> Reply {
        self.send("POST", path, &[("Content-Type", "application/json")], Some(body))
    }

    pub fn send(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Reply {
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        let body = body.unwrap_or("");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
        send_request(&self.addr, &req)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

/// Parsed HTTP response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: Value,
}

/// Write a raw request and read exactly one response (headers plus `Content-Length` body).
pub fn send_request(addr: &SocketAddr, req: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream.write_all(req.as_bytes()).unwrap();

    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut tmp).unwrap();
        assert!(n > 0, "connection closed before response headers");
        buf.extend_from_slice(&tmp[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut status = 0;
    let mut content_type = String::new();
    let mut content_length = 0usize;
    for line in head.lines() {
        if line.starts_with("HTTP/1.1") {
            status = line
                .split_whitespace()
                .nth(1)
                .unwrap_or("0")
                .parse()
                .unwrap();
        } else if let Some((name, val)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-type") {
                content_type = val.trim().to_string();
            } else if name.eq_ignore_ascii_case("content-length") {
                content_length = val.trim().parse().unwrap();
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).unwrap();
        assert!(n > 0, "connection closed before response body");
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = &buf[header_end..header_end + content_length];
    let body = serde_json::from_slice(body).unwrap_or(Value::Null);

    Reply {
        status,
        content_type,
        body,
    }
}
