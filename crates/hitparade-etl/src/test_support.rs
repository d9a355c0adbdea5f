//! Canned HTTP responses on a local port for client tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// One canned reply, matched on the request path without its query.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(path: &str, status: u16, body: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// A listener bound to a random local port. Routes are supplied after
/// binding so response bodies can point back at [`MockServer::url`].
#[derive(Debug)]
pub struct MockServer {
    listener: TcpListener,
    base_url: String,
}

impl MockServer {
    pub fn bind() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, base_url }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Serve `routes` on a background thread. Unknown paths get a 404.
    pub fn serve(self, routes: Vec<Route>) -> String {
        let base_url = self.base_url.clone();
        thread::spawn(move || {
            for stream in self.listener.incoming() {
                let Ok(stream) = stream else { break };
                if let Err(e) = respond(stream, &routes) {
                    log::debug!("mock server write failed: {e}");
                }
            }
        });
        base_url
    }
}

fn respond(mut stream: TcpStream, routes: &[Route]) -> std::io::Result<()> {
    let Some(path) = read_request_path(&stream) else {
        return Ok(());
    };
    let (status, body) = match routes.iter().find(|route| route.path == path) {
        Some(route) => (route.status, route.body.as_str()),
        None => (404, ""),
    };

    let reply = format!(
        "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    );
    stream.write_all(reply.as_bytes())?;
    stream.flush()
}

/// Reads the request head and any body, returning the path.
fn read_request_path(stream: &TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    let mut content_length = 0;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 || header.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;

    let target = request_line.split_whitespace().nth(1)?;
    Some(target.split('?').next().unwrap_or(target).to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
