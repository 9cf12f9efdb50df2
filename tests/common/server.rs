//! A minimal HTTP/1.1 server serving one resource with range support.
//!
//! Every connection handles a single request and is closed afterwards.

use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Path under which the resource is served.
pub const RESOURCE_PATH: &str = "/files/payload.bin";

/// How the resource is served.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub body: Vec<u8>,
    /// Value of the `Content-MD5` header.
    pub content_md5: Option<String>,
    /// Leave `Content-Length` out of `HEAD` responses.
    pub omit_length: bool,
    /// Range starts answered with `500`, and how many times. `u32::MAX`
    /// fails forever.
    pub failing_starts: HashMap<u64, u32>,
    /// Range starts whose body is cut in half, and how many times.
    pub truncated_starts: HashMap<u64, u32>,
    /// Range starts whose body is sent after a pause.
    pub slow_starts: HashSet<u64>,
    /// Size reported by `HEAD` and `Content-Range` instead of the body length.
    /// Ranges are still served from the actual body.
    pub announced_length: Option<u64>,
}

impl Fixture {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            ..Fixture::default()
        }
    }

    pub fn content_md5(mut self, value: impl Into<String>) -> Self {
        self.content_md5 = Some(value.into());
        self
    }

    pub fn omit_length(mut self) -> Self {
        self.omit_length = true;
        self
    }

    pub fn fail(mut self, start: u64, times: u32) -> Self {
        self.failing_starts.insert(start, times);
        self
    }

    pub fn truncate(mut self, start: u64, times: u32) -> Self {
        self.truncated_starts.insert(start, times);
        self
    }

    pub fn announce(mut self, length: u64) -> Self {
        self.announced_length = Some(length);
        self
    }

    pub fn slow(mut self, start: u64) -> Self {
        self.slow_starts.insert(start);
        self
    }
}

#[derive(Default)]
struct State {
    heads: AtomicUsize,
    gets: AtomicUsize,
    range_hits: Mutex<HashMap<u64, u32>>,
}

pub struct FixtureServer {
    addr: SocketAddr,
    state: Arc<State>,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start(fixture: Fixture) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind the fixture server");
        let addr = listener.local_addr().expect("Failed to read the local address");
        let state = Arc::new(State::default());
        let fixture = Arc::new(fixture);

        let shared = state.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let fixture = fixture.clone();
                let state = shared.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &fixture, &state).await;
                });
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// URL of the served resource.
    pub fn url(&self) -> Url {
        self.url_for(RESOURCE_PATH)
    }

    pub fn url_for(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).expect("Invalid fixture URL")
    }

    /// Number of `GET` requests whose range started at `start`.
    pub fn hits(&self, start: u64) -> u32 {
        let hits = self.state.range_hits.lock().expect("poisoned");
        hits.get(&start).copied().unwrap_or(0)
    }

    pub fn head_count(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A URL on which nothing listens.
pub async fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read the local address");
    drop(listener);
    Url::parse(&format!("http://{}{}", addr, RESOURCE_PATH)).expect("Invalid URL")
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 16 * 1024 {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn parse_range(request: &str) -> Option<(u64, Option<u64>)> {
    let value = request.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("range")
            .then(|| value.trim().to_string())
    })?;
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()))
}

/// Whether the `previous + 1`-th request for `start` is affected by `map`.
fn applies(map: &HashMap<u64, u32>, previous: u32, start: u64) -> bool {
    map.get(&start).is_some_and(|&times| previous < times)
}

async fn serve(mut stream: TcpStream, fixture: &Fixture, state: &State) -> std::io::Result<()> {
    let request = read_request(&mut stream).await?;
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    let available = fixture.body.len() as u64;
    let total = fixture.announced_length.unwrap_or(available);

    if path != RESOURCE_PATH {
        let head = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
        stream.write_all(head.as_bytes()).await?;
        return stream.shutdown().await;
    }

    let mut md5_header = String::new();
    if let Some(ref md5) = fixture.content_md5 {
        md5_header = format!("Content-MD5: {}\r\n", md5);
    }

    if method == "HEAD" {
        state.heads.fetch_add(1, Ordering::SeqCst);
        let length = if fixture.omit_length {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", total)
        };
        let head = format!(
            "HTTP/1.1 200 OK\r\n{}{}Accept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            length, md5_header
        );
        stream.write_all(head.as_bytes()).await?;
        return stream.shutdown().await;
    }

    state.gets.fetch_add(1, Ordering::SeqCst);
    let Some((start, end)) = parse_range(&request) else {
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            available, md5_header
        );
        stream.write_all(head.as_bytes()).await?;
        stream.write_all(&fixture.body).await?;
        return stream.shutdown().await;
    };

    let previous = {
        let mut hits = state.range_hits.lock().expect("poisoned");
        let entry = hits.entry(start).or_insert(0);
        *entry += 1;
        *entry - 1
    };

    if applies(&fixture.failing_starts, previous, start) {
        let head = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
        stream.write_all(head.as_bytes()).await?;
        return stream.shutdown().await;
    }

    if available == 0 || start >= available {
        let head = format!(
            "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            total
        );
        stream.write_all(head.as_bytes()).await?;
        return stream.shutdown().await;
    }

    let last = end.unwrap_or(total - 1).min(available - 1);
    let body = &fixture.body[start as usize..=last as usize];
    let head = format!(
        "HTTP/1.1 206 Partial Content\r\nContent-Range: bytes {}-{}/{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        start,
        last,
        total,
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;

    if fixture.slow_starts.contains(&start) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    if applies(&fixture.truncated_starts, previous, start) {
        // Promise the whole range, deliver half of it and hang up.
        stream.write_all(&body[..body.len() / 2]).await?;
        stream.flush().await?;
        return stream.shutdown().await;
    }

    stream.write_all(body).await?;
    stream.shutdown().await
}
