//! Executes `HttpRequest`s and hands back scoped responses.
//!
//! # Design
//! A `Transport` returns a `ResponseGuard` that owns the open response. The
//! guard releases the underlying connection when dropped, so every exit path
//! (early return, `?`, panic) frees it exactly once. Each transport owns a
//! `ReleaseTracker` that counts acquisitions and releases.

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::PoolConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs the network round-trip for a built request.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<ResponseGuard, ApiError>;
}

/// Shared counters of responses acquired and released through a transport.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTracker {
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl ReleaseTracker {
    pub fn acquired(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Responses handed out but not yet released.
    pub fn outstanding(&self) -> usize {
        self.acquired() - self.released()
    }

    fn acquire(&self) {
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// An open HTTP response. Dropping it releases the connection.
pub struct ResponseGuard {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Box<dyn Read>>,
    tracker: ReleaseTracker,
}

impl ResponseGuard {
    pub fn new(
        status: u16,
        headers: Vec<(String, String)>,
        body: impl Read + 'static,
        tracker: ReleaseTracker,
    ) -> Self {
        tracker.acquire();
        Self {
            status,
            headers,
            body: Some(Box::new(body)),
            tracker,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Read the whole body and release the response.
    pub fn into_response(mut self) -> Result<HttpResponse, ApiError> {
        let mut body = String::new();
        if let Some(mut reader) = self.body.take() {
            reader
                .read_to_string(&mut body)
                .map_err(|e| ApiError::TransportError(e.to_string()))?;
        }
        Ok(HttpResponse {
            status: self.status,
            headers: std::mem::take(&mut self.headers),
            body,
        })
    }

    /// Release the response without reading the body.
    pub fn close(self) {}
}

impl Drop for ResponseGuard {
    fn drop(&mut self) {
        self.body.take();
        self.tracker.release();
        tracing::trace!(status = self.status, "response released");
    }
}

impl std::fmt::Debug for ResponseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGuard")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_read", &self.body.is_none())
            .finish()
    }
}

/// Blocking transport backed by a `ureq::Agent` and its connection pool.
///
/// Status codes are returned as data, never as `Err`, so the client decides
/// what a 4xx/5xx means.
pub struct UreqTransport {
    agent: ureq::Agent,
    tracker: ReleaseTracker,
}

impl UreqTransport {
    /// Agent with ureq's default pool settings.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Agent whose idle-connection pool is sized explicitly.
    pub fn pooled(pool: &PoolConfig) -> Self {
        tracing::debug!(
            max_idle = pool.max_idle_connections,
            max_idle_per_host = pool.max_idle_connections_per_host,
            "configuring connection pool"
        );
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections(pool.max_idle_connections)
            .max_idle_connections_per_host(pool.max_idle_connections_per_host)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            tracker: ReleaseTracker::default(),
        }
    }

    pub fn tracker(&self) -> &ReleaseTracker {
        &self.tracker
    }

    /// Drop the agent and every pooled connection it holds.
    pub fn close(self) {
        let outstanding = self.tracker.outstanding();
        if outstanding > 0 {
            tracing::warn!(outstanding, "closing connection pool with open responses");
        }
        tracing::debug!(
            acquired = self.tracker.acquired(),
            released = self.tracker.released(),
            "connection pool closed"
        );
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<ResponseGuard, ApiError> {
        tracing::debug!(method = %request.method, url = %request.path, "sending request");

        let headers = &request.headers;
        let path = &request.path;
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(path), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(path), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(path), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(path), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(path), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(path), headers).send_empty(),
        };
        let response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        tracing::debug!(status, url = %request.path, "response received");

        Ok(ResponseGuard::new(
            status,
            response_headers,
            response.into_body().into_reader(),
            self.tracker.clone(),
        ))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn into_response_reads_body_and_releases() {
        let tracker = ReleaseTracker::default();
        let guard = ResponseGuard::new(200, Vec::new(), Cursor::new("Movie deleted"), tracker.clone());
        assert_eq!(tracker.outstanding(), 1);

        let response = guard.into_response().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "Movie deleted");
        assert_eq!(tracker.acquired(), 1);
        assert_eq!(tracker.released(), 1);
    }

    #[test]
    fn close_releases_without_reading() {
        let tracker = ReleaseTracker::default();
        let guard = ResponseGuard::new(201, Vec::new(), Cursor::new("ignored"), tracker.clone());
        assert_eq!(guard.status(), 201);
        guard.close();
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn failed_read_still_releases() {
        let tracker = ReleaseTracker::default();
        let guard = ResponseGuard::new(200, Vec::new(), FailingReader, tracker.clone());
        let err = guard.into_response().unwrap_err();
        assert!(matches!(err, ApiError::TransportError(_)));
        assert_eq!(tracker.released(), 1);
    }

    #[test]
    fn tracker_counts_across_clones() {
        let tracker = ReleaseTracker::default();
        let first = ResponseGuard::new(201, Vec::new(), io::empty(), tracker.clone());
        let second = ResponseGuard::new(201, Vec::new(), io::empty(), tracker.clone());
        assert_eq!(tracker.outstanding(), 2);
        drop(first);
        assert_eq!(tracker.outstanding(), 1);
        drop(second);
        assert_eq!(tracker.acquired(), 2);
        assert_eq!(tracker.released(), 2);
    }

    #[test]
    fn transport_error_on_refused_connection() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::new();
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: format!("http://{addr}/movies"),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.send(request).unwrap_err();
        assert!(matches!(err, ApiError::TransportError(_)));
        assert_eq!(transport.tracker().acquired(), 0);
    }
}
