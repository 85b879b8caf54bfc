//! Blocking client for the movie CRUD service.
//!
//! # Overview
//! `MovieClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. A `Transport` performs the round-trip and
//! returns a `ResponseGuard` that releases the response when dropped.
//! `MovieProxy` combines the two into one method per remote endpoint.
//!
//! # Design
//! - `MovieClient` is stateless and holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the client is testable without a server.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod proxy;
pub mod transport;
pub mod types;

pub use client::MovieClient;
pub use config::{ClientConfig, PoolConfig};
pub use error::ApiError;
pub use fixtures::{FixtureError, Fixtures};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use proxy::MovieProxy;
pub use transport::{ReleaseTracker, ResponseGuard, Transport, UreqTransport};
pub use types::Movie;
