//! Typed proxy over the remote movie service.
//!
//! # Design
//! `MovieProxy` binds a `MovieClient` to a `Transport`. Each method builds
//! the request, sends it, and parses the response inside the scope of a
//! `ResponseGuard`, so the response is released before the method returns,
//! whatever the outcome. `add_movie_response` is the one exception: it hands
//! the open guard to the caller, who may hold several responses at once.

use crate::client::MovieClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ResponseGuard, Transport, UreqTransport};
use crate::types::Movie;

pub struct MovieProxy<T = UreqTransport> {
    client: MovieClient,
    transport: T,
}

impl MovieProxy<UreqTransport> {
    /// Proxy over a ureq transport, pooled when the config asks for it.
    pub fn connect(config: &ClientConfig) -> Self {
        let transport = match &config.pool {
            Some(pool) => UreqTransport::pooled(pool),
            None => UreqTransport::new(),
        };
        Self::with_transport(MovieClient::new(&config.base_url), transport)
    }

    /// Close the transport and its connection pool.
    pub fn close(self) {
        self.transport.close();
    }
}

impl<T: Transport> MovieProxy<T> {
    pub fn with_transport(client: MovieClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &MovieClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST the movie and return the observed status (201 expected).
    pub fn add_movie(&self, movie: &Movie) -> Result<u16, ApiError> {
        let request = self.client.build_add_movie(movie)?;
        let response = self.execute(request)?;
        Ok(self.client.parse_add_movie(response))
    }

    /// POST the movie and return the still-open response.
    pub fn add_movie_response(&self, movie: &Movie) -> Result<ResponseGuard, ApiError> {
        let request = self.client.build_add_movie(movie)?;
        self.transport.send(request)
    }

    pub fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        let response = self.execute(self.client.build_list_movies())?;
        self.client.parse_list_movies(response)
    }

    pub fn movie_by_imdb_id(&self, imdb_id: &str) -> Result<Movie, ApiError> {
        let response = self.execute(self.client.build_movie_by_imdb_id(imdb_id))?;
        self.client.parse_movie_by_imdb_id(response)
    }

    /// PUT the movie and return the observed status (200 expected).
    pub fn update_movie(&self, movie: &Movie) -> Result<u16, ApiError> {
        let request = self.client.build_update_movie(movie)?;
        let response = self.execute(request)?;
        Ok(self.client.parse_update_movie(response))
    }

    /// DELETE the movie. Any status but 200 becomes `ApiError::HttpError`.
    pub fn delete_movie(&self, imdb_id: &str) -> Result<u16, ApiError> {
        let response = self.execute(self.client.build_delete_movie(imdb_id))?;
        self.client.parse_delete_movie(response)
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.send(request)?.into_response()
    }
}
