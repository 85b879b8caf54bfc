//! Stateless HTTP request builder and response parser for the movie API.
//!
//! # Design
//! `MovieClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller (usually `MovieProxy`) executes the
//! round-trip in between.
//!
//! Add and update only report their status: a mismatch is logged and the
//! observed code returned. Delete turns a mismatch into an error carrying the
//! status and body. Lookups map 404 to `NotFound`.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Movie, OneOrMany};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;

/// Synchronous, stateless client for the movie API.
#[derive(Debug, Clone)]
pub struct MovieClient {
    base_url: String,
}

impl MovieClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_add_movie(&self, movie: &Movie) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, format!("{}/movies", self.base_url), movie)
    }

    pub fn build_list_movies(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/movies", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_movie_by_imdb_id(&self, imdb_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.movie_path(imdb_id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `{base}/movies/{imdbId}` with the id encoded as a single path segment.
    fn movie_path(&self, imdb_id: &str) -> String {
        format!("{}/movies/{}", self.base_url, urlencoding::encode(imdb_id))
    }

    pub fn build_update_movie(&self, movie: &Movie) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, format!("{}/movies", self.base_url), movie)
    }

    pub fn build_delete_movie(&self, imdb_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.movie_path(imdb_id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Report the status of an add. Anything but 201 is logged, not raised.
    pub fn parse_add_movie(&self, response: HttpResponse) -> u16 {
        self.check_created(response.status);
        response.status
    }

    pub fn parse_list_movies(&self, response: HttpResponse) -> Result<Vec<Movie>, ApiError> {
        check_status(&response, STATUS_OK)?;
        serde_json::from_str::<OneOrMany<Movie>>(&response.body)
            .map(OneOrMany::into_vec)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_movie_by_imdb_id(&self, response: HttpResponse) -> Result<Movie, ApiError> {
        check_status(&response, STATUS_OK)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Report the status of an update. Anything but 200 is logged, not raised.
    pub fn parse_update_movie(&self, response: HttpResponse) -> u16 {
        self.check_ok(response.status);
        response.status
    }

    pub fn parse_delete_movie(&self, response: HttpResponse) -> Result<u16, ApiError> {
        if response.status != STATUS_OK {
            tracing::warn!(status = response.status, body = %response.body, "delete failed");
            return Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.status)
    }

    /// `true` when `status` is 201; logs the observed code otherwise.
    pub fn check_created(&self, status: u16) -> bool {
        expect_status(status, STATUS_CREATED)
    }

    /// `true` when `status` is 200; logs the observed code otherwise.
    pub fn check_ok(&self, status: u16) -> bool {
        expect_status(status, STATUS_OK)
    }
}

fn json_request(method: HttpMethod, path: String, movie: &Movie) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(movie).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn expect_status(status: u16, expected: u16) -> bool {
    if status == expected {
        return true;
    }
    tracing::warn!(status, expected, "Failed : HTTP error code : {status}");
    false
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
