//! In-memory stand-in for the remote movie service.
//!
//! Movies are keyed by `imdbId`. Only `imdbId` and `title` are typed; every
//! other field is kept as raw JSON so whatever the client sends comes back
//! unchanged.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Path prefix under which the real service is deployed.
pub const API_PREFIX: &str = "/RestEasyTutorial/rest";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Movie>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/movies", post(add_movie).get(list_movies).put(update_movie))
        .route("/movies/{imdb_id}", get(movie_by_imdb_id).delete(delete_movie))
        .with_state(db)
}

/// Serve the API on `listener`, nested under `prefix` (empty or `/` serves at
/// the root).
pub async fn run(listener: TcpListener, prefix: &str) -> Result<(), std::io::Error> {
    let router = match prefix.trim_end_matches('/') {
        "" => app(),
        prefix => Router::new().nest(prefix, app()),
    };
    axum::serve(listener, router).await
}

async fn add_movie(
    State(db): State<Db>,
    Json(movie): Json<Movie>,
) -> Result<(StatusCode, Json<Movie>), (StatusCode, String)> {
    let mut movies = db.write().await;
    if movies.contains_key(&movie.imdb_id) {
        tracing::debug!(imdb_id = %movie.imdb_id, "movie already stored");
        return Err((
            StatusCode::CONFLICT,
            "Movie is Already in the database.".to_string(),
        ));
    }
    tracing::debug!(imdb_id = %movie.imdb_id, "movie added");
    movies.insert(movie.imdb_id.clone(), movie.clone());
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn list_movies(State(db): State<Db>) -> Json<Vec<Movie>> {
    let movies = db.read().await;
    Json(movies.values().cloned().collect())
}

async fn movie_by_imdb_id(
    State(db): State<Db>,
    Path(imdb_id): Path<String>,
) -> Result<Json<Movie>, StatusCode> {
    let movies = db.read().await;
    movies.get(&imdb_id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_movie(State(db): State<Db>, Json(movie): Json<Movie>) -> (StatusCode, String) {
    let mut movies = db.write().await;
    match movies.get_mut(&movie.imdb_id) {
        Some(stored) => {
            tracing::debug!(imdb_id = %movie.imdb_id, "movie updated");
            *stored = movie;
            (StatusCode::OK, "Movie updated".to_string())
        }
        None => (
            StatusCode::NOT_FOUND,
            "Movie is not in the database.\nUnable to Update".to_string(),
        ),
    }
}

async fn delete_movie(State(db): State<Db>, Path(imdb_id): Path<String>) -> (StatusCode, String) {
    let mut movies = db.write().await;
    match movies.remove(&imdb_id) {
        Some(_) => {
            tracing::debug!(imdb_id = %imdb_id, "movie deleted");
            (StatusCode::OK, "Movie deleted".to_string())
        }
        None => (
            StatusCode::NOT_FOUND,
            "Movie not found, unable to delete".to_string(),
        ),
    }
}
