//! Canned movie records loaded from JSON files.
//!
//! The repository ships `fixtures/movies/transformer.json` and
//! `fixtures/movies/batman.json`. Any failure to read or decode them is
//! returned as a `FixtureError` that keeps the path and the underlying cause.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Movie;

pub const TRANSFORMER_IMDB_ID: &str = "tt0418279";
pub const BATMAN_IMDB_ID: &str = "tt0372784";

const TRANSFORMER_FILE: &str = "transformer.json";
const BATMAN_FILE: &str = "batman.json";

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse fixture {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn parse_movie(json: &str) -> Result<Movie, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load_movie(path: impl AsRef<Path>) -> Result<Movie, FixtureError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let movie = parse_movie(&raw).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), imdb_id = %movie.imdb_id, "loaded fixture");
    Ok(movie)
}

/// The two movies every scenario starts from.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub transformer: Movie,
    pub batman: Movie,
}

impl Fixtures {
    /// `fixtures/movies` at the workspace root.
    pub fn default_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("fixtures")
            .join("movies")
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let dir = dir.as_ref();
        Ok(Self {
            transformer: load_movie(dir.join(TRANSFORMER_FILE))?,
            batman: load_movie(dir.join(BATMAN_FILE))?,
        })
    }

    pub fn load_default() -> Result<Self, FixtureError> {
        Self::load(Self::default_dir())
    }
}
