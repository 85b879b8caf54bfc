//! Domain DTOs for the movie API.
//!
//! # Design
//! `Movie` is defined independently from the mock-server's schema; the
//! integration tests catch drift between the two. Only `imdbId` and `title`
//! are required. Unknown fields are ignored on input and absent optional
//! fields are left out of the output, so payloads from richer servers still
//! deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A movie record as exchanged with the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "movie_date")]
    pub released: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metascore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl Movie {
    /// Two values describe the same record when their imdbId matches; the
    /// remaining fields may differ between local copies and the server.
    pub fn same_record(&self, other: &Movie) -> bool {
        self.imdb_id == other.imdb_id
    }
}

/// A JSON value that may be either a list or a single element standing in
/// for a one-element list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Serde codec for dates in the `EEE, dd MMM yyyy HH:mm:ss zzz` layout,
/// e.g. `Fri, 10 Jun 2016 00:00:00 GMT`.
///
/// Parsing is lenient: the weekday may be missing or disagree with the date,
/// and the zone may be a name from `ZONES`, `GMT±hh:mm` or a bare `±hhmm`.
/// Output is always in GMT.
pub mod movie_date {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use thiserror::Error;

    pub const FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

    const LOCAL_FORMAT: &str = "%d %b %Y %H:%M:%S";

    /// Zone abbreviations and their offsets in minutes east of UTC.
    const ZONES: &[(&str, i32)] = &[
        ("GMT", 0),
        ("UT", 0),
        ("UTC", 0),
        ("Z", 0),
        ("WET", 0),
        ("BST", 60),
        ("CET", 60),
        ("WEST", 60),
        ("CEST", 120),
        ("EET", 120),
        ("EEST", 180),
        ("MSK", 180),
        ("IST", 330),
        ("JST", 540),
        ("AEST", 600),
        ("EST", -300),
        ("EDT", -240),
        ("CST", -360),
        ("CDT", -300),
        ("MST", -420),
        ("MDT", -360),
        ("PST", -480),
        ("PDT", -420),
    ];

    #[derive(Debug, Error)]
    pub enum MovieDateError {
        #[error("missing time zone in {0:?}")]
        MissingZone(String),

        #[error("unknown time zone {0:?}")]
        UnknownZone(String),

        #[error("invalid date {input:?}: {source}")]
        Invalid {
            input: String,
            #[source]
            source: chrono::ParseError,
        },
    }

    pub fn format(date: &DateTime<Utc>) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, MovieDateError> {
        let s = s.trim();
        // The weekday is dropped, never checked.
        let rest = match s.split_once(',') {
            Some((_, rest)) => rest.trim_start(),
            None => s,
        };
        let (local, zone) = rest
            .rsplit_once(' ')
            .ok_or_else(|| MovieDateError::MissingZone(s.to_string()))?;
        let offset = zone_offset(zone).ok_or_else(|| MovieDateError::UnknownZone(zone.to_string()))?;
        let naive = NaiveDateTime::parse_from_str(local.trim(), LOCAL_FORMAT).map_err(|source| {
            MovieDateError::Invalid {
                input: s.to_string(),
                source,
            }
        })?;
        Ok(Utc.from_utc_datetime(&(naive - offset)))
    }

    fn zone_offset(zone: &str) -> Option<FixedOffset> {
        let zone = zone.to_ascii_uppercase();
        if let Some((_, minutes)) = ZONES.iter().find(|(name, _)| *name == zone) {
            return FixedOffset::east_opt(minutes * 60);
        }
        let numeric = zone
            .strip_prefix("GMT")
            .or_else(|| zone.strip_prefix("UTC"))
            .unwrap_or(zone.as_str());
        numeric_offset(numeric)
    }

    /// `+hh`, `+h`, `+hhmm` or `+hh:mm`, with either sign.
    fn numeric_offset(s: &str) -> Option<FixedOffset> {
        let (sign, digits) = match s.as_bytes().first()? {
            b'+' => (1, &s[1..]),
            b'-' => (-1, &s[1..]),
            _ => return None,
        };
        let (hours, minutes) = match digits.split_once(':') {
            Some(parts) => parts,
            None if digits.len() > 2 => digits.split_at(digits.len() - 2),
            None => (digits, "0"),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hours) || !all_digits(minutes) {
            return None;
        }
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }

    pub fn serialize<S: Serializer>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&format(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => parse(&s).map(Some).map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_movie_date_format() {
        let date = movie_date::parse("Fri, 10 Jun 2016 00:00:00 GMT").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2016, 6, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_utc_zone_name() {
        let date = movie_date::parse("Tue, 03 Jul 2007 12:30:00 UTC").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2007, 7, 3, 12, 30, 0).unwrap());
    }

    #[test]
    fn formats_movie_date() {
        let date = Utc.with_ymd_and_hms(2016, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(movie_date::format(&date), "Fri, 10 Jun 2016 00:00:00 GMT");
    }

    #[test]
    fn rejects_garbage_date() {
        assert!(movie_date::parse("10/06/2016").is_err());
        assert!(movie_date::parse("Fri, 10 Foo 2016 00:00:00 GMT").is_err());
    }

    fn june_tenth() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 6, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_zone_abbreviations() {
        assert_eq!(movie_date::parse("Fri, 10 Jun 2016 01:00:00 CET").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("Fri, 10 Jun 2016 02:00:00 CEST").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("Thu, 09 Jun 2016 17:00:00 PDT").unwrap(), june_tenth());
    }

    #[test]
    fn parses_gmt_offsets() {
        assert_eq!(movie_date::parse("Fri, 10 Jun 2016 02:00:00 GMT+02:00").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("Thu, 09 Jun 2016 19:00:00 GMT-5").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("Fri, 10 Jun 2016 05:30:00 UTC+0530").unwrap(), june_tenth());
    }

    #[test]
    fn parses_bare_numeric_offsets() {
        assert_eq!(movie_date::parse("Thu, 09 Jun 2016 19:00:00 -0500").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("Fri, 10 Jun 2016 09:00:00 +09:00").unwrap(), june_tenth());
    }

    #[test]
    fn ignores_wrong_or_missing_weekday() {
        assert_eq!(movie_date::parse("Mon, 10 Jun 2016 00:00:00 GMT").unwrap(), june_tenth());
        assert_eq!(movie_date::parse("10 Jun 2016 00:00:00 GMT").unwrap(), june_tenth());
    }

    #[test]
    fn rejects_unknown_zone() {
        let err = movie_date::parse("Fri, 10 Jun 2016 00:00:00 XYZ").unwrap_err();
        assert!(matches!(err, movie_date::MovieDateError::UnknownZone(_)));
        let err = movie_date::parse("Fri, 10 Jun 2016 00:00:00 GMT+25:00").unwrap_err();
        assert!(matches!(err, movie_date::MovieDateError::UnknownZone(_)));
    }

    #[test]
    fn movie_uses_camel_case_names() {
        let movie = Movie {
            imdb_id: "tt0418279".to_string(),
            title: "Transformers".to_string(),
            imdb_rating: Some("7.1".to_string()),
            kind: Some("movie".to_string()),
            released: Some(Utc.with_ymd_and_hms(2007, 7, 3, 0, 0, 0).unwrap()),
            ..Movie::default()
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["imdbId"], "tt0418279");
        assert_eq!(json["imdbRating"], "7.1");
        assert_eq!(json["type"], "movie");
        assert_eq!(json["released"], "Tue, 03 Jul 2007 00:00:00 GMT");
        assert!(json.get("plot").is_none());
    }

    #[test]
    fn movie_ignores_unknown_fields() {
        let movie: Movie = serde_json::from_str(
            r#"{"imdbId":"tt0418279","title":"Transformers","boxOffice":"$319,246,193","Website":null}"#,
        )
        .unwrap();
        assert_eq!(movie.imdb_id, "tt0418279");
        assert!(movie.released.is_none());
    }

    #[test]
    fn movie_accepts_null_release_date() {
        let movie: Movie =
            serde_json::from_str(r#"{"imdbId":"tt1","title":"T","released":null}"#).unwrap();
        assert!(movie.released.is_none());
    }

    #[test]
    fn movie_rejects_missing_title() {
        let result: Result<Movie, _> = serde_json::from_str(r#"{"imdbId":"tt1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn same_record_compares_imdb_id_only() {
        let a = Movie {
            imdb_id: "tt0372784".to_string(),
            title: "Batman".to_string(),
            ..Movie::default()
        };
        let b = Movie {
            title: "Batman Begins".to_string(),
            ..a.clone()
        };
        assert!(a.same_record(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn one_or_many_accepts_single_value() {
        let one: OneOrMany<Movie> =
            serde_json::from_str(r#"{"imdbId":"tt1","title":"Only"}"#).unwrap();
        let movies = one.into_vec();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Only");

        let many: OneOrMany<Movie> = serde_json::from_str(r#"[]"#).unwrap();
        assert!(many.into_vec().is_empty());
    }
}
