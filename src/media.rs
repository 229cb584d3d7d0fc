//! Media kinds and the lenient record shapes read from TMDB responses.
//!
//! Every field the renderer looks at is optional so that a sparse or odd
//! provider payload degrades to fallback text instead of failing to parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            _ => Err(anyhow::anyhow!("media type must be 'movie' or 'tv'")),
        }
    }
}

/// Search scope. `Multi` spans movies, series and people in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    #[default]
    Movie,
    Tv,
    Multi,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Movie => "movie",
            SearchType::Tv => "tv",
            SearchType::Multi => "multi",
        }
    }
}

impl From<MediaType> for SearchType {
    fn from(media: MediaType) -> Self {
        match media {
            MediaType::Movie => SearchType::Movie,
            MediaType::Tv => SearchType::Tv,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "movie" => Ok(SearchType::Movie),
            "tv" => Ok(SearchType::Tv),
            "multi" => Ok(SearchType::Multi),
            _ => Err(anyhow::anyhow!("search type must be 'movie', 'tv' or 'multi'")),
        }
    }
}

/// Page of trending, search or recommendation results. Only page 1 is ever requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Option<Vec<MediaSummary>>,
}

impl SearchResults {
    pub fn into_items(self) -> Vec<MediaSummary> {
        self.results.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaSummary {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub name: Option<String>,
    /// Raw kind as sent by the provider; multi search also yields `person`.
    pub media_type: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
}

impl MediaSummary {
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or("")
    }

    /// Movies carry `title` and `release_date`, series `name` and `first_air_date`.
    pub fn date(&self) -> Option<&str> {
        let (primary, secondary) = if self.title.is_some() {
            (&self.release_date, &self.first_air_date)
        } else {
            (&self.first_air_date, &self.release_date)
        };
        non_empty(primary.as_deref()).or_else(|| non_empty(secondary.as_deref()))
    }

    /// Id usable in a detail request; zero or absent ids cannot be opened.
    pub fn tmdb_id(&self) -> Option<u64> {
        self.id.filter(|id| *id > 0)
    }

    /// Kind to open the detail view with; `None` for anything that is not a movie or series.
    pub fn kind(&self, fallback: MediaType) -> Option<MediaType> {
        match self.media_type.as_deref() {
            None | Some("") => Some(fallback),
            Some(raw) => raw.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailRecord {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub vote_average: Option<f64>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Option<Vec<CastMember>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastMember {
    pub name: Option<String>,
    pub character: Option<String>,
}

/// Detail record joined with its cast, as shown in the modal.
#[derive(Debug, Clone, Default)]
pub struct MediaDetail {
    pub details: DetailRecord,
    pub cast: Vec<CastMember>,
}

impl MediaDetail {
    pub fn join(details: DetailRecord, credits: Credits) -> Self {
        Self {
            details,
            cast: credits.cast.unwrap_or_default(),
        }
    }

    pub fn is_movie(&self) -> bool {
        self.details.title.is_some()
    }

    pub fn display_title(&self) -> &str {
        non_empty(self.details.title.as_deref())
            .or_else(|| non_empty(self.details.name.as_deref()))
            .unwrap_or("")
    }

    pub fn date(&self) -> Option<&str> {
        if self.is_movie() {
            non_empty(self.details.release_date.as_deref())
        } else {
            non_empty(self.details.first_air_date.as_deref())
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
