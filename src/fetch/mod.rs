// src/fetch/mod.rs

use chrono::NaiveDate;
use scraper::Html;
use std::fmt;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{BoxesError, FetchError};

pub mod session;
pub mod urls;

/// Anything that can hand back the raw bytes behind a URL.
///
/// Retries, throttling and status handling are the implementor's business;
/// the pipeline only sees bytes or a [`FetchError`].
pub trait PageSource {
    /// Root every box score path is joined onto.
    fn base_url(&self) -> &Url;

    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Site convention for telling the games of one day apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Doubleheader {
    #[default]
    Single,
    First,
    Second,
}

impl Doubleheader {
    pub fn index(self) -> u8 {
        match self {
            Doubleheader::Single => 0,
            Doubleheader::First => 1,
            Doubleheader::Second => 2,
        }
    }
}

impl TryFrom<u8> for Doubleheader {
    type Error = BoxesError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Doubleheader::Single),
            1 => Ok(Doubleheader::First),
            2 => Ok(Doubleheader::Second),
            other => Err(BoxesError::validation(format!(
                "doubleheader index must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

impl fmt::Display for Doubleheader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A fetched page: where it came from and its parsed tree.
pub struct Page {
    pub url: Url,
    pub doc: Html,
}

/// Download one box score page and parse it.
///
/// The body is decoded as UTF-8 no matter what charset the server claims;
/// the site mislabels its pages and accented names come out garbled otherwise.
#[instrument(level = "debug", skip(source))]
pub fn fetch_page<S: PageSource + ?Sized>(
    source: &S,
    team: &str,
    date: NaiveDate,
    game: Doubleheader,
) -> Result<Page, BoxesError> {
    urls::validate_team(team)?;
    let url = urls::box_score_url(source.base_url(), team, date, game).map_err(FetchError::from)?;
    debug!(%url, "fetching box score");

    let bytes = source.get(&url)?;
    let text = decode_body(&url, bytes)?;
    let doc = Html::parse_document(&text);
    Ok(Page { url, doc })
}

fn decode_body(url: &Url, bytes: Vec<u8>) -> Result<String, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::EmptyBody {
            url: url.to_string(),
        });
    }
    String::from_utf8(bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}
