//! Core data model: queries, results, pages, and wire-shape decoding.
//!
//! The query endpoint answers in one of two shapes: a bare array of results,
//! or an object tagged with the result-domain variant (`General` / `Images`)
//! alongside a `hasMore` continuation flag. Decoding happens exactly once at
//! this boundary, into the closed [`ResponseBody`] sum; unknown variants
//! degrade to an empty batch with a warning rather than an error.

use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

/// The category of content being searched. Each domain has its own slot
/// markup and batch size, but an identical indexing/fill contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultDomain {
    #[default]
    General,
    Images,
}

impl ResultDomain {
    /// Resolve a domain from the `t` tab parameter. Missing or unknown
    /// tabs fall back to the general listing.
    pub fn from_tab(tab: Option<&str>) -> Self {
        match tab {
            Some("images") => ResultDomain::Images,
            _ => ResultDomain::General,
        }
    }

    /// Tab identifier as it appears in query strings and form fields.
    pub fn as_tab(&self) -> &'static str {
        match self {
            ResultDomain::General => "general",
            ResultDomain::Images => "images",
        }
    }

    /// The key naming this domain's variant in a tagged response object.
    pub fn variant_key(&self) -> &'static str {
        match self {
            ResultDomain::General => "General",
            ResultDomain::Images => "Images",
        }
    }
}

/// The search text plus the active tab. Immutable for the lifetime of one
/// poll session; a new query begins a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub domain: ResultDomain,
}

impl Query {
    pub fn new(text: impl Into<String>, domain: ResultDomain) -> Self {
        Self {
            text: text.into(),
            domain,
        }
    }

    /// Build a query from search text and an optional tab name.
    pub fn from_parts(text: impl Into<String>, tab: Option<&str>) -> Self {
        Self::new(text, ResultDomain::from_tab(tab))
    }

    /// Extract the query from the page's addressable state: the `q` and `t`
    /// parameters of the page URL.
    pub fn from_url(page_url: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(page_url)?;
        let mut text = String::new();
        let mut tab = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "q" => text = value.into_owned(),
                "t" => tab = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(Self::from_parts(text, tab.as_deref()))
    }

    /// Form fields for re-submitting this query, including the hidden tab
    /// field the search form must carry before navigation.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.text.clone()),
            ("t", self.domain.as_tab().to_string()),
        ]
    }
}

/// Ordered contributing-source tags on a result.
///
/// Older protocol versions send a single `engine` string; newer ones send an
/// `engines` list. Both decode into the same ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineTags(pub Vec<String>);

impl<'de> Deserialize<'de> for EngineTags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Many(Vec<String>),
            One(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Many(tags) => EngineTags(tags),
            Raw::One(tag) => EngineTags(vec![tag]),
        })
    }
}

impl Deref for EngineTags {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One search result as delivered by the query endpoint. Fields beyond
/// these are ignored; the endpoint owns the full contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "engine")]
    pub engines: EngineTags,
    #[serde(default)]
    pub cached: bool,
}

/// An ordered batch of results plus the server's continuation flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub results: Vec<SearchResult>,
    pub has_more: bool,
}

impl ResultPage {
    /// Decode a raw response body. A bare array carries no continuation
    /// flag and therefore terminates the session; an object supplies
    /// `hasMore` alongside its tagged variant.
    pub fn decode(value: Value) -> Result<Self, serde_json::Error> {
        let has_more = value
            .get("hasMore")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let results = match ResponseBody::decode(value)? {
            ResponseBody::Bare(results) | ResponseBody::Tagged(_, results) => results,
            ResponseBody::Unrecognized => {
                warn!("unrecognized response variant, treating as empty batch");
                Vec::new()
            }
        };

        Ok(Self { results, has_more })
    }
}

/// The closed set of wire shapes the query endpoint may answer with.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A bare array of results (no continuation flag).
    Bare(Vec<SearchResult>),
    /// An object tagged with one result-domain variant key.
    Tagged(ResultDomain, Vec<SearchResult>),
    /// An object carrying none of the known variant keys.
    Unrecognized,
}

impl ResponseBody {
    pub fn decode(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(_) => Ok(ResponseBody::Bare(serde_json::from_value(value)?)),
            Value::Object(mut map) => {
                for domain in [ResultDomain::General, ResultDomain::Images] {
                    if let Some(inner) = map.remove(domain.variant_key()) {
                        return Ok(ResponseBody::Tagged(domain, serde_json::from_value(inner)?));
                    }
                }
                Ok(ResponseBody::Unrecognized)
            }
            _ => Ok(ResponseBody::Unrecognized),
        }
    }
}
