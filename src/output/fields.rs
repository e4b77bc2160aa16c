//! Record field selection
//!
//! Every record is a list of fields picked by name from a fixed vocabulary:
//!
//! | name | value |
//! |------|-------|
//! | `url` | the requested URL |
//! | `path` | the requested path |
//! | `query` | the query parameters, re-encoded sorted by key |
//! | `nurls` | number of crawlable URLs found on the page |
//! | `origin` | the page the URL was found on |
//! | `originpath` | the path of that page |
//! | `status` | the HTTP status code |
//! | `head` | time until headers were received |
//! | `duration` | time until the whole response was read and parsed |
//! | `header.<Name>` | a response header |
//! | `meta.<key>` | a `<meta>` tag by `property` or `name` |
//! | `query.<key>` | one query parameter |
//!
//! Missing values render as a configurable fallback placeholder.

use crate::crawler::FetchResult;
use crate::{ConfigError, ConfigResult};
use std::fmt;
use std::str::FromStr;

/// One selectable record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Url,
    Path,
    Query,
    NumUrls,
    Origin,
    OriginPath,
    Status,
    Head,
    Duration,
    Header(String),
    Meta(String),
    QueryParam(String),
}

impl FromStr for Field {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || ConfigError::UnknownField(name.to_string());

        if let Some((prefix, key)) = name.split_once('.') {
            if key.is_empty() {
                return Err(unknown());
            }
            return match prefix {
                "header" => Ok(Self::Header(key.to_string())),
                "meta" => Ok(Self::Meta(key.to_string())),
                "query" => Ok(Self::QueryParam(key.to_string())),
                _ => Err(unknown()),
            };
        }

        match name {
            "url" => Ok(Self::Url),
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "nurls" => Ok(Self::NumUrls),
            "origin" => Ok(Self::Origin),
            "originpath" => Ok(Self::OriginPath),
            "status" => Ok(Self::Status),
            "head" => Ok(Self::Head),
            "duration" => Ok(Self::Duration),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("url"),
            Self::Path => f.write_str("path"),
            Self::Query => f.write_str("query"),
            Self::NumUrls => f.write_str("nurls"),
            Self::Origin => f.write_str("origin"),
            Self::OriginPath => f.write_str("originpath"),
            Self::Status => f.write_str("status"),
            Self::Head => f.write_str("head"),
            Self::Duration => f.write_str("duration"),
            Self::Header(name) => write!(f, "header.{}", name),
            Self::Meta(key) => write!(f, "meta.{}", key),
            Self::QueryParam(key) => write!(f, "query.{}", key),
        }
    }
}

impl Field {
    /// Renders this field for `result`, or `fallback` when the value is missing
    pub fn render(&self, result: &FetchResult, fallback: &str) -> String {
        let value = match self {
            Self::Url => Some(result.url.to_string()),
            Self::Path => Some(result.url.path().to_string()),
            Self::Query => Some(sorted_query(result)).filter(|q| !q.is_empty()),
            Self::NumUrls => Some(result.urls.len().to_string()),
            Self::Origin => result.origin.as_ref().map(|o| o.to_string()),
            Self::OriginPath => result.origin.as_ref().map(|o| o.path().to_string()),
            Self::Status => Some(result.status.to_string()),
            Self::Head => Some(format!("{:?}", result.head)),
            Self::Duration => Some(format!("{:?}", result.duration)),
            Self::Header(name) => result
                .headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            Self::Meta(key) => result.meta.get(key).cloned(),
            Self::QueryParam(key) => result
                .url
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty()),
        };

        value.unwrap_or_else(|| fallback.to_string())
    }
}

/// Query parameters re-encoded with keys in sorted order
fn sorted_query(result: &FetchResult) -> String {
    let mut pairs: Vec<(String, String)> = result.url.query_pairs().into_owned().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// An ordered list of fields plus the placeholder for missing values
#[derive(Debug, Clone)]
pub struct FieldSelector {
    fields: Vec<Field>,
    names: Vec<String>,
    fallback: String,
}

impl FieldSelector {
    /// Parses field names; any unknown name is an error
    pub fn parse<S: AsRef<str>>(names: &[S], fallback: &str) -> ConfigResult<Self> {
        let fields = names
            .iter()
            .map(|n| n.as_ref().parse::<Field>())
            .collect::<ConfigResult<Vec<_>>>()?;
        let names = fields.iter().map(Field::to_string).collect();

        Ok(Self {
            fields,
            names,
            fallback: fallback.to_string(),
        })
    }

    /// Field names, in output order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Renders every selected field for `result`
    pub fn render(&self, result: &FetchResult) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.render(result, &self.fallback))
            .collect()
    }
}

/// Splits a comma separated field list, dropping empty entries
pub fn split_field_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
