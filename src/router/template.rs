use std::{collections::HashMap, fmt, str::FromStr};

use super::RouteError;
use crate::error::ApiError;

/// Segment
///
/// One `/`-delimited piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// `{name}`: binds whatever the request has at this position.
    Param(String),
}

/// RouteTemplate
///
/// A parsed path pattern such as `/api/films/{id}`. The number of segments is fixed:
/// there are no wildcard or catch-all segments, and a trailing slash counts as an
/// extra (empty) segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        if !template.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(template.to_owned()));
        }

        let mut segments = Vec::new();
        for raw in template.split('/') {
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if is_param_name(name) => {
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(existing) if existing == name))
                    {
                        return Err(RouteError::DuplicateParam {
                            template: template.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                    Segment::Param(name.to_owned())
                }
                None if !raw.contains(['{', '}']) => Segment::Literal(raw.to_owned()),
                _ => {
                    return Err(RouteError::MalformedSegment {
                        template: template.to_owned(),
                        segment: raw.to_owned(),
                    });
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Matches a concrete request path against this template.
    ///
    /// Returns the parameter bindings on success. Values are bound verbatim: no
    /// percent-decoding, trimming or case folding is applied.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(expected) => {
                    if expected != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }

        Some(PathParams(params))
    }

    /// True when both templates accept exactly the same set of paths: same length,
    /// parameters at the same positions and equal literals everywhere else.
    pub fn same_shape(&self, other: &RouteTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Param(_), Segment::Param(_)) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => false,
                })
    }

    /// True when at least one path would match both templates.
    pub fn overlaps(&self, other: &RouteTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => true,
                })
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// PathParams
///
/// Parameter bindings extracted while matching a request path. The dispatcher stores
/// them in the request extensions; handlers read them through the `PathParams`
/// extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Parses a bound value, rejecting absent or unparsable values as a bad path parameter.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.get(name)
            .and_then(|raw| raw.parse().ok())
            .ok_or(ApiError::InvalidPathParameter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PathParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        PathParams(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        )
    }
}
