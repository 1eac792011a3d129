//! Route template compilation and path matching.
//!
//! # Responsibilities
//! - Compile a template such as `/fair/:id/artworks` into segment specs
//! - Match classified path segments against a compiled pattern
//! - Collect named captures and the trailing wildcard
//!
//! # Design Decisions
//! - Literal segments are case-sensitive and must match exactly
//! - Without a wildcard the segment count must equal the pattern length
//! - Wildcard binds the remaining segments joined by `/` under `*`
//! - No regex, matching is a single lockstep walk

use std::fmt;
use std::str::FromStr;

use crate::routing::error::PatternError;
use crate::routing::table::Captures;

/// Reserved capture name for the trailing wildcard.
pub const WILDCARD_KEY: &str = "*";

/// A single segment test in a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSpec {
    /// Matches a path segment exactly equal to the text.
    Literal(String),
    /// Matches any single segment and binds it to the name.
    Capture(String),
    /// Matches every remaining segment, including none.
    Wildcard,
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    template: String,
    segments: Vec<SegmentSpec>,
}

impl RoutePattern {
    /// Compile a route template.
    ///
    /// Leading, trailing and repeated slashes are insignificant. The root
    /// route `/` compiles to an empty pattern that only matches an empty path.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let parts: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();

        if parts.is_empty() && template != "/" {
            return Err(PatternError::EmptyTemplate(template.to_string()));
        }

        let last = parts.len().saturating_sub(1);
        let mut segments = Vec::with_capacity(parts.len());

        for (position, part) in parts.iter().enumerate() {
            let spec = if *part == WILDCARD_KEY {
                if position != last {
                    return Err(PatternError::WildcardNotLast {
                        template: template.to_string(),
                        position,
                    });
                }
                SegmentSpec::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyCaptureName {
                        template: template.to_string(),
                        position,
                    });
                }
                SegmentSpec::Capture(name.to_string())
            } else {
                SegmentSpec::Literal((*part).to_string())
            };
            segments.push(spec);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[SegmentSpec] {
        &self.segments
    }

    /// True if the pattern ends in a wildcard.
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(SegmentSpec::Wildcard))
    }

    /// True if the pattern is a bare wildcard that matches every path.
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [SegmentSpec::Wildcard])
    }

    /// Match path segments against this pattern.
    ///
    /// Returns the captured bindings, or `None` if the path does not match.
    pub fn match_segments<S: AsRef<str>>(&self, path: &[S]) -> Option<Captures> {
        let mut captures = Captures::new();

        for (index, spec) in self.segments.iter().enumerate() {
            match spec {
                SegmentSpec::Wildcard => {
                    let rest = path
                        .get(index..)
                        .unwrap_or_default()
                        .iter()
                        .map(S::as_ref)
                        .collect::<Vec<&str>>()
                        .join("/");
                    captures.insert(WILDCARD_KEY.to_string(), rest);
                    return Some(captures);
                }
                SegmentSpec::Literal(text) => {
                    let segment: &str = path.get(index)?.as_ref();
                    if segment != text {
                        return None;
                    }
                }
                SegmentSpec::Capture(name) => {
                    let value: &str = path.get(index)?.as_ref();
                    captures.insert(name.clone(), value.to_string());
                }
            }
        }

        // No wildcard: trailing segments are not allowed.
        (path.len() == self.segments.len()).then_some(captures)
    }
}

impl FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.template)
    }
}
