//! Path pattern syntax.
//!
//! # Syntax
//! ```text
//! /literal/<string:name>/<name>
//! ```
//! - Literal segments compare exactly (case-sensitive)
//! - `<string:name>` and `<name>` bind one non-empty segment
//! - Only the `string` converter exists; anything else is rejected at build time
//!
//! Template placeholders (`$objects`) are substituted before parsing and are
//! never part of a parsed pattern.

use std::collections::HashSet;
use std::fmt;

use crate::routing::error::ConfigurationError;

/// One segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

impl Segment {
    fn is_variable(&self) -> bool {
        matches!(self, Segment::Variable(_))
    }
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

/// Structural identity of a pattern: literal text where the pattern has a
/// literal, `None` where it binds a variable. Variable names do not matter.
pub type Shape = Vec<Option<String>>;

impl Pattern {
    /// Parse a pattern string.
    pub fn parse(source: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: &str| ConfigurationError::MalformedPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        if !source.starts_with('/') {
            return Err(malformed("pattern must start with `/`"));
        }

        let body = source.trim_start_matches('/').trim_end_matches('/');
        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        if !body.is_empty() {
            for raw in body.split('/') {
                if raw.is_empty() {
                    return Err(malformed("empty segment"));
                }
                if raw.contains('$') {
                    return Err(ConfigurationError::UnresolvedPlaceholder {
                        text: source.to_string(),
                    });
                }

                let segment = if let Some(inner) =
                    raw.strip_prefix('<').and_then(|s| s.strip_suffix('>'))
                {
                    let (converter, name) = match inner.split_once(':') {
                        Some((converter, name)) => (converter, name),
                        None => ("string", inner),
                    };
                    if converter != "string" {
                        return Err(ConfigurationError::UnsupportedConverter {
                            pattern: source.to_string(),
                            converter: converter.to_string(),
                        });
                    }
                    if !is_identifier(name) {
                        return Err(malformed("variable name must be an identifier"));
                    }
                    if !seen.insert(name.to_string()) {
                        return Err(ConfigurationError::DuplicateVariable {
                            pattern: source.to_string(),
                            name: name.to_string(),
                        });
                    }
                    Segment::Variable(name.to_string())
                } else if raw.contains('<') || raw.contains('>') {
                    return Err(malformed("variables must span a whole segment"));
                } else {
                    Segment::Literal(raw.to_string())
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern text as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn shape(&self) -> Shape {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => Some(text.clone()),
                Segment::Variable(_) => None,
            })
            .collect()
    }

    /// Ordering key: at the first position where two patterns differ, a
    /// literal segment sorts before a variable one.
    pub(crate) fn specificity(&self) -> Vec<bool> {
        self.segments.iter().map(Segment::is_variable).collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize a path to a single leading `/` and no trailing `/`.
///
/// `normalize(normalize(p)) == normalize(p)`.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    format!("/{trimmed}")
}

/// Join a prefix and a suffix with exactly one `/` between them.
pub fn join(prefix: &str, suffix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        normalize(prefix)
    } else {
        normalize(&format!("{prefix}/{suffix}"))
    }
}
