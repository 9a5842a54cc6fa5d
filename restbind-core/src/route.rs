//! Route templates with `{name}` placeholders.

use std::collections::HashSet;

/// A parse failure for a route template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteParseError {
    #[error("unmatched `{{` at byte {0}")]
    UnclosedBrace(usize),
    #[error("unmatched `}}` at byte {0}")]
    UnopenedBrace(usize),
    #[error("empty placeholder at byte {0}")]
    EmptyPlaceholder(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed route template such as `/accounts/{id}/orders`.
///
/// Placeholders are delimited by single braces and must be non-empty.
/// Substitution is purely textual; the resolver guarantees before any
/// call that every placeholder has exactly one path-bound parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse a template, splitting it into literal and placeholder runs.
    pub fn parse(raw: &str) -> Result<Self, RouteParseError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let mut name = String::new();
                    let mut closed = false;
                    for (inner_pos, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(RouteParseError::UnclosedBrace(inner_pos)),
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(RouteParseError::UnclosedBrace(pos));
                    }
                    if name.is_empty() {
                        return Err(RouteParseError::EmptyPlaceholder(pos));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(RouteParseError::UnopenedBrace(pos)),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template exactly as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The distinct placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) if seen.insert(name.as_str()) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the template contains the named placeholder.
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(p) if p == name))
    }

    /// Substitute every placeholder using `lookup`.
    ///
    /// Returns `Err` with the placeholder name if `lookup` has no value
    /// for it. The resolver rules make that unreachable for resolved
    /// descriptors, but the engine still propagates it rather than
    /// sending a malformed route.
    pub fn render<F>(&self, lookup: F) -> Result<String, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => return Err(name.clone()),
                },
            }
        }
        Ok(out)
    }
}
