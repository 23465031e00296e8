//! The `SongFilter` façade (song-filter spec §4.6): a root `And` node
//! plus the parsing entry points, introspection, and base-prefix
//! rewriting built on top of it. Grounded on the teacher's
//! `system::Query`/`FindResult` wrapper style — a thin struct around one
//! field exposing behavior instead of data.

use crate::song::SongView;
use crate::tag::Tag;

pub mod error;
pub mod lexer;
pub mod matcher;
pub mod node;
pub mod optimize;
pub mod parser;
#[cfg(test)]
mod tests;

pub use error::ParseError;
pub use matcher::{Position, StringMatcher};
pub use node::FilterNode;

/// A parsed, immutable-after-construction song filter: a root `And`
/// node over zero or more children (spec §3 "Root model").
#[derive(Debug, Clone, PartialEq)]
pub struct SongFilter {
    children: Vec<FilterNode>,
}

impl SongFilter {
    /// Parse a single flat `(tag, value)` pair (spec §4.4.4).
    pub fn parse_pair(tag: &str, value: &str, fold_case: bool) -> Result<Self, ParseError> {
        let node = parser::parse_flat_pair(tag, value, fold_case)?;
        Ok(Self { children: vec![node] })
    }

    /// Parse a mixed list of parenthesized expressions and flat
    /// `(tag, value)` pairs (spec §4.4.4).
    pub fn parse(args: &[String], fold_case: bool) -> Result<Self, ParseError> {
        let children = parser::parse_args(args, fold_case)?;
        Ok(Self { children })
    }

    /// Evaluate the root `And` against `song` (spec §4.6 `match`).
    pub fn matches(&self, song: &impl SongView) -> bool {
        self.children.iter().all(|child| child.matches(song))
    }

    /// Canonical textual form (spec §4.8): root combines its children
    /// with `" AND "` directly, unlike a nested `And` node which wraps
    /// itself in one pair of parens.
    pub fn to_expression(&self) -> String {
        self.children.iter().map(FilterNode::to_expression).collect::<Vec<_>>().join(" AND ")
    }

    /// True iff any `TagMatch`/`UriMatch` under the root has
    /// `fold_case = true` (spec §4.6 `hasFoldCase`).
    pub fn has_fold_case(&self) -> bool {
        self.children.iter().any(node_has_fold_case)
    }

    /// True iff any direct child of root is not `Base` (spec §4.6
    /// `hasOtherThanBase`).
    pub fn has_other_than_base(&self) -> bool {
        self.children.iter().any(|child| !matches!(child, FilterNode::Base { .. }))
    }

    /// The first `Base` child's prefix, if any (spec §4.6 `getBase`).
    pub fn get_base(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            FilterNode::Base { prefix } => Some(prefix.as_str()),
            _ => None,
        })
    }

    /// Rewrite `Base` children against `prefix`, returning a fresh
    /// filter and leaving `self` unchanged (spec §4.7).
    pub fn without_base_prefix(&self, prefix: &str) -> Self {
        let children = self.children.iter().filter_map(|child| rewrite_base(child, prefix)).collect();
        Self { children }
    }

    /// Apply the §4.5 simplifications to every root child in place.
    pub fn optimize(&mut self) {
        let children = std::mem::take(&mut self.children);
        let optimized = optimize::optimize(FilterNode::And(children));
        self.children = match optimized {
            FilterNode::And(flat) => flat,
            other => vec![other],
        };
    }
}

fn node_has_fold_case(node: &FilterNode) -> bool {
    match node {
        FilterNode::TagMatch { matcher, .. } | FilterNode::UriMatch { matcher } => matcher.fold_case(),
        FilterNode::And(children) => children.iter().any(node_has_fold_case),
        FilterNode::Not(child) => node_has_fold_case(child),
        _ => false,
    }
}

/// One direct child under the §4.7 rewrite rule. Returns `None` when the
/// child should be dropped.
fn rewrite_base(child: &FilterNode, prefix: &str) -> Option<FilterNode> {
    let FilterNode::Base { prefix: p } = child else {
        return Some(child.clone());
    };
    let Some(remainder) = p.strip_prefix(prefix) else {
        return Some(child.clone());
    };
    if remainder.is_empty() {
        return None;
    }
    if let Some(after_slash) = remainder.strip_prefix('/') {
        if after_slash.is_empty() {
            None
        } else {
            Some(FilterNode::Base { prefix: after_slash.to_string() })
        }
    } else {
        Some(child.clone())
    }
}

/// Tags an arbitrary matcher cares about: exposed for callers that want
/// to restrict a song's tag set to what a filter actually reads.
pub fn referenced_tags(filter: &SongFilter) -> impl Iterator<Item = Tag> + '_ {
    filter.children.iter().flat_map(referenced_tags_in)
}

fn referenced_tags_in(node: &FilterNode) -> Vec<Tag> {
    match node {
        FilterNode::TagMatch { tag: crate::tag::TagKind::Specific(tag), .. } => vec![*tag],
        FilterNode::And(children) => children.iter().flat_map(referenced_tags_in).collect(),
        FilterNode::Not(child) => referenced_tags_in(child),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod facade_tests {
    use super::*;
    use crate::song::Song;

    fn song(uri: &str) -> Song {
        Song { uri: uri.to_string(), ..Default::default() }
    }

    #[test]
    fn base_only_child_is_not_other_than_base() {
        let filter = SongFilter::parse(&["(base \"A\")".to_string()], false).unwrap();
        assert!(!filter.has_other_than_base());
        assert_eq!(filter.get_base(), Some("A"));
    }

    #[test]
    fn base_and_tag_match_is_other_than_base() {
        let filter = SongFilter::parse(&["((base \"A\") AND (title == \"Rain\"))".to_string()], false).unwrap();
        assert!(filter.has_other_than_base());
        assert_eq!(filter.get_base(), Some("A"));
        assert!(filter.matches(&song("A/Rain.flac")) == false);
    }

    #[test]
    fn without_base_prefix_drops_exact_match() {
        let filter = SongFilter::parse(&["(base \"A\")".to_string()], false).unwrap();
        let rewritten = filter.without_base_prefix("A");
        assert_eq!(rewritten.to_expression(), "");
    }

    #[test]
    fn without_base_prefix_strips_aligned_remainder() {
        let filter = SongFilter::parse(&["(base \"A/B\")".to_string()], false).unwrap();
        let rewritten = filter.without_base_prefix("A");
        assert_eq!(rewritten.to_expression(), "(base \"B\")");
    }

    #[test]
    fn without_base_prefix_keeps_unaligned_remainder() {
        let filter = SongFilter::parse(&["(base \"ABC\")".to_string()], false).unwrap();
        let rewritten = filter.without_base_prefix("A");
        assert_eq!(rewritten.to_expression(), "(base \"ABC\")");
    }

    #[test]
    fn root_serialization_has_no_enclosing_parens() {
        let filter = SongFilter::parse(&["(title == \"Rain\")".to_string(), "(album == \"X\")".to_string()], false).unwrap();
        assert_eq!(filter.to_expression(), "(title == \"Rain\") AND (album == \"X\")");
    }

    #[test]
    fn round_trips_through_to_expression() {
        let filter = SongFilter::parse(&["((title == \"Rain\") AND (album == \"X\"))".to_string()], false).unwrap();
        let rendered = filter.to_expression();
        let reparsed = SongFilter::parse(&[rendered.clone()], false).unwrap();
        assert_eq!(reparsed.to_expression(), rendered);
    }
}
