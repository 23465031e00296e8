//! Filter node variants (song-filter spec §3, §4.3): a tagged union
//! rather than the source's runtime-downcast hierarchy (§9 "Polymorphism").
//! Introspection that the original did with `dynamic_cast` becomes plain
//! pattern matching here.

use jiff::Timestamp;

use crate::audio_format::{AudioFormat, audio_format_matches};
use crate::song::SongView;
use crate::tag::{Tag, TagKind};

use super::matcher::{Position, StringMatcher};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    TagMatch {
        tag: TagKind,
        matcher: StringMatcher,
    },
    UriMatch {
        matcher: StringMatcher,
    },
    Base {
        prefix: String,
    },
    ModifiedSince {
        instant: Timestamp,
    },
    AddedSince {
        instant: Timestamp,
    },
    AudioFormatMatch {
        format: AudioFormat,
        mask: bool,
    },
    PriorityAtLeast {
        threshold: u8,
    },
    And(Vec<FilterNode>),
    Not(Box<FilterNode>),
}

impl FilterNode {
    pub fn matches(&self, song: &impl SongView) -> bool {
        match self {
            FilterNode::TagMatch { tag, matcher } => match tag {
                TagKind::Any => {
                    let mut values = song.all_tag_values().map(|(_, v)| v).peekable();
                    if values.peek().is_none() {
                        matcher.matches("")
                    } else {
                        values.any(|v| matcher.matches(v))
                    }
                }
                TagKind::Specific(tag) => tag_match(*tag, matcher, song),
            },
            FilterNode::UriMatch { matcher } => matcher.matches(song.uri()),
            FilterNode::Base { prefix } => {
                let uri = song.uri();
                uri == prefix.as_str() || uri.strip_prefix(prefix.as_str()).is_some_and(|rest| rest.starts_with('/'))
            }
            FilterNode::ModifiedSince { instant } => song.modified_at() >= *instant,
            FilterNode::AddedSince { instant } => song.added_at() >= *instant,
            FilterNode::AudioFormatMatch { format, mask } => match song.audio_format() {
                None => false,
                Some(actual) => {
                    if *mask {
                        audio_format_matches(format, &actual)
                    } else {
                        format == &actual
                    }
                }
            },
            FilterNode::PriorityAtLeast { threshold } => song.priority() >= *threshold,
            FilterNode::And(children) => children.iter().all(|c| c.matches(song)),
            FilterNode::Not(child) => !child.matches(song),
        }
    }

    pub fn to_expression(&self) -> String {
        match self {
            FilterNode::TagMatch { tag, matcher } => {
                let name = match tag {
                    TagKind::Any => "any".to_string(),
                    TagKind::Specific(tag) => tag_key(*tag),
                };
                format!("({} {} {})", name, operator_str(matcher), quote(matcher.value()))
            }
            FilterNode::UriMatch { matcher } => {
                format!("(file {} {})", operator_str(matcher), quote(matcher.value()))
            }
            FilterNode::Base { prefix } => format!("(base {})", quote(prefix)),
            FilterNode::ModifiedSince { instant } => format!("(modified-since {})", quote(&instant.to_string())),
            FilterNode::AddedSince { instant } => format!("(added-since {})", quote(&instant.to_string())),
            FilterNode::AudioFormatMatch { format, mask } => {
                let op = if *mask { "=~" } else { "==" };
                format!("(AudioFormat {op} {})", quote(&format.to_string()))
            }
            FilterNode::PriorityAtLeast { threshold } => format!("(prio >= {threshold})"),
            FilterNode::And(children) => {
                if children.is_empty() {
                    return "()".to_string();
                }
                let inner = children.iter().map(|c| c.to_expression()).collect::<Vec<_>>().join(" AND ");
                if children.len() == 1 {
                    inner
                } else {
                    format!("({inner})")
                }
            }
            FilterNode::Not(child) => format!("(!{})", child.to_expression()),
        }
    }
}

fn tag_match(tag: Tag, matcher: &StringMatcher, song: &impl SongView) -> bool {
    let values = song.tag_values(tag);
    // AlbumArtist falls back to Artist when the song has no AlbumArtist
    // values at all (SPEC_FULL §F, grounded on the teacher's TagEqual
    // doc comment).
    let values: &[String] = if tag == Tag::AlbumArtist && values.is_empty() {
        song.tag_values(Tag::Artist)
    } else {
        values
    };

    if values.is_empty() {
        // Missing tag: per spec §4.3, this evaluates to false unless the
        // matcher is negated, in which case absence satisfies a
        // FULL/PREFIX/ANYWHERE match against the empty string.
        matcher.matches("")
    } else {
        values.iter().any(|v| matcher.matches(v))
    }
}

fn tag_key(tag: Tag) -> String {
    tag.to_string().to_ascii_lowercase()
}

/// Pick the shortest operator string that reproduces a matcher's flags
/// (spec §6 "Serializer chooses the shortest unambiguous operator").
fn operator_str(matcher: &StringMatcher) -> &'static str {
    if matcher.is_regex() {
        return if matcher.negated() { "!~" } else { "=~" };
    }
    match (matcher.position(), matcher.negated()) {
        (Position::Full, false) => "==",
        (Position::Full, true) => "!=",
        (Position::Anywhere, false) => "contains",
        (Position::Anywhere, true) => "!contains",
        (Position::Prefix, false) => "starts_with",
        (Position::Prefix, true) => "!starts_with",
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
