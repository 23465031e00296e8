//! Recursive-descent parser (song-filter spec §4.4): the parenthesized
//! expression grammar and the flat legacy `(tag, value)` form, sharing
//! the lexical primitives in [`super::lexer`] and the operator table in
//! [`operators`].

use jiff::Timestamp;

use crate::audio_format::parse_audio_format;
use crate::tag::{TagKind, parse_tag_name};

use super::error::ParseError;
use super::lexer::Cursor;
use super::matcher::{Position, StringMatcher};
use super::node::FilterNode;

/// Parse a single parenthesized expression (spec §4.4(a)), requiring the
/// whole input to be consumed.
pub fn parse_expression_str(input: &str, fold_case: bool) -> Result<FilterNode, ParseError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_left_whitespace();
    let node = parse_expr(&mut cursor, fold_case)?;
    cursor.skip_left_whitespace();
    if !cursor.is_empty() {
        return Err(ParseError::UnparsedTrailing(cursor.rest().to_string()));
    }
    Ok(node)
}

/// Parse the mixed flat/expression argument list (spec §4.4.4): each
/// argument that starts with `(` contributes its expression's children
/// to the root directly (splicing a top-level `And` rather than nesting
/// it, so `getBase`/`hasOtherThanBase`/`withoutBasePrefix` see the real
/// direct children of root, per spec §4.6/§4.7); everything else is
/// consumed in `(tag, value)` pairs.
pub fn parse_args(args: &[String], fold_case: bool) -> Result<Vec<FilterNode>, ParseError> {
    let mut children = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].trim();
        if arg.starts_with('(') {
            children.extend(parse_root_chain(arg, fold_case)?);
            i += 1;
        } else {
            let value = args.get(i + 1).ok_or(ParseError::ArgumentCount)?;
            children.push(parse_flat_pair(arg, value, fold_case)?);
            i += 2;
        }
    }
    if children.is_empty() {
        return Err(ParseError::ArgumentCount);
    }
    Ok(children)
}

/// Parse the unparenthesized top-level form `SongFilter::to_expression`
/// produces for a root with more than one child: one or more
/// parenthesized expressions joined by a literal `AND`, with no
/// enclosing parens around the whole chain (spec §4.8, round-trip
/// stability law 1). A single expression is the one-element case of
/// this grammar. Any expression that itself parses to a top-level `And`
/// (a fully-parenthesized group, e.g. `((base "A") AND (title == "X"))`)
/// has its children spliced in rather than nested, so the result is
/// always the flat list of root children.
fn parse_root_chain(input: &str, fold_case: bool) -> Result<Vec<FilterNode>, ParseError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_left_whitespace();

    let mut children = Vec::new();
    splice_expr(&mut cursor, fold_case, &mut children)?;
    loop {
        cursor.skip_left_whitespace();
        if cursor.is_empty() {
            break;
        }
        if !cursor.match_prefix("AND") {
            return Err(ParseError::KeywordExpectedAnd);
        }
        cursor.skip_left_whitespace();
        splice_expr(&mut cursor, fold_case, &mut children)?;
    }
    Ok(children)
}

fn splice_expr(cursor: &mut Cursor, fold_case: bool, out: &mut Vec<FilterNode>) -> Result<(), ParseError> {
    match parse_expr(cursor, fold_case)? {
        FilterNode::And(grandchildren) => out.extend(grandchildren),
        other => out.push(other),
    }
    Ok(())
}

/// Parse a single flat legacy `(tag, value)` pair (spec §4.4.4).
pub fn parse_flat_pair(tag: &str, value: &str, fold_case: bool) -> Result<FilterNode, ParseError> {
    if tag == "base" {
        return Ok(FilterNode::Base {
            prefix: validate_uri_safe(value)?,
        });
    }
    if tag == "modified-since" {
        return Ok(FilterNode::ModifiedSince {
            instant: parse_timestamp(value)?,
        });
    }
    if tag == "added-since" {
        return Ok(FilterNode::AddedSince {
            instant: parse_timestamp(value)?,
        });
    }
    let position = if fold_case { Position::Anywhere } else { Position::Full };
    if tag.eq_ignore_ascii_case("file") || tag.eq_ignore_ascii_case("filename") {
        return Ok(FilterNode::UriMatch {
            matcher: StringMatcher::new(value.to_string(), position, fold_case, false),
        });
    }
    if tag.eq_ignore_ascii_case("any") {
        return Ok(FilterNode::TagMatch {
            tag: TagKind::Any,
            matcher: StringMatcher::new(value.to_string(), position, fold_case, false),
        });
    }
    let resolved = parse_tag_name(tag).ok_or_else(|| ParseError::UnknownFilterType(tag.to_string()))?;
    Ok(FilterNode::TagMatch {
        tag: TagKind::Specific(resolved),
        matcher: StringMatcher::new(value.to_string(), position, fold_case, false),
    })
}

fn parse_expr(cursor: &mut Cursor, fold_case: bool) -> Result<FilterNode, ParseError> {
    cursor.expect_byte(b'(')?;
    cursor.skip_left_whitespace();
    let node = parse_body(cursor, fold_case)?;
    cursor.skip_left_whitespace();
    cursor.expect_byte(b')')?;
    Ok(node)
}

fn parse_body(cursor: &mut Cursor, fold_case: bool) -> Result<FilterNode, ParseError> {
    if cursor.peek() == Some(b'!') {
        let _ = cursor.expect_byte(b'!');
        cursor.skip_left_whitespace();
        let inner = parse_expr(cursor, fold_case)?;
        return Ok(FilterNode::Not(Box::new(inner)));
    }
    if cursor.peek() == Some(b'(') {
        return parse_group(cursor, fold_case);
    }
    parse_filter(cursor, fold_case)
}

fn parse_group(cursor: &mut Cursor, fold_case: bool) -> Result<FilterNode, ParseError> {
    let mut children = vec![parse_expr(cursor, fold_case)?];
    loop {
        cursor.skip_left_whitespace();
        if cursor.peek() == Some(b')') {
            break;
        }
        if !cursor.match_prefix("AND") {
            return Err(ParseError::KeywordExpectedAnd);
        }
        cursor.skip_left_whitespace();
        children.push(parse_expr(cursor, fold_case)?);
    }
    Ok(if children.len() == 1 {
        children.into_iter().next().expect("just pushed one element")
    } else {
        FilterNode::And(children)
    })
}

fn parse_filter(cursor: &mut Cursor, fold_case: bool) -> Result<FilterNode, ParseError> {
    let name = cursor.read_word()?;

    if name.eq_ignore_ascii_case("file") || name.eq_ignore_ascii_case("filename") {
        let matcher = parse_string_operator_and_operand(cursor, fold_case)?;
        return Ok(FilterNode::UriMatch { matcher });
    }
    if name.eq_ignore_ascii_case("any") {
        let matcher = parse_string_operator_and_operand(cursor, fold_case)?;
        return Ok(FilterNode::TagMatch { tag: TagKind::Any, matcher });
    }
    if name == "base" {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return Ok(FilterNode::Base {
            prefix: validate_uri_safe(&value)?,
        });
    }
    if name == "modified-since" {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return Ok(FilterNode::ModifiedSince {
            instant: parse_timestamp(&value)?,
        });
    }
    if name == "added-since" {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return Ok(FilterNode::AddedSince {
            instant: parse_timestamp(&value)?,
        });
    }
    if name.eq_ignore_ascii_case("audioformat") {
        cursor.skip_left_whitespace();
        let mask = if cursor.match_prefix_case_insensitive("==") {
            false
        } else if cursor.match_prefix_case_insensitive("=~") {
            true
        } else {
            return Err(ParseError::UnknownOperator(cursor.rest().to_string()));
        };
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        let format = parse_audio_format(&value, mask).map_err(ParseError::BadAudioFormat)?;
        return Ok(FilterNode::AudioFormatMatch { format, mask });
    }
    if name.eq_ignore_ascii_case("prio") {
        cursor.skip_left_whitespace();
        if !cursor.match_prefix_case_insensitive(">=") {
            return Err(ParseError::BadPriority);
        }
        cursor.skip_left_whitespace();
        if matches!(cursor.peek(), Some(b'\'') | Some(b'"')) {
            return Err(ParseError::BadPriority);
        }
        let value = cursor.read_decimal().map_err(|_| ParseError::BadPriority)?;
        let threshold: u8 = value.try_into().map_err(|_| ParseError::BadPriority)?;
        return Ok(FilterNode::PriorityAtLeast { threshold });
    }

    let tag = parse_tag_name(name).ok_or_else(|| ParseError::UnknownFilterType(name.to_string()))?;
    let matcher = parse_string_operator_and_operand(cursor, fold_case)?;
    Ok(FilterNode::TagMatch {
        tag: TagKind::Specific(tag),
        matcher,
    })
}

/// The operator table of spec §4.4.2: longest/most-specific prefixes
/// first, though none of these prefixes are actually ambiguous with one
/// another since each includes its full delimiting text.
const WORD_OPERATORS: &[(&str, bool, Option<bool>, Position)] = &[
    ("contains_cs ", false, Some(false), Position::Anywhere),
    ("!contains_cs ", true, Some(false), Position::Anywhere),
    ("contains_ci ", false, Some(true), Position::Anywhere),
    ("!contains_ci ", true, Some(true), Position::Anywhere),
    ("starts_with_cs ", false, Some(false), Position::Prefix),
    ("!starts_with_cs ", true, Some(false), Position::Prefix),
    ("starts_with_ci ", false, Some(true), Position::Prefix),
    ("!starts_with_ci ", true, Some(true), Position::Prefix),
    ("eq_cs ", false, Some(false), Position::Full),
    ("!eq_cs ", true, Some(false), Position::Full),
    ("eq_ci ", false, Some(true), Position::Full),
    ("!eq_ci ", true, Some(true), Position::Full),
    ("contains ", false, None, Position::Anywhere),
    ("!contains ", true, None, Position::Anywhere),
    ("starts_with ", false, None, Position::Prefix),
    ("!starts_with ", true, None, Position::Prefix),
];

fn parse_string_operator_and_operand(cursor: &mut Cursor, fold_case: bool) -> Result<StringMatcher, ParseError> {
    cursor.skip_left_whitespace();

    for (prefix, negated, fold_override, position) in WORD_OPERATORS {
        if cursor.match_prefix_case_insensitive(prefix) {
            let value = cursor.read_quoted()?;
            let effective_fold = fold_override.unwrap_or(fold_case);
            return Ok(StringMatcher::new(value, *position, effective_fold, *negated));
        }
    }

    if let Some(result) = try_parse_regex_operator(cursor, fold_case)? {
        return Ok(result);
    }

    if cursor.match_prefix_case_insensitive("==") {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return Ok(StringMatcher::new(value, Position::Full, fold_case, false));
    }
    if cursor.match_prefix_case_insensitive("!=") {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return Ok(StringMatcher::new(value, Position::Full, fold_case, true));
    }

    Err(ParseError::UnknownOperator(cursor.rest().to_string()))
}

/// Recognizes `=~`/`!~` and compiles the operand as a regex (spec §9
/// "Regex optionality"). Returns `Ok(None)` when neither prefix is
/// present so the caller can keep trying other operators.
#[cfg(feature = "regex")]
fn try_parse_regex_operator(cursor: &mut Cursor, fold_case: bool) -> Result<Option<StringMatcher>, ParseError> {
    if cursor.match_prefix_case_insensitive("=~") {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return StringMatcher::new_regex(&value, fold_case, false)
            .map(Some)
            .map_err(|e| ParseError::BadRegex(e.to_string()));
    }
    if cursor.match_prefix_case_insensitive("!~") {
        cursor.skip_left_whitespace();
        let value = cursor.read_quoted()?;
        return StringMatcher::new_regex(&value, fold_case, true)
            .map(Some)
            .map_err(|e| ParseError::BadRegex(e.to_string()));
    }
    Ok(None)
}

/// Without the `regex` feature, `=~`/`!~` are simply unknown operators
/// rather than a silent fallback to literal matching (spec §9).
#[cfg(not(feature = "regex"))]
fn try_parse_regex_operator(_cursor: &mut Cursor, _fold_case: bool) -> Result<Option<StringMatcher>, ParseError> {
    Ok(None)
}

/// Validates `base`/`file` style URI prefixes (spec §3 invariants):
/// non-empty, relative (no leading `/`), no trailing `/`, no `..` or
/// empty path segments.
fn validate_uri_safe(value: &str) -> Result<String, ParseError> {
    let is_safe = !value.is_empty()
        && !value.starts_with('/')
        && !value.ends_with('/')
        && value.split('/').all(|segment| !segment.is_empty() && segment != "..");
    if is_safe {
        Ok(value.to_string())
    } else {
        Err(ParseError::BadUri)
    }
}

/// Parses an ISO 8601 date-time (date-only allowed) or, failing that,
/// an unsigned decimal interpreted as Unix seconds (spec §4.4.3).
fn parse_timestamp(value: &str) -> Result<Timestamp, ParseError> {
    match parse_iso8601(value) {
        Ok(instant) => Ok(instant),
        Err(iso_err) => {
            if value.bytes().all(|b| b.is_ascii_digit()) && !value.is_empty() {
                if let Ok(secs) = value.parse::<i64>() {
                    if let Ok(instant) = Timestamp::from_second(secs) {
                        return Ok(instant);
                    }
                }
            }
            Err(ParseError::BadTimestamp(iso_err))
        }
    }
}

fn parse_iso8601(value: &str) -> Result<Timestamp, String> {
    if let Ok(instant) = value.parse::<Timestamp>() {
        return Ok(instant);
    }
    if let Ok(datetime) = value.parse::<jiff::civil::DateTime>() {
        return datetime
            .to_zoned(jiff::tz::TimeZone::UTC)
            .map(|z| z.timestamp())
            .map_err(|e| e.to_string());
    }
    match value.parse::<jiff::civil::Date>() {
        Ok(date) => date
            .to_datetime(jiff::civil::Time::midnight())
            .to_zoned(jiff::tz::TimeZone::UTC)
            .map(|z| z.timestamp())
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}
