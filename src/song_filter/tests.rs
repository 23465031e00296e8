//! Integration-style tests over the `SongFilter` façade: the concrete
//! scenarios and quantified laws of song-filter spec §8.

use jiff::Timestamp;
use pretty_assertions::assert_eq;

use crate::audio_format::{AudioFormat, SampleFormat};
use crate::song::Song;
use crate::song_filter::{FilterNode, SongFilter};
use crate::song_filter::matcher::{Position, StringMatcher};
use crate::tag::{Tag, TagKind};

fn sample_song() -> Song {
    let mut song = Song {
        uri: "A/B/song.flac".to_string(),
        modified_at: "2023-11-14T22:13:20Z".parse::<Timestamp>().unwrap(),
        added_at: "2023-11-14T22:15:00Z".parse::<Timestamp>().unwrap(),
        audio_format: Some(AudioFormat {
            sample_rate: Some(44100),
            sample_format: Some(SampleFormat::Bits(16)),
            channel_count: Some(2),
        }),
        priority: 10,
        ..Default::default()
    };
    song.tags.insert(Tag::Title, vec!["Rain".to_string()]);
    song.tags.insert(Tag::Artist, vec!["Björk".to_string()]);
    song
}

#[test]
fn s1_contains_matches_and_round_trips() {
    let filter = SongFilter::parse(&["(title contains \"Rai\")".to_string()], false).unwrap();
    assert!(filter.matches(&sample_song()));
    assert_eq!(filter.to_expression(), "(title contains \"Rai\")");
}

#[test]
fn s2_eq_cs_is_case_sensitive_and_negatable() {
    let filter = SongFilter::parse(&["(artist eq_cs \"björk\")".to_string()], false).unwrap();
    assert!(!filter.matches(&sample_song()));

    let negated = SongFilter::parse(&["(artist !eq_cs \"björk\")".to_string()], false).unwrap();
    assert!(negated.matches(&sample_song()));
}

#[test]
fn s3_base_and_tag_match_with_rewriting() {
    let filter = SongFilter::parse(&["((base \"A\") AND (title == \"Rain\"))".to_string()], false).unwrap();
    assert!(filter.matches(&sample_song()));
    assert_eq!(filter.get_base(), Some("A"));
    assert!(filter.has_other_than_base());

    let rewritten = filter.without_base_prefix("A");
    assert_eq!(rewritten.to_expression(), "(title == \"Rain\")");
}

#[test]
fn s4_modified_since_accepts_iso_and_epoch_forms() {
    let iso = SongFilter::parse(&["(modified-since \"2023-01-01\")".to_string()], false).unwrap();
    let epoch = SongFilter::parse(&["(modified-since \"1672531200\")".to_string()], false).unwrap();
    assert!(iso.matches(&sample_song()));
    assert!(epoch.matches(&sample_song()));
    assert_eq!(iso.to_expression(), epoch.to_expression());
}

#[test]
fn s5_audio_format_mask_and_exact() {
    let mask = SongFilter::parse(&["(AudioFormat =~ \"44100:*:2\")".to_string()], false).unwrap();
    let exact_match = SongFilter::parse(&["(AudioFormat == \"44100:16:2\")".to_string()], false).unwrap();
    let exact_mismatch = SongFilter::parse(&["(AudioFormat == \"48000:16:2\")".to_string()], false).unwrap();

    assert!(mask.matches(&sample_song()));
    assert!(exact_match.matches(&sample_song()));
    assert!(!exact_mismatch.matches(&sample_song()));
}

#[test]
fn s6_priority_rejects_quoted_and_out_of_range() {
    assert!(SongFilter::parse(&["(prio >= \"5\")".to_string()], false).is_err());
    assert!(SongFilter::parse(&["(prio >= 5)".to_string()], false).unwrap().matches(&sample_song()));
    assert!(SongFilter::parse(&["(prio >= 300)".to_string()], false).is_err());
}

#[test]
fn law2_optimizer_is_idempotent() {
    let mut filter = SongFilter::parse(
        &["(title contains \"Rai\")".to_string(), "(title contains \"Rai\")".to_string()],
        false,
    )
    .unwrap();
    filter.optimize();
    let once = filter.to_expression();
    filter.optimize();
    assert_eq!(filter.to_expression(), once);
}

#[test]
fn law3_double_negation_matches_identically() {
    let plain = SongFilter::parse(&["(title == \"Rain\")".to_string()], false).unwrap();
    let doubly_negated = SongFilter::parse(&["(!(!(title == \"Rain\")))".to_string()], false).unwrap();
    let song = sample_song();
    assert_eq!(plain.matches(&song), doubly_negated.matches(&song));
}

#[test]
fn law4_empty_and_matches_all_and_single_child_is_identity() {
    let empty = SongFilter { children: Vec::new() };
    assert!(empty.matches(&sample_song()));

    let single = FilterNode::And(vec![FilterNode::TagMatch {
        tag: TagKind::Specific(Tag::Title),
        matcher: StringMatcher::new("Rain".to_string(), Position::Full, false, false),
    }]);
    let wrapped = SongFilter { children: vec![single] };
    assert!(wrapped.matches(&sample_song()));
}

#[test]
fn law5_clone_is_equivalent() {
    let filter = SongFilter::parse(&["(title contains \"Rai\")".to_string()], false).unwrap();
    let cloned = filter.clone();
    let song = sample_song();
    assert_eq!(filter.matches(&song), cloned.matches(&song));
    assert_eq!(filter.to_expression(), cloned.to_expression());
}

#[test]
fn law6_negation_closure_for_string_matchers() {
    let m = StringMatcher::new("Rain".to_string(), Position::Full, false, false);
    let negated = StringMatcher::new("Rain".to_string(), Position::Full, false, true);
    for input in ["Rain", "rain", "Thunder", ""] {
        assert_eq!(negated.matches(input), !m.matches(input));
    }
}

#[test]
fn law7_base_prefix_identity_and_full_strip() {
    let filter = SongFilter::parse(&["(base \"A\")".to_string()], false).unwrap();
    let stripped = filter.without_base_prefix("A");
    assert!(stripped.to_expression().is_empty());
    assert!(stripped.matches(&sample_song()));

    let unchanged = filter.without_base_prefix("");
    assert_eq!(unchanged.to_expression(), filter.to_expression());
}

#[test]
fn law8_quoting_round_trips_arbitrary_bytes() {
    let tricky = "back\\slash and \"quote\" and\ttab";
    let filter = SongFilter::parse(&[format!("(title == {})", quote_for_test(tricky))], false).unwrap();
    let FilterNode::TagMatch { matcher, .. } = &filter_only_child(&filter) else {
        panic!("expected a TagMatch node");
    };
    assert_eq!(matcher.value(), tricky);
}

fn quote_for_test(value: &str) -> String {
    let mut out = String::from("\"");
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn filter_only_child(filter: &SongFilter) -> FilterNode {
    let expr = filter.to_expression();
    let reparsed = SongFilter::parse(&[expr], false).unwrap();
    reparsed.children.into_iter().next().expect("one child")
}
