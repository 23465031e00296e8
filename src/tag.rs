//! The tag-name table collaborator (song-filter spec §6).
//!
//! `Tag` enumerates the metadata fields a song can carry, the same set
//! MPD exposes over its protocol. `TagKind` adds the `any` pseudo-tag
//! used by `(any == 'VALUE')` filters, since `any` is not itself a tag a
//! song can carry values under — it means "try every `Tag` variant".

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

/// see <https://mpd.readthedocs.io/en/stable/protocol.html#tags>
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumIter,
    EnumString,
    VariantNames,
    Debug,
    Default,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Hash,
)]
pub enum Tag {
    #[default]
    Artist,
    ArtistSort,
    Album,
    AlbumSort,
    AlbumArtist,
    AlbumArtistSort,
    Title,
    TitleSort,
    Track,
    Name,
    Genre,
    Mood,
    Date,
    OriginalDate,
    Composer,
    ComposerSort,
    Performer,
    Conductor,
    Work,
    Ensemble,
    Movement,
    MovementNumber,
    ShowMovement,
    Location,
    Grouping,
    Comment,
    Disc,
    Label,
    MusicbrainzArtistId,
    MusicbrainzAlbumId,
    MusicbrainzAlbumArtistId,
    MusicbrainzTrackId,
    MusicbrainzReleasegroupId,
    MusicbrainzReleaseTrackId,
    MusicbrainzWorkId,
}

/// What a `TagMatch` node actually reads from a song: one specific tag,
/// or `Any` to try every tag kind in turn.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TagKind {
    Specific(Tag),
    Any,
}

/// Resolve a tag name the way the filter parser's `name` rule does
/// (§4.4.1): case-insensitive, falling back to `Unknown` rather than
/// panicking so the caller can turn it into a `ParseError::UnknownFilterType`.
pub fn parse_tag_name(name: &str) -> Option<Tag> {
    // `Tag`'s `EnumString` derive is case-sensitive and expects the
    // PascalCase variant spelling; MPD tag names in filter expressions
    // are written lowercase-with-hyphens (e.g. `album-artist` or
    // `albumartist`), so normalize before delegating.
    let normalized = name.replace(['-', '_'], "");
    Tag::iter_names()
        .find(|variant| variant.eq_ignore_ascii_case(&normalized))
        .and_then(|variant| Tag::from_str(variant).ok())
}

impl Tag {
    fn iter_names() -> impl Iterator<Item = &'static str> {
        <Tag as VariantNames>::VARIANTS.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tags_case_insensitively() {
        assert_eq!(parse_tag_name("artist"), Some(Tag::Artist));
        assert_eq!(parse_tag_name("ARTIST"), Some(Tag::Artist));
        assert_eq!(parse_tag_name("AlbumArtist"), Some(Tag::AlbumArtist));
        assert_eq!(parse_tag_name("album-artist"), Some(Tag::AlbumArtist));
        assert_eq!(parse_tag_name("album_artist"), Some(Tag::AlbumArtist));
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(parse_tag_name("not-a-tag"), None);
    }
}
