//! The abstract `Song` view consumed by filter matchers (song-filter
//! spec §6), plus a concrete owned `Song` used by tests and the demo
//! binary. Grounded on `system::Song` / `mpd_protocol::FindResult`,
//! generalized to carry a full tag multimap, both timestamps, an audio
//! format and a priority, since a matcher needs all of those to
//! evaluate every filter node kind.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::audio_format::AudioFormat;
use crate::tag::Tag;

/// Read-only view a filter matches against. Implemented by whatever the
/// song library actually stores; the filter core never constructs one.
pub trait SongView {
    /// Absolute URI within the library, no scheme (e.g. `"A/B/song.flac"`).
    fn uri(&self) -> &str;
    /// All values stored under `tag` for this song. Empty if none.
    fn tag_values(&self, tag: Tag) -> &[String];
    /// Every `(tag, value)` pair this song carries, for `any`-matchers.
    fn all_tag_values(&self) -> impl Iterator<Item = (Tag, &str)>;
    fn modified_at(&self) -> Timestamp;
    fn added_at(&self) -> Timestamp;
    fn audio_format(&self) -> Option<AudioFormat>;
    /// Queue priority, `0` if the song carries none.
    fn priority(&self) -> u8;
}

/// A concrete, owned song used in tests and by the demo binary's
/// `--songs` fixture loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Song {
    pub uri: String,
    pub tags: HashMap<Tag, Vec<String>>,
    pub modified_at: Timestamp,
    pub added_at: Timestamp,
    pub audio_format: Option<AudioFormat>,
    #[serde(default)]
    pub priority: u8,
}

impl SongView for Song {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn tag_values(&self, tag: Tag) -> &[String] {
        self.tags.get(&tag).map_or(&[], Vec::as_slice)
    }

    fn all_tag_values(&self) -> impl Iterator<Item = (Tag, &str)> {
        self.tags
            .iter()
            .flat_map(|(tag, values)| values.iter().map(move |v| (*tag, v.as_str())))
    }

    fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    fn added_at(&self) -> Timestamp {
        self.added_at
    }

    fn audio_format(&self) -> Option<AudioFormat> {
        self.audio_format
    }

    fn priority(&self) -> u8 {
        self.priority
    }
}
