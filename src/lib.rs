//! A song-filter expression engine: the parenthesized filter language an
//! MPD-like music daemon accepts on `find`/`search`/`playlistfind`, plus
//! the flat legacy `tag value` form those commands also still accept.
//!
//! [`song_filter::SongFilter`] is the entry point: parse one with
//! [`song_filter::SongFilter::parse`] or
//! [`song_filter::SongFilter::parse_pair`], then call `matches` against
//! anything implementing [`song::SongView`].

pub mod audio_format;
pub mod song;
pub mod song_filter;
pub mod tag;

pub use song::{Song, SongView};
pub use song_filter::{FilterNode, ParseError, SongFilter};
pub use tag::{Tag, TagKind};
