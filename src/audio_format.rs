//! The audio-format parser collaborator (song-filter spec §6), modeled
//! on `mpd_protocol::AudioParams` but generalized to support the
//! `SAMPLERATE:BITS:CHANNELS` wildcard form `AudioFormatMatch` needs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A song's audio format, or the operand of an `AudioFormat` filter.
///
/// Each field is `None` only when used as a mask operand (`=~`) and the
/// corresponding component of the textual format was `*`; a concrete
/// song's format never has `None` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: Option<u32>,
    pub sample_format: Option<SampleFormat>,
    pub channel_count: Option<u8>,
}

/// MPD's sample format token: either a plain bit depth or one of the
/// named floating-point/DSD formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    Bits(u8),
    Float,
    Dsd,
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleFormat::Bits(bits) => write!(f, "{bits}"),
            SampleFormat::Float => write!(f, "f"),
            SampleFormat::Dsd => write!(f, "dsd"),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |p: &Option<_>| p.map_or_else(|| "*".to_string(), |v| format!("{v}"));
        write!(
            f,
            "{}:{}:{}",
            self.sample_rate.map_or_else(|| "*".to_string(), |v| v.to_string()),
            self.sample_format
                .as_ref()
                .map_or_else(|| "*".to_string(), |v| v.to_string()),
            part(&self.channel_count.map(|c| c as u32)),
        )
    }
}

/// Parse `SAMPLERATE:BITS:CHANNELS`, where `mask` allows `*` components
/// (the `AudioFormat =~ '...'` form) and otherwise requires all three
/// fields to be present (the `AudioFormat == '...'` form).
pub fn parse_audio_format(s: &str, mask: bool) -> Result<AudioFormat, String> {
    let mut parts = s.split(':');
    let (Some(rate), Some(fmt), Some(channels), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected SAMPLERATE:BITS:CHANNELS, got {s:?}"));
    };

    let sample_rate = parse_component(rate, mask, |s| {
        s.parse::<u32>().map_err(|_| format!("invalid sample rate: {s:?}"))
    })?;
    let sample_format = parse_component(fmt, mask, parse_sample_format)?;
    let channel_count = parse_component(channels, mask, |s| {
        s.parse::<u8>().map_err(|_| format!("invalid channel count: {s:?}"))
    })?;

    if !mask && (sample_rate.is_none() || sample_format.is_none() || channel_count.is_none()) {
        return Err(format!("wildcards are not allowed in an exact AudioFormat: {s:?}"));
    }

    Ok(AudioFormat {
        sample_rate,
        sample_format,
        channel_count,
    })
}

fn parse_component<T>(
    s: &str,
    mask: bool,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    if mask && s == "*" {
        Ok(None)
    } else {
        parse(s).map(Some)
    }
}

fn parse_sample_format(s: &str) -> Result<SampleFormat, String> {
    match s {
        "f" => Ok(SampleFormat::Float),
        "dsd" => Ok(SampleFormat::Dsd),
        bits => bits
            .parse::<u8>()
            .map(SampleFormat::Bits)
            .map_err(|_| format!("invalid sample format: {s:?}")),
    }
}

/// `AudioFormatMatch` semantics (spec §4.3): each non-wildcard field of
/// `mask` must equal the corresponding field of `actual`.
pub fn audio_format_matches(mask: &AudioFormat, actual: &AudioFormat) -> bool {
    field_matches(mask.sample_rate, actual.sample_rate)
        && field_matches(mask.sample_format, actual.sample_format)
        && field_matches(mask.channel_count, actual.channel_count)
}

fn field_matches<T: PartialEq>(mask_field: Option<T>, actual_field: Option<T>) -> bool {
    match mask_field {
        None => true,
        Some(v) => actual_field.is_some_and(|actual| actual == v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_format() {
        let fmt = parse_audio_format("44100:16:2", false).unwrap();
        assert_eq!(fmt.sample_rate, Some(44100));
        assert_eq!(fmt.sample_format, Some(SampleFormat::Bits(16)));
        assert_eq!(fmt.channel_count, Some(2));
    }

    #[test]
    fn rejects_wildcard_in_exact_format() {
        assert!(parse_audio_format("44100:*:2", false).is_err());
    }

    #[test]
    fn parses_mask_with_wildcards() {
        let fmt = parse_audio_format("44100:*:2", true).unwrap();
        assert_eq!(fmt.sample_rate, Some(44100));
        assert_eq!(fmt.sample_format, None);
        assert_eq!(fmt.channel_count, Some(2));
    }

    #[test]
    fn mask_matching_treats_wildcard_as_any() {
        let mask = parse_audio_format("44100:*:2", true).unwrap();
        let actual = AudioFormat {
            sample_rate: Some(44100),
            sample_format: Some(SampleFormat::Bits(24)),
            channel_count: Some(2),
        };
        assert!(audio_format_matches(&mask, &actual));
    }

    #[test]
    fn exact_format_requires_all_fields_equal() {
        let mask = parse_audio_format("44100:16:2", false).unwrap();
        let mismatched = AudioFormat {
            sample_rate: Some(48000),
            sample_format: Some(SampleFormat::Bits(16)),
            channel_count: Some(2),
        };
        assert!(!audio_format_matches(&mask, &mismatched));
    }
}
