//! Persisted record form of audio paths
//!
//! Outputs and inputs share one record shape; only the element tag differs
//! (see [`Direction::tag`](crate::domain::path::Direction::tag)). Records
//! written before channel counts were stored are migrated on load by
//! [`infer_channel_count`].

use crate::domain::path::AudioPath;
use crate::domain::path_type::AudioPathType;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// One persisted audio path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Machine name of the path type
    #[serde(rename = "type", default)]
    pub path_type: String,

    #[serde(default, deserialize_with = "lenient_uint")]
    pub index: u32,

    /// First channel on the device
    #[serde(default, deserialize_with = "lenient_uint")]
    pub channel: u32,

    /// Absent in files written by older versions
    #[serde(
        default,
        deserialize_with = "lenient_optional_uint",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_count: Option<u32>,
}

/// Record fields converted to the in-memory widths, with the channel count
/// filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub path_type: AudioPathType,
    pub index: u8,
    pub channel_base: u8,
    pub channels: u8,
}

impl PathRecord {
    pub fn new(path_type: AudioPathType, index: u8, channel: u8, channel_count: u8) -> Self {
        Self {
            path_type: path_type.as_str().to_string(),
            index: u32::from(index),
            channel: u32::from(channel),
            channel_count: Some(u32::from(channel_count)),
        }
    }

    pub fn from_path(path: &AudioPath) -> Self {
        let group = path.channel_group();
        Self::new(
            path.path_type(),
            path.index(),
            group.channel_base(),
            group.channel_count(),
        )
    }

    /// Parse the type name and apply the legacy channel count inference.
    pub fn resolve(&self) -> ResolvedRecord {
        let path_type = AudioPathType::from_name(&self.path_type);

        let channels = match self.channel_count {
            Some(count) if count != 0 => count,
            _ => {
                let inferred = infer_channel_count(path_type);
                debug!(
                    path_type = %path_type,
                    channels = inferred,
                    "Record has no channel count, inferring from type"
                );
                u32::from(inferred)
            }
        };

        ResolvedRecord {
            path_type,
            index: narrow("index", self.index),
            channel_base: narrow("channel", self.channel),
            channels: narrow("channel_count", channels),
        }
    }
}

/// Channel count for records that predate stored channel counts.
///
/// Microphones were the only mono paths back then; everything else was
/// stereo.
pub fn infer_channel_count(path_type: AudioPathType) -> u8 {
    match path_type {
        AudioPathType::Microphone => 1,
        _ => 2,
    }
}

// Unsigned record fields read as 0 when the stored value is negative, too
// large or not a number, the same way a failed unsigned parse does.
struct LenientUint;

impl LenientUint {
    fn fallback<T: fmt::Display>(value: T) -> u32 {
        warn!(%value, "Record value is not an unsigned integer, using 0");
        0
    }
}

impl<'de> Visitor<'de> for LenientUint {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u32, E> {
        Ok(u32::try_from(v).unwrap_or_else(|_| Self::fallback(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u32, E> {
        Ok(u32::try_from(v).unwrap_or_else(|_| Self::fallback(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u32, E> {
        Ok(Self::fallback(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<u32, E> {
        Ok(Self::fallback(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<u32, E> {
        Ok(v.trim().parse().unwrap_or_else(|_| Self::fallback(v)))
    }
}

fn lenient_uint<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    deserializer.deserialize_any(LenientUint)
}

fn lenient_optional_uint<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    lenient_uint(deserializer).map(Some)
}

// Stored fields are 8 bits wide; larger values keep their low byte.
fn narrow(field: &'static str, value: u32) -> u8 {
    u8::try_from(value).unwrap_or_else(|_| {
        let truncated = (value & 0xFF) as u8;
        warn!(field, value, truncated, "Record value does not fit in 8 bits");
        truncated
    })
}
