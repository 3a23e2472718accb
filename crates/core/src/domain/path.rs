//! Logical audio endpoints
//!
//! An [`AudioPath`] binds an endpoint type and index to the channels it
//! currently occupies. Identity is the `(type, index)` pair only, so "Deck 2"
//! stays the same endpoint when it is moved to other channels.
//!
//! [`AudioOutput`] and [`AudioInput`] restrict the accepted types per
//! [`Direction`]. Unsupported types are downgraded to
//! [`AudioPathType::Invalid`] instead of being rejected; callers that care
//! must compare the resulting type with the one they asked for.

use crate::domain::channel::ChannelGroup;
use crate::domain::path_type::AudioPathType;
use crate::domain::record::PathRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use tracing::debug;

const OUTPUT_TYPES: &[AudioPathType] = &[
    AudioPathType::Master,
    AudioPathType::Headphones,
    AudioPathType::Bus,
    AudioPathType::Deck,
];

#[cfg(feature = "vinylcontrol")]
const INPUT_TYPES: &[AudioPathType] = &[
    AudioPathType::VinylControl,
    AudioPathType::Auxilliary,
    AudioPathType::Microphone,
];

#[cfg(not(feature = "vinylcontrol"))]
const INPUT_TYPES: &[AudioPathType] = &[AudioPathType::Auxilliary, AudioPathType::Microphone];

/// Signal direction of an endpoint relative to the sound device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Output,
    Input,
}

impl Direction {
    /// Types a path in this direction may carry
    pub fn supported_types(self) -> &'static [AudioPathType] {
        match self {
            Direction::Output => OUTPUT_TYPES,
            Direction::Input => INPUT_TYPES,
        }
    }

    pub fn supports(self, path_type: AudioPathType) -> bool {
        self.supported_types().contains(&path_type)
    }

    /// Element tag of the persisted record
    pub fn tag(self) -> &'static str {
        match self {
            Direction::Output => "output",
            Direction::Input => "input",
        }
    }

    /// Normalize a requested `(type, index)` pair for this direction.
    ///
    /// Unsupported types become `Invalid`; the index survives only when the
    /// accepted type is indexed.
    pub fn accept(self, requested: AudioPathType, index: u8) -> (AudioPathType, u8) {
        let accepted = if self.supports(requested) {
            requested
        } else {
            if requested.is_valid() {
                debug!(
                    direction = self.tag(),
                    requested = %requested,
                    "Path type not supported in this direction, using Invalid"
                );
            }
            AudioPathType::Invalid
        };

        let index = if accepted.is_indexed() {
            index
        } else {
            if index != 0 {
                debug!(path_type = %accepted, index, "Dropping index of non-indexed path");
            }
            0
        };

        (accepted, index)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

/// Endpoint type, index and channel allocation shared by outputs and inputs
///
/// Equality and hashing only look at type and index.
#[derive(Debug, Clone, Copy)]
pub struct AudioPath {
    path_type: AudioPathType,
    index: u8,
    channels: ChannelGroup,
}

impl AudioPath {
    fn new(
        direction: Direction,
        path_type: AudioPathType,
        channel_base: u8,
        channels: u8,
        index: u8,
    ) -> Self {
        let (path_type, index) = direction.accept(path_type, index);
        Self {
            path_type,
            index,
            channels: ChannelGroup::new(channel_base, channels),
        }
    }

    pub fn path_type(&self) -> AudioPathType {
        self.path_type
    }

    /// Index of the path, always 0 for non-indexed types
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn channel_group(&self) -> ChannelGroup {
        self.channels
    }

    /// Check whether this path's channels clash with another's
    /// (see [`ChannelGroup::clashes_with`]).
    pub fn channels_clash(&self, other: &AudioPath) -> bool {
        self.channels.clashes_with(&other.channels)
    }

    /// Name of the path for display to users
    pub fn user_string(&self) -> String {
        self.path_type.user_string(self.index)
    }

    /// Key used for hashing: `(type << 8) | index`
    pub fn hash_key(&self) -> u32 {
        (u32::from(self.path_type.ordinal()) << 8) | u32::from(self.index)
    }

    /// Whether the channel count lies within the bounds of the type
    pub fn channel_count_in_bounds(&self) -> bool {
        let count = self.channels.channel_count();
        count >= self.path_type.min_channels() && count <= self.path_type.max_channels()
    }
}

impl PartialEq for AudioPath {
    fn eq(&self, other: &Self) -> bool {
        self.path_type == other.path_type && self.index == other.index
    }
}

impl Eq for AudioPath {}

impl Hash for AudioPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_key());
    }
}

impl fmt::Display for AudioPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.user_string())
    }
}

/// Endpoint sending audio to the sound device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PathRecord", into = "PathRecord")]
pub struct AudioOutput(AudioPath);

impl AudioOutput {
    pub const DIRECTION: Direction = Direction::Output;

    /// Create an output. Types other than master, headphones, bus and deck
    /// become `Invalid`.
    pub fn new(path_type: AudioPathType, channel_base: u8, channels: u8, index: u8) -> Self {
        Self(AudioPath::new(Self::DIRECTION, path_type, channel_base, channels, index))
    }

    pub fn supported_types() -> &'static [AudioPathType] {
        Self::DIRECTION.supported_types()
    }

    pub fn as_path(&self) -> &AudioPath {
        &self.0
    }

    pub fn to_record(&self) -> PathRecord {
        PathRecord::from_path(&self.0)
    }

    pub fn from_record(record: &PathRecord) -> Self {
        let fields = record.resolve();
        Self::new(fields.path_type, fields.channel_base, fields.channels, fields.index)
    }
}

impl Deref for AudioOutput {
    type Target = AudioPath;

    fn deref(&self) -> &AudioPath {
        &self.0
    }
}

impl fmt::Display for AudioOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PathRecord> for AudioOutput {
    fn from(record: PathRecord) -> Self {
        Self::from_record(&record)
    }
}

impl From<AudioOutput> for PathRecord {
    fn from(output: AudioOutput) -> Self {
        output.to_record()
    }
}

/// Endpoint receiving audio from the sound device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PathRecord", into = "PathRecord")]
pub struct AudioInput(AudioPath);

impl AudioInput {
    pub const DIRECTION: Direction = Direction::Input;

    /// Create an input. Types other than vinyl control (when that feature
    /// is built), auxiliary and microphone become `Invalid`.
    pub fn new(path_type: AudioPathType, channel_base: u8, channels: u8, index: u8) -> Self {
        Self(AudioPath::new(Self::DIRECTION, path_type, channel_base, channels, index))
    }

    pub fn supported_types() -> &'static [AudioPathType] {
        Self::DIRECTION.supported_types()
    }

    pub fn as_path(&self) -> &AudioPath {
        &self.0
    }

    pub fn to_record(&self) -> PathRecord {
        PathRecord::from_path(&self.0)
    }

    pub fn from_record(record: &PathRecord) -> Self {
        let fields = record.resolve();
        Self::new(fields.path_type, fields.channel_base, fields.channels, fields.index)
    }
}

impl Deref for AudioInput {
    type Target = AudioPath;

    fn deref(&self) -> &AudioPath {
        &self.0
    }
}

impl fmt::Display for AudioInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PathRecord> for AudioInput {
    fn from(record: PathRecord) -> Self {
        Self::from_record(&record)
    }
}

impl From<AudioInput> for PathRecord {
    fn from(input: AudioInput) -> Self {
        input.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::path_type::bus;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_output_accepts_supported_types() {
        for &path_type in AudioOutput::supported_types() {
            let output = AudioOutput::new(path_type, 0, 2, 0);
            assert_eq!(output.path_type(), path_type);
        }
    }

    #[test]
    fn test_output_downgrades_input_types() {
        for path_type in [
            AudioPathType::VinylControl,
            AudioPathType::Microphone,
            AudioPathType::Auxilliary,
            AudioPathType::Invalid,
        ] {
            let output = AudioOutput::new(path_type, 0, 2, 1);
            assert_eq!(output.path_type(), AudioPathType::Invalid);
            assert_eq!(output.index(), 0);
        }
    }

    #[test]
    fn test_input_downgrades_master() {
        let input = AudioInput::new(AudioPathType::Master, 0, 2, 0);
        assert_eq!(input.path_type(), AudioPathType::Invalid);
        assert_ne!(input.path_type(), AudioPathType::Master);
    }

    #[test]
    fn test_input_supported_types() {
        let input = AudioInput::new(AudioPathType::Microphone, 0, 1, 0);
        assert_eq!(input.path_type(), AudioPathType::Microphone);

        let aux = AudioInput::new(AudioPathType::Auxilliary, 2, 2, 1);
        assert_eq!(aux.path_type(), AudioPathType::Auxilliary);
        assert_eq!(aux.index(), 1);
    }

    #[test]
    fn test_vinyl_control_input_follows_feature() {
        let input = AudioInput::new(AudioPathType::VinylControl, 0, 2, 3);
        if cfg!(feature = "vinylcontrol") {
            assert_eq!(input.path_type(), AudioPathType::VinylControl);
            assert_eq!(input.index(), 3);
        } else {
            assert_eq!(input.path_type(), AudioPathType::Invalid);
            assert_eq!(input.index(), 0);
        }
    }

    #[test]
    fn test_index_zeroed_for_non_indexed_types() {
        let master = AudioOutput::new(AudioPathType::Master, 0, 2, 5);
        assert_eq!(master.index(), 0);

        let mic = AudioInput::new(AudioPathType::Microphone, 0, 1, 2);
        assert_eq!(mic.index(), 0);

        let deck = AudioOutput::new(AudioPathType::Deck, 0, 2, 5);
        assert_eq!(deck.index(), 5);
    }

    #[test]
    fn test_direction_accept() {
        assert_eq!(
            Direction::Output.accept(AudioPathType::Bus, bus::RIGHT),
            (AudioPathType::Bus, bus::RIGHT)
        );
        assert_eq!(
            Direction::Input.accept(AudioPathType::Deck, 1),
            (AudioPathType::Invalid, 0)
        );
        assert_eq!(Direction::Output.tag(), "output");
        assert_eq!(Direction::Input.to_string(), "input");
    }

    #[test]
    fn test_identity_ignores_channels() {
        let a = AudioOutput::new(AudioPathType::Deck, 0, 2, 1);
        let b = AudioOutput::new(AudioPathType::Deck, 6, 1, 1);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.hash_key(), b.hash_key());
        assert_ne!(a.channel_group(), b.channel_group());
    }

    #[test]
    fn test_identity_distinguishes_index_and_type() {
        let deck1 = AudioOutput::new(AudioPathType::Deck, 0, 2, 0);
        let deck2 = AudioOutput::new(AudioPathType::Deck, 0, 2, 1);
        let bus1 = AudioOutput::new(AudioPathType::Bus, 0, 2, 0);
        assert_ne!(deck1, deck2);
        assert_ne!(deck1, bus1);
    }

    #[test]
    fn test_hash_key_layout() {
        let deck = AudioOutput::new(AudioPathType::Deck, 0, 2, 2);
        assert_eq!(deck.hash_key(), (3 << 8) | 2);
        let master = AudioOutput::new(AudioPathType::Master, 4, 2, 0);
        assert_eq!(master.hash_key(), 0);
    }

    #[test]
    fn test_set_deduplicates_by_identity() {
        let mut outputs = HashSet::new();
        outputs.insert(AudioOutput::new(AudioPathType::Master, 0, 2, 0));
        outputs.insert(AudioOutput::new(AudioPathType::Master, 2, 2, 0));
        outputs.insert(AudioOutput::new(AudioPathType::Headphones, 2, 2, 0));
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn test_channels_clash() {
        let master = AudioOutput::new(AudioPathType::Master, 0, 2, 0);
        let headphones = AudioOutput::new(AudioPathType::Headphones, 1, 2, 0);
        let deck = AudioOutput::new(AudioPathType::Deck, 2, 2, 0);
        assert!(master.channels_clash(&headphones));
        assert!(!master.channels_clash(&deck));
    }

    #[test]
    fn test_user_string_and_display() {
        let deck = AudioOutput::new(AudioPathType::Deck, 0, 2, 1);
        assert_eq!(deck.user_string(), "Deck 2");
        assert_eq!(deck.to_string(), "Deck 2");

        let bus = AudioOutput::new(AudioPathType::Bus, 0, 2, bus::CENTER);
        assert_eq!(bus.to_string(), "Center Bus");

        let mic = AudioInput::new(AudioPathType::Microphone, 0, 1, 0);
        assert_eq!(mic.to_string(), "Microphone");
    }

    #[test]
    fn test_channel_count_bounds() {
        assert!(AudioOutput::new(AudioPathType::Master, 0, 2, 0).channel_count_in_bounds());
        assert!(AudioInput::new(AudioPathType::Microphone, 0, 1, 0).channel_count_in_bounds());
        assert!(!AudioOutput::new(AudioPathType::Master, 0, 4, 0).channel_count_in_bounds());
        assert!(!AudioOutput::new(AudioPathType::Master, 0, 0, 0).channel_count_in_bounds());
    }
}
