//! Audio path type taxonomy
//!
//! The closed set of endpoint kinds and the static rules attached to them:
//! which kinds carry an index, how many channels they may use, and how they
//! are named in persisted files and in front of users.

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Bus orientation indices used by the mixing engine for [`AudioPathType::Bus`]
pub mod bus {
    pub const LEFT: u8 = 0;
    pub const CENTER: u8 = 1;
    pub const RIGHT: u8 = 2;
}

/// Kind of logical audio endpoint
///
/// The discriminants are persisted as integers in some places, and
/// `Invalid` doubles as the upper bound when converting from one, so the
/// order must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AudioPathType {
    Master = 0,
    Headphones = 1,
    Bus = 2,
    Deck = 3,
    VinylControl = 4,
    Microphone = 5,
    Auxilliary = 6,
    Invalid = 7,
}

impl AudioPathType {
    /// Every valid type, in ordinal order
    pub const ALL: [AudioPathType; 7] = [
        AudioPathType::Master,
        AudioPathType::Headphones,
        AudioPathType::Bus,
        AudioPathType::Deck,
        AudioPathType::VinylControl,
        AudioPathType::Microphone,
        AudioPathType::Auxilliary,
    ];

    pub fn all() -> impl Iterator<Item = AudioPathType> {
        Self::ALL.into_iter()
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Machine name, as written to persisted records. Never localized.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioPathType::Master => "Master",
            AudioPathType::Headphones => "Headphones",
            AudioPathType::Bus => "Bus",
            AudioPathType::Deck => "Deck",
            AudioPathType::VinylControl => "Vinyl Control",
            AudioPathType::Microphone => "Microphone",
            AudioPathType::Auxilliary => "Auxilliary",
            AudioPathType::Invalid => "Invalid",
        }
    }

    /// Machine name for a raw ordinal, with a fallback for values outside
    /// the enumeration.
    pub fn name_for_ordinal(ordinal: i64) -> Cow<'static, str> {
        match u8::try_from(ordinal) {
            Ok(n) if n <= AudioPathType::Invalid.ordinal() => {
                let path_type = Self::ALL
                    .get(usize::from(n))
                    .copied()
                    .unwrap_or(AudioPathType::Invalid);
                Cow::Borrowed(path_type.as_str())
            }
            _ => Cow::Owned(format!("Unknown path type {}", ordinal)),
        }
    }

    /// Name shown to users.
    ///
    /// Buses are labelled by orientation, decks, vinyl control and auxiliary
    /// inputs by their 1-based number. Other types ignore `index`.
    pub fn user_string(self, index: u8) -> String {
        match self {
            AudioPathType::Bus => match index {
                bus::LEFT => "Left Bus".to_string(),
                bus::CENTER => "Center Bus".to_string(),
                bus::RIGHT => "Right Bus".to_string(),
                _ => "Invalid Bus".to_string(),
            },
            AudioPathType::Deck | AudioPathType::VinylControl | AudioPathType::Auxilliary => {
                format!("{} {}", self.as_str(), u16::from(index) + 1)
            }
            AudioPathType::Master
            | AudioPathType::Headphones
            | AudioPathType::Microphone
            | AudioPathType::Invalid => self.as_str().to_string(),
        }
    }

    /// Case-insensitive lookup of a machine name. Unknown names map to `Invalid`.
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .find(|path_type| path_type.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(AudioPathType::Invalid)
    }

    /// Type at ordinal `n`, or `Invalid` when `n` is negative or not below
    /// `Invalid`'s own ordinal.
    pub fn from_int(n: i32) -> Self {
        usize::try_from(n)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(AudioPathType::Invalid)
    }

    /// Whether paths of this type are distinguished by an index
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            AudioPathType::Bus
                | AudioPathType::Deck
                | AudioPathType::VinylControl
                | AudioPathType::Auxilliary
        )
    }

    /// Fewest channels a path of this type should use
    pub fn min_channels(self) -> u8 {
        match self {
            AudioPathType::VinylControl => 2,
            _ => 1,
        }
    }

    /// Most channels a path of this type should use
    pub fn max_channels(self) -> u8 {
        2
    }

    pub fn is_valid(self) -> bool {
        self != AudioPathType::Invalid
    }
}

impl fmt::Display for AudioPathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AudioPathType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}
