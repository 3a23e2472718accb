//! Hardware channel ranges
//!
//! A [`ChannelGroup`] is the half-open range `[base, base + count)` of channel
//! indices on a sound device that one endpoint occupies.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Contiguous range of hardware channels used by one audio path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelGroup {
    base: u8,
    count: u8,
}

impl ChannelGroup {
    /// Create a group starting at `base` and spanning `count` channels.
    ///
    /// No bounds checking happens here; the caller knows how many channels
    /// the device actually has.
    pub const fn new(base: u8, count: u8) -> Self {
        Self { base, count }
    }

    /// First channel of the group
    pub fn channel_base(&self) -> u8 {
        self.base
    }

    /// Number of channels in the group
    pub fn channel_count(&self) -> u8 {
        self.count
    }

    /// An empty group occupies no channels
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check whether this group shares channels with `other`.
    ///
    /// Empty groups never clash. Otherwise two groups clash when either base
    /// lies strictly inside the other range, or both bases are equal. A base
    /// sitting exactly on the end of the other range does not clash.
    pub fn clashes_with(&self, other: &ChannelGroup) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        // Widen before adding: base + count can exceed u8::MAX.
        let (base, end) = (u16::from(self.base), self.end());
        let (other_base, other_end) = (u16::from(other.base), other.end());

        (base > other_base && base < other_end)
            || (other_base > base && other_base < end)
            || base == other_base
    }

    /// Key used for hashing: `(count << 8) | base`
    pub fn hash_key(&self) -> u32 {
        (u32::from(self.count) << 8) | u32::from(self.base)
    }

    fn end(&self) -> u16 {
        u16::from(self.base) + u16::from(self.count)
    }
}

impl Hash for ChannelGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_key());
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            0 => write!(f, "none"),
            1 => write!(f, "{}", self.base),
            _ => write!(f, "{}-{}", self.base, self.end() - 1),
        }
    }
}
