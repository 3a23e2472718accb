//! Deckroute core
//!
//! Maps logical audio endpoints (master, headphones, buses, decks, vinyl
//! control, microphones, auxiliary inputs) onto channel ranges of a sound
//! device, detects clashing assignments and persists the mapping.

pub mod domain;

pub use domain::{
    AudioInput, AudioOutput, AudioPath, AudioPathType, ChannelGroup, Direction, RoutingConfig,
};
