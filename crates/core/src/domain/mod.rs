//! Domain entities and routing rules

pub mod channel;
pub mod config;
pub mod path;
pub mod path_type;
pub mod record;

pub use channel::ChannelGroup;
pub use config::{
    ChannelClash, ConfigError, ConfigManager, DeviceRouting, DuplicatePath, LimitKind,
    LimitViolation, RoutingConfig, ValidationReport,
};
pub use path::{AudioInput, AudioOutput, AudioPath, Direction};
pub use path_type::AudioPathType;
pub use record::{infer_channel_count, PathRecord, ResolvedRecord};
