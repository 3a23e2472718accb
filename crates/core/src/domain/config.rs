//! Sound routing configuration
//!
//! This module provides:
//! - The routing document: per-device output and input path mappings
//! - Validation of a document (clashing channels, duplicate endpoints,
//!   channel counts outside the type's bounds)
//! - TOML persistence and the config file manager

use crate::domain::path::{AudioInput, AudioOutput, AudioPath, Direction};
use crate::domain::path_type::AudioPathType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// File name of the routing document inside the config directory
pub const CONFIG_FILE_NAME: &str = "soundconfig.toml";

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Paths mapped onto one sound device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRouting {
    /// Device name as reported by the sound API
    pub name: String,

    #[serde(default, rename = "output", skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AudioOutput>,

    #[serde(default, rename = "input", skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<AudioInput>,
}

impl DeviceRouting {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: AudioOutput) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_input(mut self, input: AudioInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Paths of one direction on this device
    pub fn paths(&self, direction: Direction) -> Vec<&AudioPath> {
        match direction {
            Direction::Output => self.outputs.iter().map(AudioOutput::as_path).collect(),
            Direction::Input => self.inputs.iter().map(AudioInput::as_path).collect(),
        }
    }

    /// Every pair of same-direction paths whose channels clash
    pub fn clashes(&self) -> Vec<ChannelClash> {
        let mut clashes = Vec::new();
        for direction in [Direction::Output, Direction::Input] {
            let paths = self.paths(direction);
            for (i, first) in paths.iter().enumerate() {
                for second in &paths[i + 1..] {
                    if first.channels_clash(second) {
                        clashes.push(ChannelClash {
                            device: self.name.clone(),
                            direction,
                            first: **first,
                            second: **second,
                        });
                    }
                }
            }
        }
        clashes
    }
}

/// Complete routing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Sound API the devices belong to (empty = platform default)
    #[serde(default)]
    pub api: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_frames_per_buffer")]
    pub frames_per_buffer: u32,

    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceRouting>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_frames_per_buffer() -> u32 {
    1024
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api: String::new(),
            sample_rate: default_sample_rate(),
            frames_per_buffer: default_frames_per_buffer(),
            devices: Vec::new(),
        }
    }
}

impl RoutingConfig {
    /// Master on channels 0-1, headphones on 2-3 and a mono microphone on
    /// input channel 0 of the default device
    pub fn factory_default() -> Self {
        let device = DeviceRouting::new("default")
            .with_output(AudioOutput::new(AudioPathType::Master, 0, 2, 0))
            .with_output(AudioOutput::new(AudioPathType::Headphones, 2, 2, 0))
            .with_input(AudioInput::new(AudioPathType::Microphone, 0, 1, 0));

        Self {
            devices: vec![device],
            ..Self::default()
        }
    }

    pub fn device(&self, name: &str) -> Option<&DeviceRouting> {
        self.devices.iter().find(|device| device.name == name)
    }

    /// Get a device's routing, adding an empty one if the device is new
    pub fn device_mut_or_insert(&mut self, name: &str) -> &mut DeviceRouting {
        let position = match self.devices.iter().position(|device| device.name == name) {
            Some(position) => position,
            None => {
                debug!(device = name, "Adding device routing");
                self.devices.push(DeviceRouting::new(name));
                self.devices.len() - 1
            }
        };
        &mut self.devices[position]
    }

    pub fn all_outputs(&self) -> impl Iterator<Item = &AudioOutput> {
        self.devices.iter().flat_map(|device| device.outputs.iter())
    }

    pub fn all_inputs(&self) -> impl Iterator<Item = &AudioInput> {
        self.devices.iter().flat_map(|device| device.inputs.iter())
    }

    /// Clashing channel assignments on every device
    pub fn clashes(&self) -> Vec<ChannelClash> {
        self.devices.iter().flat_map(DeviceRouting::clashes).collect()
    }

    /// Endpoints mapped more than once in the same direction, on one device
    /// or across devices
    pub fn duplicates(&self) -> Vec<DuplicatePath> {
        let mut duplicates = Vec::new();
        for direction in [Direction::Output, Direction::Input] {
            let mut seen: HashMap<AudioPath, &str> = HashMap::new();
            for device in &self.devices {
                for path in device.paths(direction) {
                    if !path.path_type().is_valid() {
                        continue;
                    }
                    match seen.get(path) {
                        Some(first_device) => duplicates.push(DuplicatePath {
                            direction,
                            path: *path,
                            first_device: (*first_device).to_string(),
                            second_device: device.name.clone(),
                        }),
                        None => {
                            seen.insert(*path, &device.name);
                        }
                    }
                }
            }
        }
        duplicates
    }

    /// Paths whose type is `Invalid` or whose channel count is outside the
    /// type's bounds
    pub fn limit_violations(&self) -> Vec<LimitViolation> {
        let mut violations = Vec::new();
        for device in &self.devices {
            for direction in [Direction::Output, Direction::Input] {
                for path in device.paths(direction) {
                    let kind = if !path.path_type().is_valid() {
                        LimitKind::InvalidType
                    } else if !path.channel_count_in_bounds() {
                        LimitKind::ChannelCount {
                            count: path.channel_group().channel_count(),
                            min: path.path_type().min_channels(),
                            max: path.path_type().max_channels(),
                        }
                    } else {
                        continue;
                    };
                    violations.push(LimitViolation {
                        device: device.name.clone(),
                        direction,
                        path: *path,
                        kind,
                    });
                }
            }
        }
        violations
    }

    /// Run every check. The document itself is left untouched.
    pub fn validate(&self) -> ValidationReport {
        let report = ValidationReport {
            clashes: self.clashes(),
            duplicates: self.duplicates(),
            limit_violations: self.limit_violations(),
        };
        if !report.is_clean() {
            warn!(findings = report.len(), "Routing configuration has problems");
        }
        report
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading routing configuration");

        let contents = fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&contents)?;

        debug!(devices = config.devices.len(), "Routing configuration loaded");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving routing configuration");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = self.to_toml_string()?;
        fs::write(path, toml_str).await?;

        debug!("Routing configuration saved");
        Ok(())
    }
}

/// Two paths on the same device and direction sharing channels
#[derive(Debug, Clone)]
pub struct ChannelClash {
    pub device: String,
    pub direction: Direction,
    pub first: AudioPath,
    pub second: AudioPath,
}

impl fmt::Display for ChannelClash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} (channels {}) clashes with {} (channels {})",
            self.device,
            self.direction,
            self.first,
            self.first.channel_group(),
            self.second,
            self.second.channel_group()
        )
    }
}

/// An endpoint mapped a second time
#[derive(Debug, Clone)]
pub struct DuplicatePath {
    pub direction: Direction,
    pub path: AudioPath,
    pub first_device: String,
    pub second_device: String,
}

impl fmt::Display for DuplicatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} is mapped on {} and again on {}",
            self.direction, self.path, self.first_device, self.second_device
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    InvalidType,
    ChannelCount { count: u8, min: u8, max: u8 },
}

/// A path outside the rules of its type
#[derive(Debug, Clone)]
pub struct LimitViolation {
    pub device: String,
    pub direction: Direction,
    pub path: AudioPath,
    pub kind: LimitKind,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LimitKind::InvalidType => write!(
                f,
                "{} {}: path on channels {} has no valid type for this direction",
                self.device,
                self.direction,
                self.path.channel_group()
            ),
            LimitKind::ChannelCount { count, min, max } => write!(
                f,
                "{} {}: {} uses {} channels, expected {}..={}",
                self.device, self.direction, self.path, count, min, max
            ),
        }
    }
}

/// Findings of [`RoutingConfig::validate`]
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub clashes: Vec<ChannelClash>,
    pub duplicates: Vec<DuplicatePath>,
    pub limit_violations: Vec<LimitViolation>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// No findings at all
    pub fn is_clean(&self) -> bool {
        self.is_empty()
    }

    /// Total number of findings
    pub fn len(&self) -> usize {
        self.clashes.len() + self.duplicates.len() + self.limit_violations.len()
    }

    /// One line per finding
    pub fn messages(&self) -> Vec<String> {
        self.clashes
            .iter()
            .map(ToString::to_string)
            .chain(self.duplicates.iter().map(ToString::to_string))
            .chain(self.limit_violations.iter().map(ToString::to_string))
            .collect()
    }
}

/// Manager for the routing document at `~/.config/deckroute/soundconfig.toml`
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        Self {
            config_dir,
            config_path,
        }
    }

    /// Get the default config directory path
    ///
    /// Returns `~/.config/deckroute` on Linux, the platform equivalent
    /// elsewhere
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("deckroute"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the routing document
    ///
    /// A missing file yields the factory default, which is written out. A
    /// corrupt file is backed up next to the original and also replaced by
    /// the factory default.
    #[instrument(skip(self))]
    pub async fn load(&self) -> RoutingConfig {
        if !self.config_path.exists() {
            info!(
                path = %self.config_path.display(),
                "Routing config not found, creating factory default"
            );

            let config = RoutingConfig::factory_default();
            if let Err(e) = config.save_to_file(&self.config_path).await {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to save factory default routing config"
                );
            }
            return config;
        }

        match RoutingConfig::load_from_file(&self.config_path).await {
            Ok(config) => config,
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Failed to load routing config, using factory default"
                );

                let backup_path = self.config_path.with_extension("toml.corrupt");
                if let Err(copy_err) = fs::copy(&self.config_path, &backup_path).await {
                    error!(
                        path = %backup_path.display(),
                        error = %copy_err,
                        "Failed to backup corrupt routing config"
                    );
                }

                RoutingConfig::factory_default()
            }
        }
    }

    #[instrument(skip(self, config))]
    pub async fn save(&self, config: &RoutingConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir).await?;
        config.save_to_file(&self.config_path).await
    }

    /// Delete the routing document
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        if self.config_path.exists() {
            fs::remove_file(&self.config_path).await?;
            info!(path = %self.config_path.display(), "Routing configuration cleared");
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
