//! Integration tests for routing documents
//!
//! These tests go through the public API the way the engine and the CLI do:
//! parse persisted documents, inspect the resulting paths and write them back.

use deckroute_core::domain::config::{ConfigManager, RoutingConfig, CONFIG_FILE_NAME};
use deckroute_core::domain::path_type::bus;
use deckroute_core::domain::{
    AudioInput, AudioOutput, AudioPathType, ChannelGroup, DeviceRouting, Direction, PathRecord,
};
use proptest::prelude::*;
use std::collections::HashMap;
use tempfile::TempDir;

fn output_types() -> impl Strategy<Value = AudioPathType> {
    prop::sample::select(AudioOutput::supported_types().to_vec())
}

fn input_types() -> impl Strategy<Value = AudioPathType> {
    prop::sample::select(AudioInput::supported_types().to_vec())
}

// ============================================================================
// RECORD ROUND TRIPS
// ============================================================================

proptest! {
    #[test]
    fn output_record_round_trip(
        path_type in output_types(),
        index in any::<u8>(),
        channel in any::<u8>(),
        count in 1u8..=255,
    ) {
        let output = AudioOutput::new(path_type, channel, count, index);
        let restored = AudioOutput::from_record(&output.to_record());

        prop_assert_eq!(restored, output);
        prop_assert_eq!(restored.channel_group(), output.channel_group());
    }

    #[test]
    fn input_record_round_trip_through_toml(
        path_type in input_types(),
        index in any::<u8>(),
        channel in any::<u8>(),
        count in 1u8..=255,
    ) {
        let input = AudioInput::new(path_type, channel, count, index);
        let text = toml::to_string(&input.to_record()).unwrap();
        let record: PathRecord = toml::from_str(&text).unwrap();
        let restored = AudioInput::from_record(&record);

        prop_assert_eq!(restored, input);
        prop_assert_eq!(restored.channel_group(), input.channel_group());
    }

    #[test]
    fn zero_count_round_trip_keeps_identity(path_type in output_types(), index in 0u8..4) {
        let output = AudioOutput::new(path_type, 0, 0, index);
        let restored = AudioOutput::from_record(&output.to_record());

        prop_assert_eq!(restored, output);
        prop_assert_eq!(restored.channel_group(), ChannelGroup::new(0, 2));
    }
}

// ============================================================================
// LEGACY DOCUMENTS
// ============================================================================

#[test]
fn test_legacy_records_infer_channel_counts() {
    let microphone: PathRecord = toml::from_str(r#"type = "Microphone""#).unwrap();
    assert_eq!(AudioInput::from_record(&microphone).channel_group().channel_count(), 1);

    let deck: PathRecord = toml::from_str("type = \"Deck\"\nindex = 1\nchannel = 2").unwrap();
    let deck = AudioOutput::from_record(&deck);
    assert_eq!(deck.channel_group(), ChannelGroup::new(2, 2));
    assert_eq!(deck.to_string(), "Deck 2");
}

#[test]
fn test_legacy_document_migrates_to_explicit_counts() {
    let legacy = r#"
[[device]]
name = "hw:1"

[[device.output]]
type = "MASTER"
channel = 0

[[device.output]]
type = "Bus"
index = 1
channel = 2

[[device.input]]
type = "microphone"
channel = 0

[[device.input]]
type = "Auxilliary"
index = 2
channel = 1
"#;
    let config = RoutingConfig::from_toml_str(legacy).unwrap();
    let migrated = RoutingConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();

    let device = migrated.device("hw:1").unwrap();
    let counts: Vec<u8> = device
        .outputs
        .iter()
        .map(|o| o.channel_group().channel_count())
        .chain(device.inputs.iter().map(|i| i.channel_group().channel_count()))
        .collect();
    assert_eq!(counts, vec![2, 2, 1, 2]);
    assert_eq!(device.outputs[1].to_string(), "Center Bus");

    // Microphone on 0 and auxiliary 3 on 1-2 do not share a channel
    assert!(migrated.validate().is_clean());
}

// ============================================================================
// DIRECTION RULES
// ============================================================================

#[test]
fn test_input_document_cannot_hold_outputs() {
    let config = RoutingConfig::from_toml_str(
        r#"
[[device]]
name = "card"

[[device.input]]
type = "Master"
channel = 0
channel_count = 2

[[device.output]]
type = "Microphone"
channel = 0
channel_count = 1
"#,
    )
    .unwrap();

    let device = config.device("card").unwrap();
    assert_eq!(device.inputs[0].path_type(), AudioPathType::Invalid);
    assert_eq!(device.outputs[0].path_type(), AudioPathType::Invalid);

    // Normalized paths are written back as "Invalid"
    let text = config.to_toml_string().unwrap();
    assert_eq!(text.matches(r#"type = "Invalid""#).count(), 2);
}

#[test]
fn test_direction_tables_are_disjoint() {
    for path_type in AudioPathType::all() {
        assert!(
            !(Direction::Output.supports(path_type) && Direction::Input.supports(path_type)),
            "{} supported in both directions",
            path_type
        );
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn test_paths_keep_identity_across_reassignment() {
    let before = AudioOutput::new(AudioPathType::Bus, 0, 2, bus::LEFT);
    let after = AudioOutput::new(AudioPathType::Bus, 6, 1, bus::LEFT);

    let mut gains = HashMap::new();
    gains.insert(before, -3.0_f32);
    assert_eq!(gains.get(&after), Some(&-3.0));
}

#[test]
fn test_channel_groups_as_keys() {
    let config = RoutingConfig::factory_default();
    let owners: HashMap<ChannelGroup, String> = config
        .all_outputs()
        .map(|o| (o.channel_group(), o.user_string()))
        .collect();

    assert_eq!(owners.get(&ChannelGroup::new(0, 2)).map(String::as_str), Some("Master"));
    assert_eq!(owners.get(&ChannelGroup::new(2, 2)).map(String::as_str), Some("Headphones"));
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[tokio::test]
async fn test_manager_round_trip_with_several_devices() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::new(temp_dir.path().to_path_buf());
    assert_eq!(manager.config_path(), temp_dir.path().join(CONFIG_FILE_NAME));

    let mut config = RoutingConfig::factory_default();
    config.devices.push(
        DeviceRouting::new("Turntable Interface")
            .with_output(AudioOutput::new(AudioPathType::Deck, 0, 2, 0))
            .with_output(AudioOutput::new(AudioPathType::Deck, 2, 2, 1))
            .with_input(AudioInput::new(AudioPathType::Auxilliary, 0, 2, 0)),
    );
    manager.save(&config).await.unwrap();

    let loaded = manager.load().await;
    assert_eq!(loaded.devices.len(), 2);
    let turntables = loaded.device("Turntable Interface").unwrap();
    assert_eq!(turntables.outputs[1].to_string(), "Deck 2");
    assert_eq!(turntables.outputs[1].channel_group(), ChannelGroup::new(2, 2));
    assert!(loaded.validate().is_clean());
}

#[tokio::test]
async fn test_clashing_document_survives_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clash.toml");

    let mut config = RoutingConfig::default();
    config.devices.push(
        DeviceRouting::new("card")
            .with_output(AudioOutput::new(AudioPathType::Master, 0, 2, 0))
            .with_output(AudioOutput::new(AudioPathType::Headphones, 0, 2, 0)),
    );
    config.save_to_file(&path).await.unwrap();

    let loaded = RoutingConfig::load_from_file(&path).await.unwrap();
    let report = loaded.validate();
    assert_eq!(report.clashes.len(), 1);
    assert_eq!(
        report.messages(),
        vec!["card output: Master (channels 0-1) clashes with Headphones (channels 0-1)".to_string()]
    );
}
