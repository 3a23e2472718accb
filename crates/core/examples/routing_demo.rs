//! Example walking through a routing document: legacy load, validation and save
//!
//! Run with: cargo run --package deckroute-core --example routing_demo

use deckroute_core::domain::{AudioOutput, AudioPathType, RoutingConfig};

const OLD_DOCUMENT: &str = r#"
[[device]]
name = "USB Mixer"

[[device.output]]
type = "Master"
channel = 0

[[device.output]]
type = "Headphones"
channel = 1

[[device.input]]
type = "Microphone"
channel = 0
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("deckroute_core=debug,info")
        .init();

    println!("=== Deckroute Routing Demo ===\n");

    println!("1. Loading a document written before channel counts were stored...");
    let mut config = RoutingConfig::from_toml_str(OLD_DOCUMENT)?;
    for output in config.all_outputs() {
        println!("   {} -> channels {}", output, output.channel_group());
    }
    for input in config.all_inputs() {
        println!("   {} <- channels {}", input, input.channel_group());
    }

    println!("\n2. Validating...");
    for message in config.validate().messages() {
        println!("   ! {}", message);
    }

    println!("\n3. Moving headphones to channels 2-3...");
    let device = config.device_mut_or_insert("USB Mixer");
    device.outputs.retain(|o| o.path_type() != AudioPathType::Headphones);
    device.outputs.push(AudioOutput::new(AudioPathType::Headphones, 2, 2, 0));
    let report = config.validate();
    println!("   ✓ Clean: {}", report.is_clean());

    println!("\n4. Saving with explicit channel counts...");
    let path = std::env::temp_dir().join("deckroute_demo.toml");
    config.save_to_file(&path).await?;
    println!("   ✓ Saved to {}", path.display());
    println!("\n{}", config.to_toml_string()?);

    tokio::fs::remove_file(&path).await?;
    Ok(())
}
