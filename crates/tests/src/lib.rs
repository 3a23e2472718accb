//! Cross-crate integration tests for deckroute

#[cfg(test)]
mod routing_integration;
