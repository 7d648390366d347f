//! Shared test helpers for `gametest-core` integration tests.
//!
//! Lightweight transports and fixtures so pipeline and scheduler tests can
//! focus on behaviour instead of plumbing.

#![allow(dead_code)]

pub mod transport;

use std::sync::Arc;

use gametest_core::SecretStore;

/// Store seeded with the secrets most tests reference.
pub fn sample_secrets() -> Arc<SecretStore> {
    Arc::new(SecretStore::new([
        ("api_key", "sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
        ("webhook_token", "whk_9f8e7d"),
    ]))
}
