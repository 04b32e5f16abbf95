//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;

use error_assistant::{AnalyzerClient, Config, ReqwestTransport, StaticSecrets};

pub const EXCEPTION_MESSAGE: &str = "NoMethodError: undefined method `foo' for nil:NilClass";

/// Key name under which test secrets are stored.
pub const TEST_KEY: &str = "TEST_KEY";

pub const TEST_SECRET: &str = "secret123";

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a response fixture.
pub fn response_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("responses").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

pub fn app_stack() -> Vec<String> {
    vec![
        "/path/to/app/lib/my_module.rb:42:in `process'".to_string(),
        "/path/to/app/lib/my_module.rb:20:in `run'".to_string(),
        "/path/to/app/bin/my_app:10:in `<main>'".to_string(),
    ]
}

/// Client talking over real HTTP with `TEST_KEY` resolving to `TEST_SECRET`.
pub fn client(config: Config) -> AnalyzerClient<ReqwestTransport, StaticSecrets> {
    AnalyzerClient::with_parts(
        config,
        ReqwestTransport,
        StaticSecrets::new().with(TEST_KEY, TEST_SECRET),
    )
}
