//! Tests for the key-value layer

mod entry_tests;
mod recovery_tests;
