//! Unit tests for gridboard.

mod property_tests;
mod snapshot_tests;
mod store_tests;
