//! Integration tests for gridboard.
//!
//! These tests verify the interaction between multiple components
//! and test complete workflows end-to-end.

mod drag_drop_tests;
mod upload_workflow_tests;
