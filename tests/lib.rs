//! Shared helpers for the vport integration test suite.
