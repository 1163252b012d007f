//! record_editor integration tests.

mod local;
mod actor;
mod config;
