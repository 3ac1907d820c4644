//! Delta Integration Tests
//!
//! Properties of diff, replay, conflict detection, and merge over generated
//! documents, plus the worked examples from the delta rules.

#[path = "../common/mod.rs"]
mod common;

mod properties;
mod scenarios;
