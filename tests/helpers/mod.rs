//! Test helpers module
//!
//! Mock webhook backend and a test context wiring the services to it.

#![allow(dead_code)]

pub mod test_context;
pub mod webhook_mock;

pub use test_context::*;
pub use webhook_mock::*;
