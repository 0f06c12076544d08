//! Indexa+ converter library
//!
//! Exposes the rate client, cache, conversion engine and application state
//! for the binary and for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod convert;
pub mod data;
pub mod ui;
