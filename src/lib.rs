//! notedeck - session and token lifecycle client for the notedeck API.
//!
//! This library exposes modules for use in integration tests and by the
//! `notedeck` binary.

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod traits;
