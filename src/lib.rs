//! MaType rules core and shared services.
//!
//! `domain` holds value types and the word bank, `sim` the per-tick round
//! controller and score persistence, `config` the TOML settings loader.
//! The terminal front end lives in the `matype` binary.

pub mod config;
pub mod domain;
pub mod sim;
