//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads and writes the demo host's TOML file and
//! converts its `[card_field]` section into component options.

pub mod config;
