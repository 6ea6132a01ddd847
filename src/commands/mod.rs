//! CLI commands for cabal-bump
//!
//! - **release**: release a new version, or publish a metadata revision of the
//!   current one, to Hackage

pub mod release;

pub use release::{load_run_config, run_release};
