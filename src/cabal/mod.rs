//! Cabal package manifest and `cabal` command builders

pub mod commands;
pub mod manifest;

pub use manifest::Manifest;
