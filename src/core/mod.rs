//! Core building blocks shared by every cabal-bump operation
//!
//! - **config**: `cabal-bump.toml` parsing and CLI override merging
//! - **error**: Error categories with contextual help and exit codes
//! - **exec**: External command specs and the `Collaborator` interface
//! - **logging**: tracing subscriber setup
//! - **vcs**: git queries and git command builders

pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod vcs;
