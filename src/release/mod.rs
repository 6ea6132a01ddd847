//! Release and revision publishing
//!
//! # Flow
//!
//! 1. **tags**: learn the tag naming convention from a snapshot of existing tags
//! 2. **classify**: compare history since the prior release tag; offer a metadata
//!    revision when only the manifest changed
//! 3. **steps**: lint/clean/build commands with their failure policies
//! 4. **docs**: haddock bundle for Hackage (nix mode)
//! 5. **orchestrator**: sequence everything, prompting at the checkpoints

pub mod classify;
pub mod docs;
pub mod orchestrator;
pub mod steps;
pub mod tags;

pub use orchestrator::{Orchestrator, ReleaseOutcome};
