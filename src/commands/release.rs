//! Release command implementation

use crate::core::config::{BumpConfig, CliOverrides, RunConfig};
use crate::core::error::BumpResult;
use crate::core::exec::SystemRunner;
use crate::release::{Orchestrator, ReleaseOutcome};
use crate::ui::Prompter;
use std::path::Path;

/// Load configuration for `workdir`, merging file values with CLI flags
pub fn load_run_config(workdir: &Path, config_path: Option<&Path>, cli: CliOverrides) -> BumpResult<RunConfig> {
  let file = BumpConfig::load(workdir, config_path)?;
  let config = RunConfig::resolve(file, cli);
  tracing::debug!(?config, "resolved configuration");
  Ok(config)
}

/// Run the release command in `workdir`
///
/// A declined confirmation is reported and returns `Ok`; only failures are errors.
pub fn run_release(workdir: &Path, config: RunConfig) -> BumpResult<ReleaseOutcome> {
  let mut runner = SystemRunner::new(workdir);
  let mut orchestrator = Orchestrator::new(workdir, config, &mut runner, Prompter::stdio());
  let outcome = orchestrator.run()?;

  match &outcome {
    ReleaseOutcome::Aborted(_) => println!("\n🛑 {}", outcome),
    _ => println!("\n✅ {}", outcome),
  }
  Ok(outcome)
}
