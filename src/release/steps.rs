//! Release steps as data
//!
//! Each external call is a named [`Step`] with a fixed [`FailurePolicy`]; the
//! orchestrator decides what a failure means by looking at the policy alone.

use crate::cabal::commands as cabal;
use crate::core::config::BuildMode;
use crate::core::exec::CommandSpec;

/// What a non-zero exit (or a tool that won't start) means for the release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
  /// Abort the release with the tool's error
  Hard,
  /// Ask the operator whether to continue
  Soft,
  /// Log and carry on
  Ignore,
}

pub struct Step {
  pub name: &'static str,
  pub command: CommandSpec,
  pub policy: FailurePolicy,
}

impl Step {
  pub fn hard(name: &'static str, command: CommandSpec) -> Self {
    Self {
      name,
      command,
      policy: FailurePolicy::Hard,
    }
  }

  pub fn soft(name: &'static str, command: CommandSpec) -> Self {
    Self {
      name,
      command,
      policy: FailurePolicy::Soft,
    }
  }

  pub fn ignored(name: &'static str, command: CommandSpec) -> Self {
    Self {
      name,
      command,
      policy: FailurePolicy::Ignore,
    }
  }
}

/// Lint, clean and build for the chosen mode
pub fn build_steps(mode: BuildMode) -> Vec<Step> {
  let mut steps = vec![Step::soft("check", cabal::check()), Step::hard("clean", cabal::clean())];
  match mode {
    BuildMode::Nix => steps.push(Step::soft("nix build", cabal::nix_build())),
    BuildMode::DirectBuild => {
      steps.push(Step::hard("build", cabal::new_build()));
      steps.push(Step::soft("test", cabal::new_test()));
    }
  }
  steps
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table(mode: BuildMode) -> Vec<(String, FailurePolicy)> {
    build_steps(mode)
      .into_iter()
      .map(|s| (s.command.to_string(), s.policy))
      .collect()
  }

  #[test]
  fn test_nix_steps() {
    assert_eq!(
      table(BuildMode::Nix),
      vec![
        ("cabal check".to_string(), FailurePolicy::Soft),
        ("cabal clean".to_string(), FailurePolicy::Hard),
        ("nix build -f shell.nix".to_string(), FailurePolicy::Soft),
      ]
    );
  }

  #[test]
  fn test_direct_build_steps() {
    assert_eq!(
      table(BuildMode::DirectBuild),
      vec![
        ("cabal check".to_string(), FailurePolicy::Soft),
        ("cabal clean".to_string(), FailurePolicy::Hard),
        ("cabal new-build".to_string(), FailurePolicy::Hard),
        ("cabal new-test".to_string(), FailurePolicy::Soft),
      ]
    );
  }
}
