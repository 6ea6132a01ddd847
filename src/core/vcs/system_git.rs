//! System git backend
//!
//! Queries (tags, cleanliness, changed paths) are captured and parsed here.
//! Mutating operations (commit, tag, push) are only built as [`CommandSpec`]s so
//! the orchestrator can run them under each step's failure policy.

use crate::core::error::{BumpError, BumpResult, ToolError};
use crate::core::exec::{Collaborator, CommandOutput, CommandSpec};
use std::path::{Path, PathBuf};

/// Git queries over a [`Collaborator`]
pub struct SystemGit<'a> {
  tools: &'a mut dyn Collaborator,
}

impl<'a> SystemGit<'a> {
  pub fn new(tools: &'a mut dyn Collaborator) -> Self {
    Self { tools }
  }

  /// All tag names, in git's listing order
  pub fn list_tags(&mut self) -> BumpResult<Vec<String>> {
    let output = self.query("list tags", git_cmd().args(["tag", "--list"]))?;
    Ok(
      output
        .stdout
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }

  /// True when neither the index nor the working tree differ from HEAD
  ///
  /// `git diff --quiet` exits 1 for differences; anything else non-zero is a real failure.
  /// Untracked files are not considered.
  pub fn is_clean(&mut self) -> BumpResult<bool> {
    let cmd = git_cmd().args(["diff", "--quiet", "HEAD"]);
    let output = self.spawn("clean check", &cmd)?;
    match output.exit.code {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      code => Err(BumpError::Tool(ToolError::Failed {
        step: "clean check".to_string(),
        command: cmd.to_string(),
        code,
      })),
    }
  }

  /// Paths changed between two refs, relative to the working directory
  ///
  /// `--relative` limits the diff to the package directory, so changes to sibling
  /// packages in the same repository do not count.
  pub fn changed_files_between(&mut self, from: &str, to: &str) -> BumpResult<Vec<PathBuf>> {
    let output = self.query(
      "changed files",
      git_cmd().args(["diff", "--name-only", "--relative", from, to]),
    )?;
    Ok(
      output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect(),
    )
  }

  /// Show the full diff between two refs on the terminal
  pub fn show_diff(&mut self, from: &str, to: &str) -> BumpResult<()> {
    let cmd = git_cmd().args(["diff", from, to]);
    let exit = self.tools.run(&cmd).map_err(|e| spawn_error("show diff", &cmd, e))?;
    if !exit.success() {
      tracing::warn!(command = %cmd, code = ?exit.code, "diff exited non-zero");
    }
    Ok(())
  }

  fn spawn(&mut self, step: &str, cmd: &CommandSpec) -> BumpResult<CommandOutput> {
    self.tools.capture(cmd).map_err(|e| spawn_error(step, cmd, e))
  }

  fn query(&mut self, step: &str, cmd: CommandSpec) -> BumpResult<CommandOutput> {
    let output = self.spawn(step, &cmd)?;
    if !output.exit.success() {
      tracing::debug!(stderr = %output.stderr.trim(), "git query failed");
      return Err(BumpError::Tool(ToolError::Failed {
        step: step.to_string(),
        command: cmd.to_string(),
        code: output.exit.code,
      }));
    }
    Ok(output)
  }
}

fn spawn_error(step: &str, cmd: &CommandSpec, err: std::io::Error) -> BumpError {
  BumpError::Tool(ToolError::Spawn {
    step: step.to_string(),
    command: cmd.to_string(),
    reason: err.to_string(),
  })
}

/// Base git command with stable output settings
pub fn git_cmd() -> CommandSpec {
  // Don't escape non-ASCII paths in diff output
  CommandSpec::new("git").args(["-c", "core.quotePath=false"])
}

/// `git commit <manifest> -m <message> --edit`
pub fn commit_cmd(manifest: &Path, message: &str) -> CommandSpec {
  git_cmd()
    .arg("commit")
    .path_arg(manifest)
    .args(["-m", message, "--edit"])
}

/// Annotated, signed tag; without a key git signs with the committer identity
pub fn signed_tag_cmd(tag: &str, signing_key: Option<&str>, message: &str) -> CommandSpec {
  let mut cmd = git_cmd().args(["tag", "--annotate", "--sign"]);
  if let Some(key) = signing_key {
    cmd = cmd.args(["-u", key]);
  }
  cmd.args(["-m", message, tag])
}

/// Push the branch pointer together with the new tag
pub fn push_cmd(remote: &str, branch: &str, tag: &str) -> CommandSpec {
  git_cmd().args(["push", remote, branch, tag])
}
