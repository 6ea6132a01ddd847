//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// A package repository with git history and a private tool directory
pub struct TestPackage {
  _root: TempDir,
  pub path: PathBuf,
  /// Prepended to `PATH` when running cabal-bump; holds fake tools
  pub bin: PathBuf,
}

impl TestPackage {
  /// Create a git repository with nothing committed yet
  pub fn empty() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("pkg");
    let bin = root.path().join("bin");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&bin)?;

    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;

    Ok(Self { _root: root, path, bin })
  }

  /// Create a repository holding `<name>.cabal` at `version`, committed
  pub fn new(name: &str, version: &str) -> Result<Self> {
    let pkg = Self::empty()?;
    pkg.write_manifest(name, version)?;
    std::fs::create_dir_all(pkg.path.join("src"))?;
    std::fs::write(pkg.path.join("src/Lib.hs"), "module Lib where\n")?;
    pkg.commit("Initial package")?;
    Ok(pkg)
  }

  pub fn write_manifest(&self, name: &str, version: &str) -> Result<()> {
    std::fs::write(
      self.path.join(format!("{}.cabal", name)),
      format!(
        "cabal-version: 2.4\n\
         name:          {}\n\
         version:       {}\n\
         synopsis:      Test package\n\
         \n\
         library\n  exposed-modules: Lib\n  hs-source-dirs:  src\n",
        name, version
      ),
    )?;
    Ok(())
  }

  /// Commit all current changes
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Lightweight tag at HEAD
  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file = self.path.join(path);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Install a fake tool that ignores its arguments and exits with `code`
  #[cfg(unix)]
  pub fn fake_tool(&self, name: &str, code: i32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let script = self.bin.join(name);
    std::fs::write(&script, format!("#!/bin/sh\nexit {}\n", code))?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run cabal-bump in the package with `stdin` as the operator's answers
///
/// Failures are returned as `Output`, not errors, so tests can check exit codes.
pub fn run_cabal_bump(pkg: &TestPackage, args: &[&str], stdin: &str) -> Result<Output> {
  let cabal_bump_bin = env!("CARGO_BIN_EXE_cabal-bump");

  let path = match std::env::var_os("PATH") {
    Some(existing) => {
      let mut dirs = vec![pkg.bin.clone()];
      dirs.extend(std::env::split_paths(&existing));
      std::env::join_paths(dirs)?
    }
    None => pkg.bin.clone().into_os_string(),
  };

  let mut child = Command::new(cabal_bump_bin)
    .current_dir(&pkg.path)
    .args(args)
    .env("PATH", path)
    .env_remove("HACKAGE_USERNAME")
    .env_remove("RUST_LOG")
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to run cabal-bump")?;

  child
    .stdin
    .take()
    .context("stdin not captured")?
    .write_all(stdin.as_bytes())?;

  Ok(child.wait_with_output()?)
}
