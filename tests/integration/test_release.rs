//! Integration tests for the cabal-bump release flow
//!
//! These run the real binary against temporary git repositories. Hackage and
//! cabal are never contacted: runs stop at a precondition, a declined prompt,
//! or a fake tool installed on `PATH`.

use crate::helpers::{TestPackage, run_cabal_bump};
use anyhow::Result;

const MANIFEST: &str = "frob.cabal";

#[test]
fn test_missing_manifest_is_user_error() -> Result<()> {
  let pkg = TestPackage::empty()?;

  let output = run_cabal_bump(&pkg, &[], "")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains(".cabal"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_two_manifests_is_user_error() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.write_manifest("frob-extra", "1.0")?;
  pkg.commit("Second manifest")?;

  let output = run_cabal_bump(&pkg, &[], "")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("frob-extra.cabal"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_dirty_tree_refused_without_changes() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.write_file("src/Lib.hs", "module Lib (x) where\nx = 1\n")?;
  let before = pkg.read_file(MANIFEST)?;

  let output = run_cabal_bump(&pkg, &[], "1.1\n")?;

  assert_eq!(output.status.code(), Some(3));
  assert_eq!(pkg.read_file(MANIFEST)?, before);
  Ok(())
}

#[test]
fn test_invalid_config_is_user_error() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.write_file("cabal-bump.toml", "mode = \"stack\"\n")?;
  pkg.commit("Add config")?;

  let output = run_cabal_bump(&pkg, &[], "")?;

  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_declined_soft_failure_exits_cleanly() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.fake_tool("cabal", 1)?;
  let before = pkg.read_file(MANIFEST)?;

  // `cabal outdated` fails; refuse to continue
  let output = run_cabal_bump(&pkg, &[], "n\n")?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout);
  assert!(stdout.contains("command failed; is this okay? [yN]"));
  assert!(stdout.contains("aborted"));
  assert_eq!(pkg.read_file(MANIFEST)?, before);
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_existing_version_tag_refused() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.tag("v0.9")?;
  pkg.tag("v1.0")?;
  pkg.write_file("src/Lib.hs", "module Lib (x) where\nx = 1\n")?;
  pkg.commit("Add x")?;
  pkg.fake_tool("cabal", 0)?;
  let before = pkg.read_file(MANIFEST)?;

  // Prefixed naming: 1.0 maps to the existing tag v1.0
  let output = run_cabal_bump(&pkg, &[], "1.0\n")?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr);
  assert!(stderr.contains("v1.0"));
  assert_eq!(pkg.read_file(MANIFEST)?, before);
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_manifest_only_change_offers_revision() -> Result<()> {
  let pkg = TestPackage::new("frob", "1.0")?;
  pkg.tag("1.0")?;
  let manifest = pkg.read_file(MANIFEST)?;
  pkg.write_file(MANIFEST, &manifest.replace("Test package", "Better synopsis"))?;
  pkg.commit("Improve synopsis")?;
  pkg.fake_tool("cabal", 0)?;
  pkg.fake_tool("hackage-cli", 0)?;

  // Take the revision, then decline the push
  let output = run_cabal_bump(&pkg, &[], "y\nn\n")?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout);
  assert!(stdout.contains("Only the cabal file changed since 1.0"));
  assert!(stdout.contains("Push revision 1 of frob-1.0 to Hackage? [yN]"));
  let updated = pkg.read_file(MANIFEST)?;
  assert!(updated.contains("version:       1.0\nx-revision: 1\n"), "manifest: {}", updated);
  Ok(())
}
