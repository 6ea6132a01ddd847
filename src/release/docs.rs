//! Haddock documentation bundle for Hackage
//!
//! Hackage expects a gzipped ustar archive whose single top-level directory is
//! named `<name>-<version>-docs`.

use crate::cabal::commands::Credentials;
use crate::core::error::{BumpResult, ResultExt};
use crate::core::exec::CommandSpec;
use crate::utils::copy_dir_all;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name inside the docs archive
pub fn docs_dir_name(name: &str, version: &str) -> String {
  format!("{}-{}-docs", name, version)
}

pub fn docs_tarball_name(name: &str, version: &str) -> String {
  format!("{}.tar.gz", docs_dir_name(name, version))
}

pub fn candidate_docs_url(hackage_url: &str, name: &str, version: &str) -> String {
  format!("{}/package/{}-{}/candidate/docs", hackage_url, name, version)
}

pub fn published_docs_url(hackage_url: &str, name: &str, version: &str) -> String {
  format!("{}/package/{}-{}/docs", hackage_url, name, version)
}

/// Copy haddock output for `name` from `docs_dir` into `<workdir>/<name>-<version>-docs`
///
/// Any directory left over from an earlier run is replaced. Returns the staged
/// directory's name relative to `workdir`.
pub fn stage_docs(workdir: &Path, docs_dir: &Path, name: &str, version: &str) -> BumpResult<PathBuf> {
  let source = workdir.join(docs_dir).join(name);
  let staged = PathBuf::from(docs_dir_name(name, version));
  let target = workdir.join(&staged);

  if target.exists() {
    fs::remove_dir_all(&target).with_context(|| format!("Failed to remove stale {}", target.display()))?;
  }
  copy_dir_all(&source, &target)
    .with_context(|| format!("Failed to copy documentation from {}", source.display()))?;
  tracing::debug!(from = %source.display(), to = %target.display(), "staged docs");
  Ok(staged)
}

/// Remove a staged docs directory once it has been archived
pub fn remove_staged(workdir: &Path, staged: &Path) -> BumpResult<()> {
  let target = workdir.join(staged);
  fs::remove_dir_all(&target).with_context(|| format!("Failed to remove {}", target.display()))
}

/// `tar -czf <dir>.tar.gz --format=ustar <dir>`
pub fn tar_cmd(staged: &Path) -> CommandSpec {
  let tarball = format!("{}.tar.gz", staged.to_string_lossy());
  CommandSpec::new("tar")
    .args(["-czf", tarball.as_str(), "--format=ustar"])
    .path_arg(staged)
}

/// PUT the archive to a Hackage docs URL
pub fn upload_docs_cmd(credentials: &Credentials, tarball: &Path, url: &str) -> CommandSpec {
  CommandSpec::new("curl")
    .args([
      "--fail",
      "-X",
      "PUT",
      "-H",
      "Content-Type: application/x-tar",
      "-H",
      "Content-Encoding: gzip",
      "--user",
    ])
    .secret_arg(credentials.basic_auth())
    .args(["--data-binary".to_string(), format!("@{}", tarball.to_string_lossy())])
    .arg(url)
}

#[cfg(test)]
mod tests {
  use super::*;
  use secrecy::SecretString;

  #[test]
  fn test_names_and_urls() {
    assert_eq!(docs_dir_name("frob", "1.2.3"), "frob-1.2.3-docs");
    assert_eq!(docs_tarball_name("frob", "1.2.3"), "frob-1.2.3-docs.tar.gz");
    assert_eq!(
      candidate_docs_url("https://hackage.haskell.org", "frob", "1.2.3"),
      "https://hackage.haskell.org/package/frob-1.2.3/candidate/docs"
    );
    assert_eq!(
      published_docs_url("https://hackage.haskell.org", "frob", "1.2.3"),
      "https://hackage.haskell.org/package/frob-1.2.3/docs"
    );
  }

  #[test]
  fn test_tar_cmd() {
    assert_eq!(
      tar_cmd(Path::new("frob-1.2.3-docs")).to_string(),
      "tar -czf frob-1.2.3-docs.tar.gz --format=ustar frob-1.2.3-docs"
    );
  }

  #[test]
  fn test_upload_docs_cmd_hides_credentials() {
    let creds = Credentials::new("alice", SecretString::from("s3cret".to_string()));
    let shown = upload_docs_cmd(
      &creds,
      Path::new("frob-1.2.3-docs.tar.gz"),
      "https://hackage.haskell.org/package/frob-1.2.3/docs",
    )
    .to_string();
    assert_eq!(
      shown,
      "curl --fail -X PUT -H Content-Type: application/x-tar -H Content-Encoding: gzip --user **** \
       --data-binary @frob-1.2.3-docs.tar.gz https://hackage.haskell.org/package/frob-1.2.3/docs"
    );
    assert!(!shown.contains("s3cret"));
  }

  #[test]
  fn test_stage_and_remove() {
    let tmp = tempfile::tempdir().unwrap();
    let html = tmp.path().join("dist/doc/html/frob");
    fs::create_dir_all(&html).unwrap();
    fs::write(html.join("index.html"), "docs").unwrap();
    // Leftover from an aborted run
    fs::create_dir_all(tmp.path().join("frob-1.0-docs/old")).unwrap();

    let staged = stage_docs(tmp.path(), Path::new("dist/doc/html"), "frob", "1.0").unwrap();
    assert_eq!(staged, PathBuf::from("frob-1.0-docs"));
    assert!(tmp.path().join("frob-1.0-docs/index.html").exists());
    assert!(!tmp.path().join("frob-1.0-docs/old").exists());

    remove_staged(tmp.path(), &staged).unwrap();
    assert!(!tmp.path().join("frob-1.0-docs").exists());
  }

  #[test]
  fn test_stage_without_haddock_output_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(stage_docs(tmp.path(), Path::new("dist/doc/html"), "frob", "1.0").is_err());
  }
}
