//! Command lines for cabal, nix and hackage-cli

use crate::core::exec::CommandSpec;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

/// Hackage account used for uploads
pub struct Credentials {
  pub username: String,
  password: SecretString,
}

impl Credentials {
  pub fn new(username: impl Into<String>, password: SecretString) -> Self {
    Self {
      username: username.into(),
      password,
    }
  }

  /// A fresh copy of the password for one command line
  pub fn password(&self) -> SecretString {
    SecretString::from(self.password.expose_secret().to_owned())
  }

  /// `user:password` for curl's `--user`
  pub fn basic_auth(&self) -> SecretString {
    SecretString::from(format!("{}:{}", self.username, self.password.expose_secret()))
  }
}

fn cabal() -> CommandSpec {
  CommandSpec::new("cabal")
}

pub fn outdated() -> CommandSpec {
  cabal().args(["outdated", "--exit-code"])
}

pub fn check() -> CommandSpec {
  cabal().arg("check")
}

pub fn clean() -> CommandSpec {
  cabal().arg("clean")
}

pub fn new_build() -> CommandSpec {
  cabal().arg("new-build")
}

pub fn new_test() -> CommandSpec {
  cabal().arg("new-test")
}

pub fn nix_build() -> CommandSpec {
  CommandSpec::new("nix").args(["build", "-f", "shell.nix"])
}

/// Haddock with links pointing at the package's Hackage pages
pub fn haddock(hackage_url: &str, name: &str) -> CommandSpec {
  cabal().args([
    "haddock".to_string(),
    "--hyperlink-source".to_string(),
    format!("--html-location={}/package/{}/docs", hackage_url, name),
    format!("--contents-location={}/package/{}", hackage_url, name),
  ])
}

pub fn sdist() -> CommandSpec {
  cabal().arg("sdist")
}

/// Upload a source tarball, as a candidate or (`publish`) to the index
pub fn upload(credentials: &Credentials, sdist: &Path, publish: bool) -> CommandSpec {
  let mut cmd = cabal().arg("upload");
  if publish {
    cmd = cmd.arg("--publish");
  }
  cmd
    .args(["--username", credentials.username.as_str(), "--password"])
    .secret_arg(credentials.password())
    .path_arg(sdist)
}

/// Replace the local manifest with Hackage's current revision of it
pub fn sync_cabal(manifest: &Path) -> CommandSpec {
  CommandSpec::new("hackage-cli").arg("sync-cabal").path_arg(manifest)
}

/// Publish a metadata revision of the manifest
pub fn push_cabal(manifest: &Path) -> CommandSpec {
  CommandSpec::new("hackage-cli").arg("push-cabal").path_arg(manifest)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn creds() -> Credentials {
    Credentials::new("alice", SecretString::from("s3cret".to_string()))
  }

  #[test]
  fn test_haddock_locations() {
    assert_eq!(
      haddock("https://hackage.haskell.org", "frob").to_string(),
      "cabal haddock --hyperlink-source \
       --html-location=https://hackage.haskell.org/package/frob/docs \
       --contents-location=https://hackage.haskell.org/package/frob"
    );
  }

  #[test]
  fn test_upload_candidate_and_publish() {
    let sdist = Path::new("dist/frob-1.0.tar.gz");
    assert_eq!(
      upload(&creds(), sdist, false).to_string(),
      "cabal upload --username alice --password **** dist/frob-1.0.tar.gz"
    );
    assert_eq!(
      upload(&creds(), sdist, true).to_string(),
      "cabal upload --publish --username alice --password **** dist/frob-1.0.tar.gz"
    );
  }

  #[test]
  fn test_credentials_basic_auth() {
    assert_eq!(creds().basic_auth().expose_secret(), "alice:s3cret");
    assert_eq!(creds().password().expose_secret(), "s3cret");
  }

  #[test]
  fn test_revision_commands() {
    let manifest = Path::new("frob.cabal");
    assert_eq!(sync_cabal(manifest).to_string(), "hackage-cli sync-cabal frob.cabal");
    assert_eq!(push_cabal(manifest).to_string(), "hackage-cli push-cabal frob.cabal");
  }
}
