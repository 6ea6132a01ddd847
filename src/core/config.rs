//! Run configuration
//!
//! Values come from an optional `cabal-bump.toml` and are overridden by CLI flags.
//! The merged [`RunConfig`] is passed explicitly into the orchestrator; nothing
//! here is process-global.

use crate::core::error::{BumpResult, ConfigError, ResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How the package is built before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
  /// `nix build -f shell.nix`, with haddock documentation upload
  Nix,
  /// `cabal new-build` + `cabal new-test`, no documentation upload
  #[default]
  #[value(alias = "new-build")]
  #[serde(alias = "new-build")]
  DirectBuild,
}

impl BuildMode {
  /// Haddock upload is broken with new-build, so only nix mode prepares docs
  pub fn uploads_docs(self) -> bool {
    matches!(self, BuildMode::Nix)
  }
}

/// Contents of `cabal-bump.toml`
///
/// # Example
///
/// ```toml
/// mode = "nix"
/// signing_key = "releases@example.org"
/// remote = "origin"
/// branch = "main"
/// hackage_url = "https://hackage.haskell.org"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BumpConfig {
  #[serde(default)]
  pub mode: Option<BuildMode>,
  #[serde(default)]
  pub signing_key: Option<String>,
  /// Create and push a release tag (default: true)
  #[serde(default)]
  pub tag: Option<bool>,
  #[serde(default)]
  pub remote: Option<String>,
  #[serde(default)]
  pub branch: Option<String>,
  #[serde(default)]
  pub hackage_url: Option<String>,
  /// Where `cabal sdist` leaves the tarball (default: dist)
  #[serde(default)]
  pub dist_dir: Option<PathBuf>,
  /// Where `cabal haddock` leaves HTML (default: dist/doc/html)
  #[serde(default)]
  pub docs_dir: Option<PathBuf>,
  #[serde(default)]
  pub username: Option<String>,
}

impl BumpConfig {
  /// Find config file in search order: cabal-bump.toml, .cabal-bump.toml, .config/cabal-bump.toml
  pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    let candidates = [
      dir.join("cabal-bump.toml"),
      dir.join(".cabal-bump.toml"),
      dir.join(".config").join("cabal-bump.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load the config file, or defaults when none exists
  ///
  /// An explicit path must exist.
  pub fn load(dir: &Path, explicit: Option<&Path>) -> BumpResult<Self> {
    let path = match explicit {
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(dir) {
        Some(path) => path,
        None => return Ok(Self::default()),
      },
    };

    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: BumpConfig = toml_edit::de::from_str(&content).map_err(|e| ConfigError::InvalidConfig {
      path: path.clone(),
      reason: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), "loaded config");
    config.validate(&path)?;
    Ok(config)
  }

  fn validate(&self, path: &Path) -> BumpResult<()> {
    if let Some(url) = &self.hackage_url
      && !(url.starts_with("https://") || url.starts_with("http://"))
    {
      return Err(
        ConfigError::InvalidConfig {
          path: path.to_path_buf(),
          reason: format!("hackage_url '{}' must start with http:// or https://", url),
        }
        .into(),
      );
    }

    for (key, value) in [("remote", &self.remote), ("branch", &self.branch)] {
      if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        return Err(
          ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: format!("{} must not be empty", key),
          }
          .into(),
        );
      }
    }

    Ok(())
  }
}

/// Flags given on the command line; `None` leaves the file/default value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub mode: Option<BuildMode>,
  pub no_tag: bool,
  pub signing_key: Option<String>,
  pub remote: Option<String>,
  pub branch: Option<String>,
  pub username: Option<String>,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
  pub mode: BuildMode,
  pub make_tag: bool,
  /// `None` signs with git's configured default key
  pub signing_key: Option<String>,
  pub remote: String,
  pub branch: String,
  /// Base URL without trailing slash
  pub hackage_url: String,
  pub dist_dir: PathBuf,
  pub docs_dir: PathBuf,
  pub username: Option<String>,
}

impl Default for RunConfig {
  fn default() -> Self {
    Self {
      mode: BuildMode::default(),
      make_tag: true,
      signing_key: None,
      remote: "origin".to_string(),
      branch: "master".to_string(),
      hackage_url: "https://hackage.haskell.org".to_string(),
      dist_dir: PathBuf::from("dist"),
      docs_dir: PathBuf::from("dist/doc/html"),
      username: None,
    }
  }
}

impl RunConfig {
  /// Merge defaults, file values and CLI flags (CLI wins)
  pub fn resolve(file: BumpConfig, cli: CliOverrides) -> Self {
    let defaults = RunConfig::default();
    let make_tag = !cli.no_tag && file.tag.unwrap_or(defaults.make_tag);

    Self {
      mode: cli.mode.or(file.mode).unwrap_or(defaults.mode),
      make_tag,
      signing_key: cli.signing_key.or(file.signing_key),
      remote: cli.remote.or(file.remote).unwrap_or(defaults.remote),
      branch: cli.branch.or(file.branch).unwrap_or(defaults.branch),
      hackage_url: file
        .hackage_url
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or(defaults.hackage_url),
      dist_dir: file.dist_dir.unwrap_or(defaults.dist_dir),
      docs_dir: file.docs_dir.unwrap_or(defaults.docs_dir),
      username: cli.username.or(file.username),
    }
  }
}
