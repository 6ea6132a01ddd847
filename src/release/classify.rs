//! Metadata-only vs substantive change detection
//!
//! ```text
//! NoPriorTag ─────────────────────────────────► FullRelease
//! PriorTagExists ─► diff tag..HEAD ─┬─ only manifest ─► OfferRevision ─┬─► Revision
//!                                   │                     ▲     │      └─► FullRelease
//!                                   │                     └─ d ─┘ (show diff)
//!                                   └─ other paths ─► FullReleaseRequired ─► FullRelease
//! ```

use crate::core::error::BumpResult;
use crate::core::vcs::SystemGit;
use crate::release::tags::TagSnapshot;
use crate::ui::Prompter;
use std::path::{Path, PathBuf};

/// Where history stands relative to the last release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorRelease {
  /// No release tags at all
  NoPriorTag,
  /// The last release of the manifest's version is tagged
  PriorTagExists { tag: String },
  /// Release tags exist but none for this version (naming changed, tag deleted)
  TagNotFound { expected: String },
}

/// Result of comparing history against the prior release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
  /// Only the manifest changed; a metadata revision is possible
  OfferRevision { prior_tag: String },
  /// Anything else
  FullReleaseRequired { reason: String },
}

/// What the operator chose to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDecision {
  Revision,
  FullRelease,
}

/// Locate the tag of the release the manifest currently describes
pub fn find_prior_release(snapshot: &TagSnapshot, version: &str, revision: u32) -> PriorRelease {
  if !snapshot.has_release_tags() {
    return PriorRelease::NoPriorTag;
  }
  match snapshot.prior_release_tag(version, revision) {
    Some(tag) => PriorRelease::PriorTagExists { tag },
    None => PriorRelease::TagNotFound {
      expected: snapshot.naming().tag_for(version),
    },
  }
}

/// Partition changed paths into manifest / everything else
pub fn classify_changes(prior_tag: &str, changed: &[PathBuf], manifest_file: &Path) -> Classification {
  let (manifest, other): (Vec<&PathBuf>, Vec<&PathBuf>) = changed.iter().partition(|p| p.as_path() == manifest_file);
  tracing::debug!(
    prior_tag,
    manifest = manifest.len(),
    other = other.len(),
    "changes since prior release"
  );

  if other.is_empty() {
    Classification::OfferRevision {
      prior_tag: prior_tag.to_string(),
    }
  } else {
    Classification::FullReleaseRequired {
      reason: format!("{} file(s) besides the manifest changed since {}", other.len(), prior_tag),
    }
  }
}

/// Run the classifier against git history
pub fn classify(
  git: &mut SystemGit<'_>,
  snapshot: &TagSnapshot,
  manifest_file: &Path,
  version: &str,
  revision: u32,
) -> BumpResult<Classification> {
  match find_prior_release(snapshot, version, revision) {
    PriorRelease::NoPriorTag => Ok(Classification::FullReleaseRequired {
      reason: "no previous release tag".to_string(),
    }),
    PriorRelease::TagNotFound { expected } => {
      tracing::info!(expected = %expected, "prior release tag not found; treating as full release");
      Ok(Classification::FullReleaseRequired {
        reason: format!("tag {} for the current version not found", expected),
      })
    }
    PriorRelease::PriorTagExists { tag } => {
      let changed = git.changed_files_between(&tag, "HEAD")?;
      Ok(classify_changes(&tag, &changed, manifest_file))
    }
  }
}

/// Turn a classification into a decision, asking the operator when a revision is possible
pub fn decide(
  classification: &Classification,
  git: &mut SystemGit<'_>,
  prompt: &mut Prompter<'_>,
) -> BumpResult<ReleaseDecision> {
  let prior_tag = match classification {
    Classification::FullReleaseRequired { .. } => return Ok(ReleaseDecision::FullRelease),
    Classification::OfferRevision { prior_tag } => prior_tag,
  };

  prompt.say(&format!("📝 Only the cabal file changed since {}.", prior_tag))?;
  loop {
    let answer = prompt.prompt_for_char(
      "Make a metadata revision instead of a release? [y]es / [n]o / show [d]iff: ",
      &['y', 'n', 'd'],
      None,
    )?;
    match answer {
      'y' => return Ok(ReleaseDecision::Revision),
      'n' => return Ok(ReleaseDecision::FullRelease),
      _ => git.show_diff(prior_tag, "HEAD")?,
    }
  }
}
