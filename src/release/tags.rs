//! Release tag naming
//!
//! Repositories tag releases either as `v1.2.3` or as `1.2.3`. The convention is
//! learned once per run from a snapshot of existing tags; creating tags later in
//! the run never changes it.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PREFIXED_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v[0-9]+(\.[0-9]+)+(-r[0-9]+)?$").unwrap());

static BARE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+(-r[0-9]+)?$").unwrap());

static VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").unwrap());

/// Dotted numeric version such as `2` or `1.2.3.4`
pub fn is_release_version(version: &str) -> bool {
  VERSION.is_match(version)
}

/// Tag naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagNaming {
  /// `v1.2.3`
  Prefixed,
  /// `1.2.3`
  Bare,
}

impl TagNaming {
  /// Majority vote over release-looking tags; ties go to `Bare`
  pub fn infer<S: AsRef<str>>(tags: &[S]) -> Self {
    let prefixed = tags.iter().filter(|t| PREFIXED_TAG.is_match(t.as_ref())).count();
    let bare = tags.iter().filter(|t| BARE_TAG.is_match(t.as_ref())).count();
    tracing::debug!(prefixed, bare, "inferred tag naming");

    if prefixed > bare {
      TagNaming::Prefixed
    } else {
      TagNaming::Bare
    }
  }

  /// Tag for a full release of `version`
  pub fn tag_for(self, version: &str) -> String {
    match self {
      TagNaming::Prefixed => format!("v{}", version),
      TagNaming::Bare => version.to_string(),
    }
  }

  /// Tag for metadata revision `revision` of `version`
  pub fn revision_tag_for(self, version: &str, revision: u32) -> String {
    format!("{}-r{}", self.tag_for(version), revision)
  }
}

/// Tags as they were at the start of the run, with the naming inferred from them
#[derive(Debug, Clone)]
pub struct TagSnapshot {
  tags: BTreeSet<String>,
  naming: TagNaming,
}

impl TagSnapshot {
  pub fn new(tags: Vec<String>) -> Self {
    let naming = TagNaming::infer(&tags);
    Self {
      tags: tags.into_iter().collect(),
      naming,
    }
  }

  pub fn naming(&self) -> TagNaming {
    self.naming
  }

  pub fn contains(&self, tag: &str) -> bool {
    self.tags.contains(tag)
  }

  /// True if any tag follows either release naming scheme
  pub fn has_release_tags(&self) -> bool {
    self
      .tags
      .iter()
      .any(|t| PREFIXED_TAG.is_match(t) || BARE_TAG.is_match(t))
  }

  /// Tag of the most recent release of `version`
  ///
  /// A revision tag (`1.2.3-r2`) wins over the plain release tag when the manifest
  /// carries that revision and the tag exists. Returns `None` when neither exists.
  pub fn prior_release_tag(&self, version: &str, revision: u32) -> Option<String> {
    if revision > 0 {
      let revised = self.naming.revision_tag_for(version, revision);
      if self.contains(&revised) {
        return Some(revised);
      }
    }
    let plain = self.naming.tag_for(version);
    self.contains(&plain).then_some(plain)
  }
}
