//! Field access for a single `.cabal` manifest
//!
//! Only top-level `field: value` lines are understood. Every write is verified by
//! reading the file back, so a pattern that silently fails to match surfaces as an
//! integrity error instead of a release with the wrong version.

use crate::core::error::{BumpError, BumpResult, ConfigError, ResultExt};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

pub const NAME: &str = "name";
pub const VERSION: &str = "version";
pub const REVISION: &str = "x-revision";

/// A `.cabal` file on disk
///
/// Holds only the path; every accessor re-reads the file.
#[derive(Debug, Clone)]
pub struct Manifest {
  path: PathBuf,
}

impl Manifest {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Locate the single `*.cabal` file in `dir`
  pub fn discover(dir: &Path) -> BumpResult<Self> {
    let pattern = format!("{}/*.cabal", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut candidates: Vec<PathBuf> = glob::glob(&pattern)?
      .filter_map(Result::ok)
      .filter(|p| p.is_file())
      .collect();
    candidates.sort();

    match candidates.len() {
      0 => Err(ConfigError::ManifestNotFound { dir: dir.to_path_buf() }.into()),
      1 => Ok(Self::new(candidates.remove(0))),
      _ => Err(ConfigError::ManifestAmbiguous { candidates }.into()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// File name as it appears in `git diff --relative` output
  pub fn file_name(&self) -> &Path {
    self.path.file_name().map(Path::new).unwrap_or(&self.path)
  }

  fn read(&self) -> BumpResult<String> {
    fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
  }

  /// First value token of a top-level field, case-insensitive
  pub fn get_field(&self, field: &str) -> BumpResult<Option<String>> {
    let re = Regex::new(&format!(r"(?im)^{}:[ \t]*(\S+)", regex::escape(field)))?;
    let content = self.read()?;
    Ok(re.captures(&content).map(|caps| caps[1].to_string()))
  }

  /// Like `get_field`, but absence is a configuration error
  pub fn require_field(&self, field: &str) -> BumpResult<String> {
    self.get_field(field)?.ok_or_else(|| {
      ConfigError::MissingField {
        field: field.to_string(),
        path: self.path.clone(),
      }
      .into()
    })
  }

  pub fn name(&self) -> BumpResult<String> {
    self.require_field(NAME)
  }

  pub fn version(&self) -> BumpResult<String> {
    self.require_field(VERSION)
  }

  /// Metadata revision; 0 when `x-revision` is absent
  pub fn revision(&self) -> BumpResult<u32> {
    match self.get_field(REVISION)? {
      None => Ok(0),
      Some(value) => value.parse().map_err(|_| {
        ConfigError::InvalidField {
          field: REVISION.to_string(),
          value,
        }
        .into()
      }),
    }
  }

  /// True if the manifest declares a library stanza
  pub fn has_library(&self) -> BumpResult<bool> {
    let re = Regex::new(r"(?im)^library(\s|$)")?;
    Ok(re.is_match(&self.read()?))
  }

  /// Replace the value of a field in place
  ///
  /// Whitespace after the colon and any trailing `-- comment` are preserved.
  pub fn set_field(&self, field: &str, value: &str) -> BumpResult<()> {
    let re = Regex::new(&format!(
      r"(?im)^(?P<pre>{}:[ \t]*)(?P<val>\S+)(?P<post>.*)$",
      regex::escape(field)
    ))?;
    let content = self.read()?;

    let occurrences = re.find_iter(&content).count();
    if occurrences > 1 {
      return Err(BumpError::with_help(
        format!(
          "Field '{}' appears {} times in {}",
          field,
          occurrences,
          self.path.display()
        ),
        "Each top-level field may appear only once.",
      ));
    }

    let updated = re.replacen(&content, 1, |caps: &Captures| {
      format!("{}{}{}", &caps["pre"], value, &caps["post"])
    });
    self.write_verified(&content, &updated, field, value)
  }

  pub fn set_version(&self, version: &str) -> BumpResult<()> {
    self.set_field(VERSION, version)
  }

  /// Set `x-revision`, inserting it after the `version:` line if absent
  pub fn set_revision(&self, revision: u32) -> BumpResult<()> {
    let value = revision.to_string();
    if self.get_field(REVISION)?.is_some() {
      return self.set_field(REVISION, &value);
    }

    let content = self.read()?;
    let version_line = Regex::new(&format!(r"(?im)^{}:.*$", VERSION))?;
    let end = version_line.find(&content).map(|m| m.end()).ok_or_else(|| {
      BumpError::from(ConfigError::MissingField {
        field: VERSION.to_string(),
        path: self.path.clone(),
      })
    })?;

    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    // A CRLF version line keeps its '\r' inside the match
    let end = if content[..end].ends_with('\r') { end - 1 } else { end };
    let updated = format!(
      "{}{}{}: {}{}",
      &content[..end],
      newline,
      REVISION,
      value,
      &content[end..]
    );
    self.write_verified(&content, &updated, REVISION, &value)
  }

  fn write(&self, content: &str) -> BumpResult<()> {
    fs::write(&self.path, content).with_context(|| format!("Failed to write {}", self.path.display()))
  }

  /// Write `updated`, putting `original` back if the new value does not read back
  fn write_verified(&self, original: &str, updated: &str, field: &str, expected: &str) -> BumpResult<()> {
    self.write(updated)?;
    if let Err(err) = self.verify(field, expected) {
      self.write(original)?;
      return Err(err);
    }
    Ok(())
  }

  fn verify(&self, field: &str, expected: &str) -> BumpResult<()> {
    let found = self.get_field(field)?;
    if found.as_deref() != Some(expected) {
      return Err(BumpError::Integrity {
        path: self.path.clone(),
        field: field.to_string(),
        expected: expected.to_string(),
        found,
      });
    }
    tracing::debug!(field, value = expected, "manifest field written");
    Ok(())
  }
}
