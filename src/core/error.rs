//! Error types for cabal-bump with contextual messages and exit codes
//!
//! Errors are grouped by category so the orchestrator can tell a broken setup
//! (configuration) from a refused precondition or a failing external tool.
//! A user declining a confirmation is not an error; see `release::ReleaseOutcome::Aborted`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for cabal-bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, missing manifest, missing field)
  User = 1,
  /// System error (external tool, I/O, manifest integrity)
  System = 2,
  /// Precondition refused (dirty tree, existing tag)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for cabal-bump
#[derive(Debug)]
pub enum BumpError {
  /// Configuration errors (manifest discovery, fields, config file)
  Config(ConfigError),

  /// Preconditions that must hold before anything is mutated
  Precondition(PreconditionError),

  /// External tool failures on hard-fail steps
  Tool(ToolError),

  /// Manifest write did not read back as written
  Integrity {
    path: PathBuf,
    field: String,
    expected: String,
    found: Option<String>,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BumpError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BumpError::Message { message, context, help } => BumpError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      BumpError::Io(e) => BumpError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BumpError::Config(_) => ExitCode::User,
      BumpError::Precondition(_) => ExitCode::Validation,
      BumpError::Tool(_) => ExitCode::System,
      BumpError::Integrity { .. } => ExitCode::System,
      BumpError::Io(_) => ExitCode::System,
      BumpError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BumpError::Config(e) => e.help_message(),
      BumpError::Precondition(e) => e.help_message(),
      BumpError::Tool(e) => e.help_message(),
      BumpError::Integrity { .. } => {
        Some("The manifest line could not be rewritten as expected; fix the field by hand and re-run.".to_string())
      }
      BumpError::Message { help, .. } => help.clone(),
      BumpError::Io(_) => None,
    }
  }
}

impl fmt::Display for BumpError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BumpError::Config(e) => write!(f, "{}", e),
      BumpError::Precondition(e) => write!(f, "{}", e),
      BumpError::Tool(e) => write!(f, "{}", e),
      BumpError::Integrity {
        path,
        field,
        expected,
        found,
      } => write!(
        f,
        "Manifest integrity check failed for '{}' in {}: wrote '{}', read back '{}'",
        field,
        path.display(),
        expected,
        found.as_deref().unwrap_or("<missing>")
      ),
      BumpError::Io(e) => write!(f, "I/O error: {}", e),
      BumpError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BumpError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BumpError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BumpError {
  fn from(err: io::Error) -> Self {
    BumpError::Io(err)
  }
}

impl From<ConfigError> for BumpError {
  fn from(err: ConfigError) -> Self {
    BumpError::Config(err)
  }
}

impl From<PreconditionError> for BumpError {
  fn from(err: PreconditionError) -> Self {
    BumpError::Precondition(err)
  }
}

impl From<ToolError> for BumpError {
  fn from(err: ToolError) -> Self {
    BumpError::Tool(err)
  }
}

impl From<regex::Error> for BumpError {
  fn from(err: regex::Error) -> Self {
    BumpError::message(format!("Invalid field pattern: {}", err))
  }
}

impl From<glob::PatternError> for BumpError {
  fn from(err: glob::PatternError) -> Self {
    BumpError::message(format!("Invalid glob pattern: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No `*.cabal` file in the working directory
  ManifestNotFound { dir: PathBuf },

  /// More than one `*.cabal` file in the working directory
  ManifestAmbiguous { candidates: Vec<PathBuf> },

  /// Required manifest field is absent
  MissingField { field: String, path: PathBuf },

  /// Manifest field present but unusable
  InvalidField { field: String, value: String },

  /// Config file could not be parsed or holds a bad value
  InvalidConfig { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestNotFound { .. } => {
        Some("Run cabal-bump from the package directory containing the .cabal file.".to_string())
      }
      ConfigError::ManifestAmbiguous { .. } => {
        Some("Keep exactly one .cabal file in the package directory.".to_string())
      }
      ConfigError::InvalidConfig { .. } => Some(
        "Valid keys: mode, signing_key, tag, remote, branch, hackage_url, dist_dir, docs_dir, username".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ManifestNotFound { dir } => {
        write!(f, "No cabal files in {}", dir.display())
      }
      ConfigError::ManifestAmbiguous { candidates } => {
        write!(f, "More than one cabal file in current directory:")?;
        for candidate in candidates {
          write!(f, "\n  {}", candidate.display())?;
        }
        Ok(())
      }
      ConfigError::MissingField { field, path } => {
        write!(f, "Failed to find value for field '{}' in {}", field, path.display())
      }
      ConfigError::InvalidField { field, value } => {
        write!(f, "Invalid value '{}' for field '{}'", value, field)
      }
      ConfigError::InvalidConfig { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Conditions refused before any mutating step
#[derive(Debug)]
pub enum PreconditionError {
  /// Working tree has uncommitted changes
  DirtyWorkingTree,

  /// Tag for the chosen version already exists
  TagExists { tag: String },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorkingTree => Some("Commit or stash your changes, then re-run.".to_string()),
      PreconditionError::TagExists { .. } => {
        Some("Choose a new version, or delete the tag if it was created by mistake.".to_string())
      }
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorkingTree => write!(f, "Working tree has uncommitted changes"),
      PreconditionError::TagExists { tag } => write!(f, "Tag {} already exists", tag),
    }
  }
}

/// External command failures
#[derive(Debug)]
pub enum ToolError {
  /// Command ran and exited non-zero (or was killed)
  Failed {
    step: String,
    command: String,
    code: Option<i32>,
  },

  /// Command could not be started at all
  Spawn {
    step: String,
    command: String,
    reason: String,
  },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::Spawn { command, .. } => Some(format!(
        "Make sure `{}` is installed and on PATH.",
        command.split_whitespace().next().unwrap_or_default()
      )),
      ToolError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::Failed { step, command, code } => match code {
        Some(code) => write!(f, "Step '{}' failed (exit code {}): {}", step, code, command),
        None => write!(f, "Step '{}' was terminated by a signal: {}", step, command),
      },
      ToolError::Spawn { step, command, reason } => {
        write!(f, "Step '{}' could not run `{}`: {}", step, command, reason)
      }
    }
  }
}

/// Result type alias for cabal-bump
pub type BumpResult<T> = Result<T, BumpError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BumpResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BumpError>,
{
  fn context(self, ctx: impl Into<String>) -> BumpResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &BumpError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
