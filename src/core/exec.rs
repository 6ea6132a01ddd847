//! External command execution
//!
//! Every tool cabal-bump drives (git, cabal, nix, curl, tar, hackage-cli) is run
//! through the [`Collaborator`] trait. Commands are plain data ([`CommandSpec`]) so
//! the release steps can be tabulated and replayed against a fake in tests.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One command-line argument, possibly sensitive
enum Arg {
  Plain(String),
  Secret(SecretString),
}

/// A command to run: program plus arguments
///
/// Secret arguments are passed to the process but never shown by `Display`.
pub struct CommandSpec {
  program: String,
  args: Vec<Arg>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(Arg::Plain(arg.into()));
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(|a| Arg::Plain(a.into())));
    self
  }

  /// Path argument (lossy UTF-8, paths here are package-local)
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy().into_owned())
  }

  /// Sensitive argument (password, credentials), redacted in display and logs
  pub fn secret_arg(mut self, secret: SecretString) -> Self {
    self.args.push(Arg::Secret(secret));
    self
  }

  /// Non-secret arguments in order (secrets appear as `****`)
  pub fn redacted_args(&self) -> Vec<&str> {
    self
      .args
      .iter()
      .map(|a| match a {
        Arg::Plain(s) => s.as_str(),
        Arg::Secret(_) => "****",
      })
      .collect()
  }

  fn to_command(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    for arg in &self.args {
      match arg {
        Arg::Plain(s) => cmd.arg(s),
        Arg::Secret(s) => cmd.arg(s.expose_secret()),
      };
    }
    cmd
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in self.redacted_args() {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// How a finished command exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
  /// Exit code, `None` when killed by a signal
  pub code: Option<i32>,
}

impl Exit {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

impl From<std::process::ExitStatus> for Exit {
  fn from(status: std::process::ExitStatus) -> Self {
    Self { code: status.code() }
  }
}

/// Captured output of a command
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub exit: Exit,
  pub stdout: String,
  pub stderr: String,
}

/// Interface to external tools
///
/// `run` hands the terminal to the child (editors, gpg pinentry, build output);
/// `capture` collects stdout for queries. Neither applies a failure policy:
/// that is decided per step by the orchestrator. An `Err` means the process
/// could not be started.
pub trait Collaborator {
  /// Run with inherited stdio and wait for completion
  fn run(&mut self, cmd: &CommandSpec) -> io::Result<Exit>;

  /// Run with captured stdout/stderr and wait for completion
  fn capture(&mut self, cmd: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Collaborator backed by real processes
pub struct SystemRunner {
  workdir: PathBuf,
}

impl SystemRunner {
  pub fn new(workdir: impl Into<PathBuf>) -> Self {
    Self { workdir: workdir.into() }
  }
}

impl Collaborator for SystemRunner {
  fn run(&mut self, cmd: &CommandSpec) -> io::Result<Exit> {
    tracing::debug!(command = %cmd, "running");
    let status = cmd
      .to_command()
      .current_dir(&self.workdir)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()?;
    let exit = Exit::from(status);
    tracing::debug!(command = %cmd, code = ?exit.code, "finished");
    Ok(exit)
  }

  fn capture(&mut self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
    tracing::debug!(command = %cmd, "capturing");
    let output = cmd
      .to_command()
      .current_dir(&self.workdir)
      .stdin(Stdio::null())
      .output()?;
    let result = CommandOutput {
      exit: Exit::from(output.status),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!(command = %cmd, code = ?result.exit.code, "captured");
    Ok(result)
  }
}

/// Scripted collaborator for unit tests
#[cfg(test)]
pub mod testing {
  use super::*;

  enum Reply {
    Exit { code: i32, stdout: String },
    Missing,
    Rewrite { path: PathBuf, content: String },
  }

  /// Records every command (git's `-c` settings stripped) and answers from rules
  ///
  /// Rules match by prefix in insertion order; unmatched commands succeed with
  /// empty output.
  #[derive(Default)]
  pub struct FakeTools {
    pub calls: Vec<String>,
    rules: Vec<(String, Reply)>,
  }

  impl FakeTools {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn on(mut self, prefix: &str, code: i32, stdout: &str) -> Self {
      self.rules.push((
        prefix.to_string(),
        Reply::Exit {
          code,
          stdout: stdout.to_string(),
        },
      ));
      self
    }

    /// Commands starting with `prefix` fail to spawn
    pub fn missing(mut self, prefix: &str) -> Self {
      self.rules.push((prefix.to_string(), Reply::Missing));
      self
    }

    /// Commands starting with `prefix` succeed after replacing the file at `path`
    pub fn rewrites(mut self, prefix: &str, path: impl Into<PathBuf>, content: &str) -> Self {
      self.rules.push((
        prefix.to_string(),
        Reply::Rewrite {
          path: path.into(),
          content: content.to_string(),
        },
      ));
      self
    }

    pub fn ran(&self, prefix: &str) -> bool {
      self.position(prefix).is_some()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
      self.calls.iter().position(|c| c.starts_with(prefix))
    }

    fn answer(&mut self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
      let shown = cmd.to_string().replace(" -c core.quotePath=false", "");
      let reply = self.rules.iter().find(|(prefix, _)| shown.starts_with(prefix.as_str()));
      let output = match reply {
        Some((_, Reply::Missing)) => {
          self.calls.push(shown);
          return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
        }
        Some((_, Reply::Exit { code, stdout })) => CommandOutput {
          exit: Exit { code: Some(*code) },
          stdout: stdout.clone(),
          stderr: String::new(),
        },
        Some((_, Reply::Rewrite { path, content })) => {
          std::fs::write(path, content)?;
          CommandOutput {
            exit: Exit { code: Some(0) },
            stdout: String::new(),
            stderr: String::new(),
          }
        }
        None => CommandOutput {
          exit: Exit { code: Some(0) },
          stdout: String::new(),
          stderr: String::new(),
        },
      };
      self.calls.push(shown);
      Ok(output)
    }
  }

  impl Collaborator for FakeTools {
    fn run(&mut self, cmd: &CommandSpec) -> io::Result<Exit> {
      self.answer(cmd).map(|o| o.exit)
    }

    fn capture(&mut self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
      self.answer(cmd)
    }
  }
}
