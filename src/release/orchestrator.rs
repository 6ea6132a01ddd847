//! Release sequencing
//!
//! The [`Orchestrator`] walks one run from manifest discovery to publication:
//!
//! ```text
//! discover ─► clean? ─► outdated ─► classify ─┬─ Revision ─► sync ─► x-revision ─► push-cabal ─► commit ─► tag
//!                                             └─ FullRelease ─► version ─► build ─► docs ─► commit
//!                                                  ─► sdist ─► candidate ─► review ─► tag ─► publish
//! ```
//!
//! Every external call is a [`Step`] and its [`FailurePolicy`] alone decides what
//! a failure means. An operator declining a prompt ends the run with
//! [`ReleaseOutcome::Aborted`], which is not an error.

use crate::cabal::commands::{self as cabal, Credentials};
use crate::cabal::Manifest;
use crate::core::config::RunConfig;
use crate::core::error::{BumpResult, PreconditionError, ToolError};
use crate::core::exec::Collaborator;
use crate::core::vcs::system_git::{commit_cmd, push_cmd, signed_tag_cmd};
use crate::core::vcs::SystemGit;
use crate::release::classify::{classify, decide, ReleaseDecision};
use crate::release::docs;
use crate::release::steps::{build_steps, FailurePolicy, Step};
use crate::release::tags::{is_release_version, TagSnapshot};
use crate::ui::Prompter;
use std::fmt;
use std::ops::ControlFlow;
use std::path::PathBuf;

/// Why a run stopped without publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aborted {
  pub reason: String,
}

impl Aborted {
  fn new(reason: impl Into<String>) -> Self {
    Self { reason: reason.into() }
  }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
  Released {
    name: String,
    version: String,
    tag: Option<String>,
  },
  Revised {
    name: String,
    version: String,
    revision: u32,
    tag: Option<String>,
  },
  Aborted(Aborted),
}

impl fmt::Display for ReleaseOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseOutcome::Released { name, version, .. } => {
        write!(f, "Version {} of package {} released.", version, name)
      }
      ReleaseOutcome::Revised {
        name,
        version,
        revision,
        ..
      } => write!(f, "Revision {} of package {} version {} published.", revision, name, version),
      ReleaseOutcome::Aborted(aborted) => write!(f, "Release aborted: {}", aborted.reason),
    }
  }
}

/// Step result: continue, or stop because the operator said no
type Flow<T = ()> = BumpResult<ControlFlow<Aborted, T>>;

/// Unwrap a [`Flow`], returning `ReleaseOutcome::Aborted` from the caller on a decline
macro_rules! proceed {
  ($flow:expr) => {
    match $flow? {
      ControlFlow::Continue(value) => value,
      ControlFlow::Break(aborted) => return Ok(ReleaseOutcome::Aborted(aborted)),
    }
  };
}

/// Package identity read once at the start of a run
struct Package {
  manifest: Manifest,
  name: String,
  version: String,
}

pub struct Orchestrator<'a> {
  workdir: PathBuf,
  config: RunConfig,
  tools: &'a mut dyn Collaborator,
  prompt: Prompter<'a>,
}

impl<'a> Orchestrator<'a> {
  pub fn new(
    workdir: impl Into<PathBuf>,
    config: RunConfig,
    tools: &'a mut dyn Collaborator,
    prompt: Prompter<'a>,
  ) -> Self {
    Self {
      workdir: workdir.into(),
      config,
      tools,
      prompt,
    }
  }

  /// Run a release (or revision) to completion
  pub fn run(&mut self) -> BumpResult<ReleaseOutcome> {
    let manifest = Manifest::discover(&self.workdir)?;
    let package = Package {
      name: manifest.name()?,
      version: manifest.version()?,
      manifest,
    };
    tracing::info!(
      path = %package.manifest.path().display(),
      name = %package.name,
      version = %package.version,
      "found package"
    );
    self.say(&format!(
      "📦 {} {} ({})",
      package.name,
      package.version,
      package.manifest.file_name().display()
    ))?;

    if !SystemGit::new(&mut *self.tools).is_clean()? {
      return Err(PreconditionError::DirtyWorkingTree.into());
    }

    proceed!(self.execute(&Step::soft("outdated", cabal::outdated())));

    let snapshot = TagSnapshot::new(SystemGit::new(&mut *self.tools).list_tags()?);
    // Local revision only locates the prior tag; the revision flow re-reads it after syncing
    let local_revision = package.manifest.revision()?;
    let decision = {
      let mut git = SystemGit::new(&mut *self.tools);
      let classification = classify(
        &mut git,
        &snapshot,
        package.manifest.file_name(),
        &package.version,
        local_revision,
      )?;
      tracing::info!(?classification, "classified changes");
      decide(&classification, &mut git, &mut self.prompt)?
    };

    match decision {
      ReleaseDecision::Revision => self.revise(&package, &snapshot),
      ReleaseDecision::FullRelease => self.release(&package, &snapshot),
    }
  }

  fn release(&mut self, package: &Package, snapshot: &TagSnapshot) -> BumpResult<ReleaseOutcome> {
    let Package { manifest, name, .. } = package;

    let version = self.prompt_version(&package.version)?;
    let tag = snapshot.naming().tag_for(&version);
    if snapshot.contains(&tag) {
      return Err(PreconditionError::TagExists { tag }.into());
    }

    manifest.set_version(&version)?;
    self.say(&format!("✏️  {} now at version {}", manifest.file_name().display(), version))?;

    for step in build_steps(self.config.mode) {
      proceed!(self.execute(&step));
    }

    // Executable-only packages have no haddock output to upload
    let docs_tarball = if self.config.mode.uploads_docs() && manifest.has_library()? {
      Some(self.prepare_docs(name, &version)?)
    } else {
      None
    };

    self.allow_failure(&Step::ignored(
      "commit",
      commit_cmd(manifest.file_name(), &format!("Bump to {}", version)),
    ))?;

    self.must_succeed(&Step::hard("sdist", cabal::sdist()))?;
    let sdist = self.config.dist_dir.join(format!("{}-{}.tar.gz", name, version));

    let credentials = self.credentials()?;
    self.must_succeed(&Step::hard("upload candidate", cabal::upload(&credentials, &sdist, false)))?;
    if let Some(tarball) = &docs_tarball {
      let url = docs::candidate_docs_url(&self.config.hackage_url, name, &version);
      self.must_succeed(&Step::hard(
        "upload candidate docs",
        docs::upload_docs_cmd(&credentials, tarball, &url),
      ))?;
    }

    self.say(&format!(
      "🔍 Candidate: {}/package/{}-{}/candidate",
      self.config.hackage_url, name, version
    ))?;
    if !self.prompt.confirm("Does the candidate look right?")? {
      return Ok(ReleaseOutcome::Aborted(Aborted::new("candidate not approved")));
    }

    let tag = if self.config.make_tag {
      self.tag_and_push(&tag, &format!("Release {}", version))?;
      Some(tag)
    } else {
      None
    };

    self.must_succeed(&Step::hard("publish", cabal::upload(&credentials, &sdist, true)))?;
    if let Some(tarball) = &docs_tarball {
      let url = docs::published_docs_url(&self.config.hackage_url, name, &version);
      self.must_succeed(&Step::hard("upload docs", docs::upload_docs_cmd(&credentials, tarball, &url)))?;
    }

    Ok(ReleaseOutcome::Released {
      name: name.clone(),
      version,
      tag,
    })
  }

  fn revise(&mut self, package: &Package, snapshot: &TagSnapshot) -> BumpResult<ReleaseOutcome> {
    let Package { manifest, name, version } = package;

    self.must_succeed(&Step::hard("sync cabal", cabal::sync_cabal(manifest.file_name())))?;
    let published = manifest.revision()?;
    let next = published + 1;
    tracing::info!(published, next, "synced revision from Hackage");

    let tag = snapshot.naming().revision_tag_for(version, next);
    if self.config.make_tag && snapshot.contains(&tag) {
      return Err(PreconditionError::TagExists { tag }.into());
    }

    manifest.set_revision(next)?;

    if !self
      .prompt
      .confirm(&format!("Push revision {} of {}-{} to Hackage?", next, name, version))?
    {
      return Ok(ReleaseOutcome::Aborted(Aborted::new("revision not pushed")));
    }
    self.must_succeed(&Step::hard("push cabal", cabal::push_cabal(manifest.file_name())))?;

    let message = format!("Revision {} of {}", next, version);
    self.allow_failure(&Step::ignored("commit", commit_cmd(manifest.file_name(), &message)))?;

    let tag = if self.config.make_tag {
      self.tag_and_push(&tag, &message)?;
      Some(tag)
    } else {
      None
    };

    Ok(ReleaseOutcome::Revised {
      name: name.clone(),
      version: version.clone(),
      revision: next,
      tag,
    })
  }

  /// Build haddock output and pack it for upload; returns the tarball path
  fn prepare_docs(&mut self, name: &str, version: &str) -> BumpResult<PathBuf> {
    self.must_succeed(&Step::hard("haddock", cabal::haddock(&self.config.hackage_url, name)))?;
    let staged = docs::stage_docs(&self.workdir, &self.config.docs_dir, name, version)?;
    self.must_succeed(&Step::hard("pack docs", docs::tar_cmd(&staged)))?;
    docs::remove_staged(&self.workdir, &staged)?;
    Ok(PathBuf::from(docs::docs_tarball_name(name, version)))
  }

  /// Signed tag, then push branch and tag together
  fn tag_and_push(&mut self, tag: &str, message: &str) -> BumpResult<()> {
    let tag_cmd = signed_tag_cmd(tag, self.config.signing_key.as_deref(), message);
    self.must_succeed(&Step::hard("tag", tag_cmd))?;
    let push = push_cmd(&self.config.remote, &self.config.branch, tag);
    self.must_succeed(&Step::hard("push", push))
  }

  /// Ask for the new version until the answer is dotted numeric
  fn prompt_version(&mut self, current: &str) -> BumpResult<String> {
    loop {
      let version = self
        .prompt
        .prompt_line(&format!("New version [{}]: ", current), Some(current))?;
      if is_release_version(&version) {
        return Ok(version);
      }
      self.say(&format!("⚠️  '{}' is not a version like 1.2.3", version))?;
    }
  }

  fn credentials(&mut self) -> BumpResult<Credentials> {
    let username = match &self.config.username {
      Some(username) => username.clone(),
      None => self.prompt.prompt_line("Hackage user name: ", None)?,
    };
    let password = self.prompt.prompt_secret("Hackage password: ")?;
    Ok(Credentials::new(username, password))
  }

  /// Run a step under its failure policy
  fn execute(&mut self, step: &Step) -> Flow {
    match step.policy {
      FailurePolicy::Hard => self.must_succeed(step)?,
      FailurePolicy::Soft => return self.may_soft_fail(step),
      FailurePolicy::Ignore => self.allow_failure(step)?,
    }
    Ok(ControlFlow::Continue(()))
  }

  fn must_succeed(&mut self, step: &Step) -> BumpResult<()> {
    self.announce(step)?;
    let exit = self.tools.run(&step.command).map_err(|e| ToolError::Spawn {
      step: step.name.to_string(),
      command: step.command.to_string(),
      reason: e.to_string(),
    })?;
    if !exit.success() {
      return Err(
        ToolError::Failed {
          step: step.name.to_string(),
          command: step.command.to_string(),
          code: exit.code,
        }
        .into(),
      );
    }
    Ok(())
  }

  fn may_soft_fail(&mut self, step: &Step) -> Flow {
    self.announce(step)?;
    let succeeded = match self.tools.run(&step.command) {
      Ok(exit) => exit.success(),
      Err(e) => {
        tracing::warn!(step = step.name, error = %e, "could not start command");
        false
      }
    };
    if succeeded {
      return Ok(ControlFlow::Continue(()));
    }

    self.say(&format!("⚠️  {} failed", step.command))?;
    if self.prompt.confirm("command failed; is this okay?")? {
      Ok(ControlFlow::Continue(()))
    } else {
      Ok(ControlFlow::Break(Aborted::new(format!("{} failed", step.name))))
    }
  }

  fn allow_failure(&mut self, step: &Step) -> BumpResult<()> {
    self.announce(step)?;
    match self.tools.run(&step.command) {
      Ok(exit) if exit.success() => {}
      Ok(exit) => tracing::warn!(step = step.name, code = ?exit.code, "ignoring failure"),
      Err(e) => tracing::warn!(step = step.name, error = %e, "ignoring failure to start"),
    }
    Ok(())
  }

  fn announce(&mut self, step: &Step) -> BumpResult<()> {
    tracing::debug!(step = step.name, policy = ?step.policy, "step");
    self.say(&format!("▶️  {}", step.command))
  }

  fn say(&mut self, line: &str) -> BumpResult<()> {
    self.prompt.say(line)
  }
}
