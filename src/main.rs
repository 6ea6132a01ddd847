mod cabal;
mod commands;
mod core;
mod release;
mod ui;
mod utils;

use clap::Parser;
use core::config::{BuildMode, CliOverrides};
use core::error::{BumpError, ResultExt, print_error};
use std::path::PathBuf;

/// Release Haskell packages to Hackage, or publish metadata revisions
#[derive(Parser)]
#[command(name = "cabal-bump")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Build mode: nix (with documentation upload) or direct-build
  #[arg(short, long, value_enum)]
  mode: Option<BuildMode>,

  /// Don't create or push a release tag
  #[arg(short = 'N', long)]
  no_tag: bool,

  /// GPG key used to sign the release tag
  ///
  /// There is no built-in identity: without this flag (or `signing_key` in the
  /// config file) `-u` is omitted and git signs with `user.signingkey`.
  #[arg(short = 'k', long)]
  signing_key: Option<String>,

  /// Config file (default: cabal-bump.toml, .cabal-bump.toml or .config/cabal-bump.toml)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Remote to push the release tag to
  #[arg(long)]
  remote: Option<String>,

  /// Branch pushed together with the release tag
  #[arg(long)]
  branch: Option<String>,

  /// Hackage user name (prompted for when unset)
  #[arg(long, env = "HACKAGE_USERNAME")]
  username: Option<String>,

  /// More diagnostics on stderr (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn get_styles() -> clap::builder::Styles {
  let heading = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan)));
  clap::builder::Styles::styled()
    .header(heading)
    .usage(heading)
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .placeholder(anstyle::Style::new().italic())
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
}

fn main() {
  let cli = Cli::parse();
  core::logging::init(cli.verbose);

  let workdir = match std::env::current_dir().context("Failed to get current directory") {
    Ok(dir) => dir,
    Err(err) => handle_error(err),
  };

  let overrides = CliOverrides {
    mode: cli.mode,
    no_tag: cli.no_tag,
    signing_key: cli.signing_key,
    remote: cli.remote,
    branch: cli.branch,
    username: cli.username,
  };

  let result = commands::load_run_config(&workdir, cli.config.as_deref(), overrides)
    .and_then(|config| commands::run_release(&workdir, config));

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: BumpError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
