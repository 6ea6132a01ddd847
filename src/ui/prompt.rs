//! Interactive prompts
//!
//! Every operator decision goes through [`Prompter`], which reads from an injected
//! input and writes to an injected output. The binary wires it to the terminal;
//! tests feed it a script.

use crate::core::error::{BumpError, BumpResult};
use secrecy::SecretString;
use std::io::{self, BufRead, Write};

pub struct Prompter<'a> {
  input: Box<dyn BufRead + 'a>,
  output: Box<dyn Write + 'a>,
}

impl<'a> Prompter<'a> {
  pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
    Self {
      input: Box::new(input),
      output: Box::new(output),
    }
  }

  /// Prompter on the process's stdin/stdout
  pub fn stdio() -> Prompter<'static> {
    Prompter::new(io::stdin().lock(), io::stdout())
  }

  /// Ask until the answer is one allowed character, or empty with a default
  pub fn prompt_for_char(&mut self, message: &str, allowed: &[char], default: Option<char>) -> BumpResult<char> {
    loop {
      let answer = self.ask(message)?;
      if answer.is_empty()
        && let Some(default) = default
      {
        return Ok(default);
      }

      let mut chars = answer.chars();
      if let (Some(c), None) = (chars.next(), chars.next())
        && allowed.contains(&c)
      {
        return Ok(c);
      }
      tracing::debug!(answer = %answer, ?allowed, "unrecognised answer");
    }
  }

  /// `[yN]` question; anything but `y` is no
  pub fn confirm(&mut self, message: &str) -> BumpResult<bool> {
    let answer = self.prompt_for_char(&format!("{} [yN] ", message), &['y', 'n'], Some('n'))?;
    Ok(answer == 'y')
  }

  /// Free-text answer, trimmed; blank returns `default` when given
  pub fn prompt_line(&mut self, message: &str, default: Option<&str>) -> BumpResult<String> {
    loop {
      let answer = self.ask(message)?;
      let answer = answer.trim();
      match (answer.is_empty(), default) {
        (false, _) => return Ok(answer.to_string()),
        (true, Some(default)) => return Ok(default.to_string()),
        (true, None) => continue,
      }
    }
  }

  /// Answer wrapped so it never reaches logs or `Debug` output
  pub fn prompt_secret(&mut self, message: &str) -> BumpResult<SecretString> {
    let answer = self.ask(message)?;
    Ok(SecretString::from(answer))
  }

  /// Print a progress line on the prompt's output
  pub fn say(&mut self, line: &str) -> BumpResult<()> {
    writeln!(self.output, "{}", line)?;
    Ok(())
  }

  fn ask(&mut self, message: &str) -> BumpResult<String> {
    write!(self.output, "{}", message)?;
    self.output.flush()?;

    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Err(BumpError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "input closed while waiting for an answer",
      )));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
  }
}
