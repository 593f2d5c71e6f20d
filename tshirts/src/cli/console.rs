//! Line-based terminal interaction
//!
//! Commands talk to the user only through [`Console`], so tests can drive
//! them with a byte slice for input and a `Vec<u8>` for output.

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::repo::RepoRef;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Print one line
    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    /// Show `prompt` and read one trimmed line; end of input aborts
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Aborted("input closed".to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Yes/no question; an empty answer takes `default`
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{question} {hint} "))?.to_ascii_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    /// Single-letter menu; asks again until the answer starts with one of
    /// `choices`
    pub fn choose(&mut self, prompt: &str, choices: &[char]) -> Result<char> {
        loop {
            let answer = self.ask(&format!("{prompt} "))?;
            if let Some(c) = answer.chars().next().map(|c| c.to_ascii_lowercase()) {
                if choices.contains(&c) {
                    return Ok(c);
                }
            }
            let options: Vec<String> = choices.iter().map(char::to_string).collect();
            self.say(format!("Please enter one of: {}", options.join(", ")))?;
        }
    }

    /// Numbered menu of `owner/name` strings
    pub fn pick_repo(&mut self, repos: &[String]) -> Result<RepoRef> {
        if repos.is_empty() {
            return Err(Error::Config("no accessible repositories to choose from".to_string()));
        }

        self.say("Select a repository:")?;
        for (i, repo) in repos.iter().enumerate() {
            self.say(format!("  {}. {}", i + 1, repo))?;
        }
        loop {
            let answer = self.ask(&format!("Repository [1-{}]: ", repos.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=repos.len()).contains(&n) => return repos[n - 1].parse(),
                _ => self.say("Invalid selection.")?,
            }
        }
    }
}
