//! `git` subprocess client.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::RepoState;
use crate::{Error, Result};

/// Repository state read by running `git` in a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    cwd: PathBuf,
    program: PathBuf,
}

impl GitCli {
    /// Run `git` from `PATH` in the given directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific `git` executable.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run `git` with `args`, returning stdout. stderr is discarded.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(&self.cwd)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|err| Error::Git(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            return Err(Error::Git(format!(
                "git {} exited with {}",
                args.first().copied().unwrap_or_default(),
                output.status
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|_| Error::Git("git output is not valid UTF-8".to_string()))
    }
}

impl RepoState for GitCli {
    fn root(&self) -> Result<String> {
        let root = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(root.trim().to_string())
    }

    fn remotes(&self) -> Result<Vec<String>> {
        let raw = self.run(&["remote", "-v"])?;
        let remotes = parse_remotes(&raw);

        #[cfg(feature = "logging")]
        for url in &remotes {
            tracing::debug!(remote = %crate::logging_impl::remote_for_log(url), "found remote");
        }

        Ok(remotes)
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        let raw = self.run(&["diff", "--cached", "--name-only", "--diff-filter=ACMR", "-z"])?;
        Ok(parse_staged(&raw))
    }
}

/// Extract remote URLs from `git remote -v` output.
///
/// Each line is `name<TAB>url (fetch|push)`; the URL is the second
/// whitespace-separated field. The result is deduplicated and sorted.
pub fn parse_remotes(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Extract staged paths from NUL- or newline-separated `git diff --name-only` output.
pub fn parse_staged(raw: &str) -> Vec<String> {
    let separator = if raw.contains('\0') { '\0' } else { '\n' };
    raw.split(separator)
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
