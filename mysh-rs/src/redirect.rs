use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use tracing::debug;

use crate::error::{Direction, Result, ShellError};
use crate::tokenize::Stage;
use crate::wildcard;

pub const REDIRECT_IN: &str = "<";
pub const REDIRECT_OUT: &str = ">";

const CREATE_MODE: u32 = 0o640;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub direction: Direction,
    pub target: String,
}

/// A stage split into its raw arguments and its redirections, nothing opened
/// or expanded yet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scanned {
    pub argv: Stage,
    pub redirects: Vec<Redirect>,
}

/// A stage with its redirection operators stripped and the targets opened.
///
/// The files are owned here until the child is spawned; dropping the value
/// closes them in the shell, whether or not anything ran.
#[derive(Debug, Default)]
pub struct Resolved {
    pub argv: Stage,
    pub stdin: Option<File>,
    pub stdout: Option<File>,
}

fn open_target(direction: Direction, path: &str) -> Result<File> {
    let mut opts = OpenOptions::new();
    match direction {
        Direction::Input => opts.read(true),
        Direction::Output => opts.write(true).create(true).truncate(true).mode(CREATE_MODE),
    };
    opts.open(path).map_err(|source| ShellError::RedirectOpen { direction, path: path.to_string(), source })
}

/// A wildcard target is only taken when it names exactly one entry.
fn expand_target(target: &str) -> String {
    let mut matches = wildcard::expand_token(target);
    if matches.len() == 1 { matches.remove(0) } else { target.to_string() }
}

/// Scans the unexpanded tokens left to right for `<` and `>`. Each operator
/// consumes the next token as its target. Operators are only recognised here,
/// so a file named `>` that a wildcard later expands to stays an argument.
pub fn scan(stage: Stage) -> Result<Scanned> {
    let mut out = Scanned { argv: Vec::with_capacity(stage.len()), redirects: Vec::new() };
    let mut toks = stage.into_iter();
    while let Some(tok) = toks.next() {
        let direction = match tok.as_str() {
            REDIRECT_IN => Direction::Input,
            REDIRECT_OUT => Direction::Output,
            _ => { out.argv.push(tok); continue; }
        };
        let target = toks.next().ok_or(ShellError::MissingRedirectTarget(direction))?;
        out.redirects.push(Redirect { direction, target });
    }
    Ok(out)
}

impl Scanned {
    /// Expands the arguments and opens every target in order. A later operator
    /// of the same direction replaces the earlier one; the earlier file has
    /// still been opened (and, for `>`, truncated).
    pub fn open(self) -> Result<Resolved> {
        let mut out = Resolved { argv: wildcard::expand_stage(&self.argv), ..Default::default() };
        for Redirect { direction, target } in self.redirects {
            let target = expand_target(&target);
            let file = open_target(direction, &target)?;
            debug!(%direction, target = %target, "redirection opened");
            match direction {
                Direction::Input => out.stdin = Some(file),
                Direction::Output => out.stdout = Some(file),
            }
        }
        Ok(out)
    }
}

pub fn resolve(stage: Stage) -> Result<Resolved> {
    scan(stage)?.open()
}
