use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd::pipe;
use std::ffi::CString;
use std::os::fd::{AsRawFd, OwnedFd};
use tracing::debug;

use crate::config::WaitMode;
use crate::error::{Result, ShellError};
use crate::process::{self, Child, Outcome};
use crate::redirect::Resolved;

/// Pipe whose both ends are close-on-exec; a child only keeps the end it has
/// dup2'd onto a standard stream.
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd)> {
    let (r, w) = pipe().map_err(ShellError::Pipe)?;
    for fd in [&r, &w] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(ShellError::Pipe)?;
    }
    debug!(read = r.as_raw_fd(), write = w.as_raw_fd(), "pipe");
    Ok((r, w))
}

struct Prepared {
    argv: Vec<CString>,
    program: String,
    redir: Resolved,
}

fn spawn_all(stages: Vec<Prepared>, mode: WaitMode, children: &mut Vec<Child>, outcomes: &mut Vec<(String, Outcome)>) -> Result<()> {
    let last = stages.len() - 1;
    let mut prev_read: Option<OwnedFd> = None;
    for (i, stage) in stages.into_iter().enumerate() {
        let next = if i < last { Some(cloexec_pipe()?) } else { None };
        // a stage's own redirection wins over the pipe end
        let stdin = stage.redir.stdin.as_ref().map(|f| f.as_raw_fd()).or(prev_read.as_ref().map(|r| r.as_raw_fd()));
        let stdout = stage.redir.stdout.as_ref().map(|f| f.as_raw_fd()).or(next.as_ref().map(|(_, w)| w.as_raw_fd()));
        let pid = process::spawn(&stage.argv, stdin, stdout)?;
        // the child holds its copies now; keep only the read end for stage i+1
        prev_read = next.map(|(r, _w)| r);
        drop(stage.redir);
        let child = Child { pid, program: stage.program };
        match mode {
            WaitMode::Eager => {
                let outcome = process::wait(child.pid)?;
                outcomes.push((child.program, outcome));
            }
            WaitMode::Deferred => children.push(child),
        }
    }
    Ok(())
}

/// Waits for every child, in order, even after a failed wait.
fn collect(children: Vec<Child>, outcomes: &mut Vec<(String, Outcome)>) -> Result<()> {
    let mut first_err = None;
    for child in children {
        match process::wait(child.pid) {
            Ok(outcome) => outcomes.push((child.program, outcome)),
            Err(e) => { first_err.get_or_insert(e); }
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Connects stage i's stdout to stage i+1's stdin and runs them all.
///
/// Returns each stage's program name and outcome in stage order. Every
/// spawned child is waited on before this returns, including when a later
/// fork or pipe fails part way through.
pub fn run(stages: Vec<Resolved>, mode: WaitMode) -> Result<Vec<(String, Outcome)>> {
    debug_assert!(stages.len() >= 2);
    let mut prepared = Vec::with_capacity(stages.len());
    for redir in stages {
        let argv = process::to_cstrings(&redir.argv)?;
        let program = redir.argv[0].clone();
        prepared.push(Prepared { argv, program, redir });
    }

    let mut children = Vec::with_capacity(prepared.len());
    let mut outcomes = Vec::with_capacity(prepared.len());
    let spawned = spawn_all(prepared, mode, &mut children, &mut outcomes);
    let waited = collect(children, &mut outcomes);
    spawned?;
    waited?;
    Ok(outcomes)
}
