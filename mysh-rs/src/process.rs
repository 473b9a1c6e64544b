use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, ForkResult, Pid};
use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use tracing::{debug, trace};

use crate::error::{Result, ShellError};
use crate::redirect::Resolved;

/// Status a child exits with when its program image could not be replaced.
pub const EXEC_FAILURE: i32 = 1;

/// How a waited-on child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(i32),
    Signaled(i32),
}

impl Outcome {
    /// `None` for statuses that do not mean the child is gone.
    pub fn from_status(status: WaitStatus) -> Option<Outcome> {
        match status {
            WaitStatus::Exited(_, 0) => Some(Outcome::Success),
            WaitStatus::Exited(_, code) => Some(Outcome::Failed(code)),
            WaitStatus::Signaled(_, sig, _) => Some(Outcome::Signaled(sig as i32)),
            _ => None,
        }
    }

    /// The line reported on stderr, if any.
    pub fn describe(&self, program: &str) -> Option<String> {
        match self {
            Outcome::Success => None,
            Outcome::Failed(code) => Some(format!("{program}: Command failed with exit code: {code}")),
            Outcome::Signaled(sig) => Some(format!("{program}: Terminated by signal: {sig}")),
        }
    }
}

/// A spawned child the caller still has to wait for.
#[derive(Debug)]
pub struct Child {
    pub pid: Pid,
    pub program: String,
}

pub fn to_cstrings(argv: &[String]) -> Result<Vec<CString>> {
    argv.iter().map(|s| CString::new(s.as_str()).map_err(ShellError::from)).collect()
}

fn exec_child(argv: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>) -> ! {
    // the Rust runtime ignores SIGPIPE and an ignored disposition survives exec
    // SAFETY: single-threaded child, restoring the default handler only
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
    let wire = |fd: Option<RawFd>, target: RawFd| fd.map_or(Ok(()), |fd| dup2(fd, target).map(drop));
    let err = match wire(stdin, libc::STDIN_FILENO).and_then(|_| wire(stdout, libc::STDOUT_FILENO)) {
        Err(e) => e,
        Ok(()) => match execvp(&argv[0], argv) { Ok(never) => match never {}, Err(e) => e },
    };
    eprintln!("mysh: {}: Exec failed: {}", argv[0].to_string_lossy(), err);
    // skip atexit handlers and the parent's buffered stdout
    unsafe { libc::_exit(EXEC_FAILURE) }
}

/// Forks a child that wires the given descriptors onto its stdin/stdout and
/// replaces itself with `argv[0]`. Every other descriptor the shell holds is
/// close-on-exec, so the program sees only the three standard streams.
pub fn spawn(argv: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>) -> Result<Pid> {
    debug_assert!(!argv.is_empty());
    let _ = io::stdout().flush();
    // SAFETY: the child only dup2s, execs, or writes one line and _exits.
    match unsafe { fork() }.map_err(ShellError::Fork)? {
        ForkResult::Parent { child } => {
            debug!(pid = child.as_raw(), program = %argv[0].to_string_lossy(), ?stdin, ?stdout, "spawned");
            Ok(child)
        }
        ForkResult::Child => exec_child(argv, stdin, stdout),
    }
}

/// Blocks until `pid` has terminated.
pub fn wait(pid: Pid) -> Result<Outcome> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                trace!(pid = pid.as_raw(), ?status, "waited");
                if let Some(outcome) = Outcome::from_status(status) { return Ok(outcome); }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// Runs one resolved stage to completion. The redirection files are closed in
/// the shell as soon as the child holds its own copies.
pub fn run_single(resolved: Resolved) -> Result<Outcome> {
    let Resolved { argv, stdin, stdout } = resolved;
    let cargv = to_cstrings(&argv)?;
    let pid = spawn(&cargv, stdin.as_ref().map(|f| f.as_raw_fd()), stdout.as_ref().map(|f| f.as_raw_fd()))?;
    drop(stdin);
    drop(stdout);
    wait(pid)
}
