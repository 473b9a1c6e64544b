#![allow(dead_code)]
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

pub struct Run {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for Run {
    fn from(o: Output) -> Self {
        Run {
            code: o.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&o.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&o.stderr).into_owned(),
        }
    }
}

/// The shell binary with a clean `MYSH_*` environment, running in `cwd`.
pub fn mysh(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mysh-rs"));
    for k in ["MYSH_PROMPT", "MYSH_WHICH_MODE", "MYSH_WHICH_DIRS", "MYSH_PIPE_WAIT"] { cmd.env_remove(k); }
    cmd.env("MYSH_LOG", "off").current_dir(cwd);
    cmd
}

/// `-c line`
pub fn run_line(cwd: &Path, line: &str) -> Result<Run> {
    Ok(mysh(cwd).arg("-c").arg(line).stdin(Stdio::null()).output()?.into())
}

/// Writes `lines` to a batch file kept outside `cwd` and runs it.
pub fn run_batch(cwd: &Path, extra_args: &[&str], lines: &[&str]) -> Result<Run> {
    let scripts = tempfile::tempdir()?;
    let script = scripts.path().join("batch.sh");
    std::fs::write(&script, lines.join("\n") + "\n")?;
    Ok(mysh(cwd).args(extra_args).arg(&script).stdin(Stdio::null()).output()?.into())
}

/// Interactive mode with `input` piped into stdin.
pub fn run_interactive(cwd: &Path, extra_args: &[&str], input: &str) -> Result<Run> {
    let mut child = mysh(cwd).args(extra_args).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;
    child.stdin.take().expect("child stdin").write_all(input.as_bytes())?;
    Ok(child.wait_with_output()?.into())
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
