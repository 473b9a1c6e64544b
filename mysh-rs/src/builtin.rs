use std::env;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{Config, WhichMode};
use crate::error::{Result, ShellError};

/// State that outlives a single command.
#[derive(Debug, Default, Clone)]
pub struct ShellState {
    /// Where `cd -` goes. Set to the old directory by every successful `cd`.
    pub prev_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow { Continue, Exit(i32) }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind { Cd, Pwd, Exit, Which }

pub fn lookup(name: &str) -> Option<BuiltinKind> {
    match name {
        "cd" => Some(BuiltinKind::Cd),
        "pwd" => Some(BuiltinKind::Pwd),
        "exit" => Some(BuiltinKind::Exit),
        "which" => Some(BuiltinKind::Which),
        _ => None,
    }
}

/// Runs a built-in inside the shell process. `args` excludes the name.
pub fn run(kind: BuiltinKind, state: &mut ShellState, cfg: &Config, args: &[String], out: &mut dyn Write) -> Result<Flow> {
    match kind {
        BuiltinKind::Cd => cd(state, args)?,
        BuiltinKind::Pwd => pwd(out)?,
        BuiltinKind::Exit => return Ok(Flow::Exit(0)),
        BuiltinKind::Which => which(cfg, args, out)?,
    }
    Ok(Flow::Continue)
}

fn cd(state: &mut ShellState, args: &[String]) -> Result<()> {
    let [target] = args else { return Err(ShellError::CdUsage) };
    let dest = if target == "-" {
        state.prev_dir.clone().ok_or(ShellError::NoPreviousDir)?
    } else {
        PathBuf::from(target)
    };
    let before = env::current_dir().ok();
    env::set_current_dir(&dest).map_err(|source| ShellError::Chdir { path: dest.clone(), source })?;
    debug!(from = ?before, to = %dest.display(), "cd");
    if before.is_some() { state.prev_dir = before; }
    Ok(())
}

fn pwd(out: &mut dyn Write) -> Result<()> {
    let cwd = env::current_dir().map_err(ShellError::Getcwd)?;
    writeln!(out, "{}", cwd.display())?;
    Ok(())
}

fn is_hit(path: &Path, mode: WhichMode) -> bool {
    match mode {
        WhichMode::Exists => path.exists(),
        WhichMode::Executable => path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false),
    }
}

/// First hit for `name` across the configured directories, made absolute.
pub fn find_in_dirs(name: &str, dirs: &[PathBuf], mode: WhichMode) -> Option<PathBuf> {
    let cand = dirs.iter().map(|d| d.join(name)).find(|p| is_hit(p, mode))?;
    if cand.is_absolute() { return Some(cand); }
    Some(env::current_dir().map(|cwd| cwd.join(&cand)).unwrap_or(cand))
}

fn which(cfg: &Config, args: &[String], out: &mut dyn Write) -> Result<()> {
    let name = args.first().ok_or(ShellError::WhichUsage)?;
    let dirs = match &cfg.which_dirs {
        Some(d) => d.clone(),
        None => env::var_os("PATH").map(|p| env::split_paths(&p).collect()).unwrap_or_default(),
    };
    let hit = find_in_dirs(name, &dirs, cfg.which_mode).ok_or_else(|| ShellError::WhichNotFound(name.clone()))?;
    writeln!(out, "{}", hit.display())?;
    Ok(())
}
