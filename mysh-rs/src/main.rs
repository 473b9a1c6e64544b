use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use mysh_rs::config::{self, Config};
use mysh_rs::{logging, Flow, Shell};

const WELCOME: &str = "Welcome to my Shell.";
const GOODBYE: &str = "Exiting my shell.";
const USAGE: &str = "usage: mysh-rs [--prompt s] [--which-mode exists|executable] [--which-dirs a:b] [--wait-eager] [-c line | script-or-dir]";

#[derive(Debug)]
enum Mode { Interactive, OneShot(String), Path(PathBuf) }

fn set_mode(mode: &mut Option<Mode>, next: Mode) -> Result<()> {
    if mode.is_some() { bail!("only one of -c <line> or a script path may be given"); }
    *mode = Some(next);
    Ok(())
}

fn parse_args(cfg: &mut Config) -> Result<Option<Mode>> {
    let mut args = env::args().skip(1);
    let mut mode: Option<Mode> = None;
    while let Some(a) = args.next() {
        match a.as_str() {
            "-c" => { let line = args.next().ok_or_else(|| anyhow!("missing line after -c"))?; set_mode(&mut mode, Mode::OneShot(line))?; }
            "--prompt" => { cfg.prompt = args.next().ok_or_else(|| anyhow!("missing value after --prompt"))?; }
            "--which-mode" => { cfg.which_mode = args.next().ok_or_else(|| anyhow!("missing value after --which-mode"))?.parse()?; }
            "--which-dirs" => { let v = args.next().ok_or_else(|| anyhow!("missing value after --which-dirs"))?; cfg.which_dirs = Some(config::parse_dirs(&v)); }
            "--wait-eager" => { cfg.wait_mode = config::WaitMode::Eager; }
            "-h" | "--help" => { println!("{USAGE}"); return Ok(None); }
            other if other.starts_with('-') && other.len() > 1 => bail!("unknown arg: {other}"),
            path => set_mode(&mut mode, Mode::Path(PathBuf::from(path)))?,
        }
    }
    Ok(Some(mode.unwrap_or(Mode::Interactive)))
}

fn trim_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Feeds lines to the engine; `Some(code)` once a line asked to exit.
fn run_lines<I, S>(shell: &mut Shell, lines: I) -> Result<Option<i32>>
where I: IntoIterator<Item = S>, S: AsRef<str> {
    for line in lines {
        if let Flow::Exit(code) = shell.execute(trim_eol(line.as_ref()))? { return Ok(Some(code)); }
    }
    Ok(None)
}

fn read_script(path: &Path) -> Result<Vec<String>> {
    let data = fs::read(path).with_context(|| format!("Error opening file {}", path.display()))?;
    Ok(data.split(|&b| b == b'\n').map(|l| String::from_utf8_lossy(l).into_owned()).collect())
}

/// Regular files first, in name order, then each subdirectory the same way.
/// `dir` must be absolute: scripts may `cd` between files.
fn run_dir(shell: &mut Shell, dir: &Path) -> Result<Option<i32>> {
    let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(e) => { eprintln!("mysh: Error opening directory {}: {e}", dir.display()); return Ok(None); }
    };
    entries.sort_by_key(|e| e.file_name());
    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) { subdirs.push(path); continue; }
        match fs::metadata(&path) {
            Ok(m) if m.is_file() => {}
            Ok(_) => continue,
            Err(e) => { eprintln!("mysh: Error opening file {}: {e}", path.display()); continue; }
        }
        debug!(file = %path.display(), "batch file");
        let lines = match read_script(&path) {
            Ok(l) => l,
            Err(e) => { eprintln!("mysh: {e:#}"); continue; }
        };
        if let Some(code) = run_lines(shell, lines)? { return Ok(Some(code)); }
    }
    for sub in subdirs {
        if let Some(code) = run_dir(shell, &sub)? { return Ok(Some(code)); }
    }
    Ok(None)
}

fn interactive(shell: &mut Shell) -> Result<i32> {
    let mut stdout = io::stdout();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    writeln!(stdout, "{WELCOME}")?;
    let mut buf: Vec<u8> = Vec::new();
    let code = loop {
        write!(stdout, "{}", shell.config.prompt)?;
        stdout.flush()?;
        buf.clear();
        if input.read_until(b'\n', &mut buf).context("Error reading input")? == 0 { break 0; }
        let line = String::from_utf8_lossy(&buf);
        if let Flow::Exit(code) = shell.execute(trim_eol(&line))? { break code; }
    };
    writeln!(stdout, "{GOODBYE}")?;
    Ok(code)
}

fn run() -> Result<i32> {
    let mut cfg = Config::from_env()?;
    let Some(mode) = parse_args(&mut cfg)? else { return Ok(0) };
    debug!(?cfg, ?mode, "starting");
    let mut shell = Shell::new(cfg);
    match mode {
        Mode::Interactive => interactive(&mut shell),
        Mode::OneShot(line) => Ok(run_lines(&mut shell, [line])?.unwrap_or(0)),
        Mode::Path(path) if path.is_dir() => {
            let dir = fs::canonicalize(&path).with_context(|| format!("Error opening directory {}", path.display()))?;
            Ok(run_dir(&mut shell, &dir)?.unwrap_or(0))
        }
        Mode::Path(path) => {
            let lines = read_script(&path)?;
            Ok(run_lines(&mut shell, lines)?.unwrap_or(0))
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(e) => { eprintln!("mysh: {e:#}"); 1 }
    };
    std::process::exit(code);
}
