use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "mysh> ";

/// What `which` accepts as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhichMode {
    /// Any existing entry of that name.
    #[default]
    Exists,
    /// A regular file with at least one execute bit.
    Executable,
}

impl std::str::FromStr for WhichMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exists" => Ok(WhichMode::Exists),
            "executable" | "exec" => Ok(WhichMode::Executable),
            other => Err(anyhow!("invalid which mode '{other}' (expected exists|executable)")),
        }
    }
}

/// When the pipeline orchestrator collects its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Spawn all stages, then wait for each in spawn order.
    #[default]
    Deferred,
    /// Wait for each stage right after spawning it. A stage that fills its
    /// pipe buffer before the reader exists will block forever.
    Eager,
}

impl std::str::FromStr for WaitMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deferred" => Ok(WaitMode::Deferred),
            "eager" => Ok(WaitMode::Eager),
            other => Err(anyhow!("invalid pipeline wait mode '{other}' (expected deferred|eager)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub which_mode: WhichMode,
    /// Replaces `PATH` for `which` when set.
    pub which_dirs: Option<Vec<PathBuf>>,
    pub wait_mode: WaitMode,
}

impl Default for Config {
    fn default() -> Self {
        Config { prompt: DEFAULT_PROMPT.to_string(), which_mode: WhichMode::default(), which_dirs: None, wait_mode: WaitMode::default() }
    }
}

pub fn parse_dirs(v: &str) -> Vec<PathBuf> {
    env::split_paths(v).filter(|p| !p.as_os_str().is_empty()).collect()
}

impl Config {
    /// Defaults overlaid with `MYSH_*` variables from the given lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        let mut cfg = Config::default();
        if let Some(p) = get("MYSH_PROMPT") { cfg.prompt = p; }
        if let Some(m) = get("MYSH_WHICH_MODE") { cfg.which_mode = m.parse()?; }
        if let Some(d) = get("MYSH_WHICH_DIRS") { cfg.which_dirs = Some(parse_dirs(&d)); }
        if let Some(w) = get("MYSH_PIPE_WAIT") { cfg.wait_mode = w.parse()?; }
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }
}
