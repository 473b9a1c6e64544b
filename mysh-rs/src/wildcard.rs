use glob::{glob_with, MatchOptions};
use std::path::PathBuf;
use tracing::{debug, trace};

use crate::tokenize::Stage;

// `*` and `?` never cross a `/`, and a leading dot has to be spelled out.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

pub fn has_wildcard(tok: &str) -> bool {
    tok.contains(|c: char| c == '*' || c == '?')
}

fn render(pattern: &str, path: PathBuf) -> String {
    let s = path.to_string_lossy().into_owned();
    // glob drops a leading "./" from what it yields
    if pattern.starts_with("./") && !s.starts_with("./") { format!("./{s}") } else { s }
}

/// Expands one token relative to the current directory. Matches come back in
/// sorted order; when nothing matches (or the pattern is malformed) the token
/// is returned unchanged.
pub fn expand_token(tok: &str) -> Vec<String> {
    if !has_wildcard(tok) { return vec![tok.to_string()]; }
    let paths = match glob_with(tok, MATCH_OPTIONS) {
        Ok(p) => p,
        Err(e) => { debug!(pattern = tok, error = %e, "bad wildcard pattern, kept literal"); return vec![tok.to_string()]; }
    };
    let matches: Vec<String> = paths.filter_map(|p| p.ok()).map(|p| render(tok, p)).collect();
    trace!(pattern = tok, count = matches.len(), "wildcard expanded");
    if matches.is_empty() { vec![tok.to_string()] } else { matches }
}

/// Expands every token of a stage in place, program name included.
pub fn expand_stage(stage: &[String]) -> Stage {
    stage.iter().flat_map(|t| expand_token(t)).collect()
}
