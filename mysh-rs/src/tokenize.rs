use crate::error::{Result, ShellError};

/// One command of a pipeline: program name followed by its arguments.
pub type Stage = Vec<String>;

pub const PIPE: char = '|';

/// Splits on literal spaces only. Runs of spaces yield no empty tokens.
pub fn split_words(seg: &str) -> Stage {
    seg.split(' ').filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// Turns a raw line into its stages.
///
/// An empty or blank line gives no stages at all. A line holding the pipe
/// operator must leave at least two non-empty stages once blank segments are
/// dropped, otherwise it is rejected as a whole.
pub fn parse_line(line: &str) -> Result<Vec<Stage>> {
    if !line.contains(PIPE) {
        let words = split_words(line);
        return Ok(if words.is_empty() { Vec::new() } else { vec![words] });
    }
    let stages: Vec<Stage> = line.split(PIPE).map(split_words).filter(|s| !s.is_empty()).collect();
    if stages.len() < 2 { return Err(ShellError::InvalidPipe); }
    Ok(stages)
}
