use std::io;
use tracing::debug;

use crate::builtin::{self, Flow, ShellState};
use crate::config::Config;
use crate::error::{Result, ShellError};
use crate::pipeline;
use crate::process::{self, Outcome};
use crate::redirect::{self, Scanned};
use crate::tokenize;

pub const ERROR_PREFIX: &str = "mysh";

pub fn report_error(e: &ShellError) {
    eprintln!("{ERROR_PREFIX}: {e}");
}

pub fn report_outcome(program: &str, outcome: Outcome) {
    if let Some(msg) = outcome.describe(program) { eprintln!("{ERROR_PREFIX}: {msg}"); }
}

/// The command-execution engine: one instance per shell process.
#[derive(Debug, Default)]
pub struct Shell {
    pub state: ShellState,
    pub config: Config,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        Shell { state: ShellState::default(), config }
    }

    /// Runs one line. Failures of the command itself are reported on stderr
    /// and swallowed; only errors that should end the shell come back.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        match self.try_execute(line) {
            Ok(flow) => Ok(flow),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => { report_error(&e); Ok(Flow::Continue) }
        }
    }

    fn try_execute(&mut self, line: &str) -> Result<Flow> {
        let mut stages = tokenize::parse_line(line)?;
        debug!(?stages, "parsed");
        match stages.len() {
            0 => Ok(Flow::Continue),
            1 => self.run_one(stages.remove(0)),
            _ => {
                let scanned = stages.into_iter().map(redirect::scan).collect::<Result<Vec<_>>>()?;
                // reject before any target is created or truncated
                if scanned.iter().any(|s| s.argv.is_empty()) { return Err(ShellError::InvalidPipe); }
                let resolved = scanned.into_iter().map(Scanned::open).collect::<Result<Vec<_>>>()?;
                for (program, outcome) in pipeline::run(resolved, self.config.wait_mode)? {
                    report_outcome(&program, outcome);
                }
                Ok(Flow::Continue)
            }
        }
    }

    fn run_one(&mut self, stage: Vec<String>) -> Result<Flow> {
        if let Some(kind) = builtin::lookup(&stage[0]) {
            return builtin::run(kind, &mut self.state, &self.config, &stage[1..], &mut io::stdout().lock());
        }
        let resolved = redirect::scan(stage)?.open()?;
        // only redirections: the files were opened (and truncated), nothing to run
        if resolved.argv.is_empty() { return Ok(Flow::Continue); }
        let program = resolved.argv[0].clone();
        let outcome = process::run_single(resolved)?;
        report_outcome(&program, outcome);
        Ok(Flow::Continue)
    }
}
