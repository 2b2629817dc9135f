//! The seam between pipeline stages and the machine.
//!
//! Every stage takes a `&dyn CommandRunner` instead of spawning processes
//! itself, so stages stay functions of their inputs and can be driven by
//! [`ScriptedRunner`](super::ScriptedRunner) in tests.

use crate::error::Result;

use super::command::{execute, CommandResult, CommandSpec, OutputCallback, OutputLine};

/// Runs commands on behalf of a pipeline stage.
pub trait CommandRunner {
    /// Run a command to completion (or until its timeout).
    ///
    /// `Err` means the program could not be started at all.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs commands as real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    echo_output: bool,
}

impl SystemRunner {
    /// Create a runner that captures output silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo every output line to stderr as it arrives (verbose mode).
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        if !self.echo_output {
            return execute(spec, None);
        }
        let echo: OutputCallback<'_> = &|line: &OutputLine| match line {
            OutputLine::Stdout(l) | OutputLine::Stderr(l) => eprintln!("    │ {}", l),
        };
        execute(spec, Some(echo))
    }
}
