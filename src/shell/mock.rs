//! Scripted command runner for testing.
//!
//! `ScriptedRunner` implements [`CommandRunner`] by matching each command
//! line against registered rules. Every call is recorded for later
//! assertion.
//!
//! # Example
//!
//! ```
//! use pitch::shell::{CommandResult, CommandRunner, CommandSpec, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new();
//! runner.on("git --version", CommandResult::success("git version 2.45.1"));
//!
//! let result = runner.run(&CommandSpec::shell("git --version")).unwrap();
//! assert!(result.success);
//! assert!(runner.was_called("git --version"));
//! assert!(!runner.was_called("winget"));
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{PitchError, Result};

use super::command::{CommandResult, CommandSpec};
use super::runner::CommandRunner;

type Handler = Box<dyn Fn(&CommandSpec) -> Result<CommandResult>>;

enum Response {
    /// Same response every time.
    Fixed(CommandResult),
    /// Responses consumed in order; the last one repeats.
    Sequence(RefCell<VecDeque<CommandResult>>),
    /// Computed response, free to touch the filesystem.
    Handler(Handler),
    /// Simulate a program that is not on PATH.
    NotFound,
}

struct Rule {
    pattern: String,
    response: Response,
}

/// Command runner driven by substring rules.
///
/// Rules are matched against [`CommandSpec::command_line`] in registration
/// order; the first rule whose pattern is a substring wins. Unmatched
/// commands behave as if the program does not exist.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    /// Create a runner with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, pattern: &str, response: Response) {
        self.rules.borrow_mut().push(Rule {
            pattern: pattern.to_string(),
            response,
        });
    }

    /// Respond to commands containing `pattern` with a fixed result.
    pub fn on(&self, pattern: &str, result: CommandResult) {
        self.push(pattern, Response::Fixed(result));
    }

    /// Respond with each result in turn; the last one repeats.
    pub fn on_sequence(&self, pattern: &str, results: Vec<CommandResult>) {
        self.push(pattern, Response::Sequence(RefCell::new(results.into())));
    }

    /// Respond by calling `handler`.
    pub fn on_with<F>(&self, pattern: &str, handler: F)
    where
        F: Fn(&CommandSpec) -> Result<CommandResult> + 'static,
    {
        self.push(pattern, Response::Handler(Box::new(handler)));
    }

    /// Make commands containing `pattern` fail to spawn.
    pub fn not_found(&self, pattern: &str) {
        self.push(pattern, Response::NotFound);
    }

    /// All command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any command containing `pattern` was run.
    pub fn was_called(&self, pattern: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.contains(pattern))
    }

    /// Number of commands containing `pattern` that were run.
    pub fn call_count(&self, pattern: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.contains(pattern))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let line = spec.command_line();
        self.calls.borrow_mut().push(line.clone());

        let rules = self.rules.borrow();
        let Some(rule) = rules.iter().find(|r| line.contains(&r.pattern)) else {
            return Err(PitchError::CommandFailed {
                command: line,
                code: None,
            });
        };

        match &rule.response {
            Response::Fixed(result) => Ok(result.clone()),
            Response::Sequence(queue) => {
                let mut queue = queue.borrow_mut();
                let result = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                Ok(result.unwrap_or_default())
            }
            Response::Handler(handler) => handler(spec),
            Response::NotFound => Err(PitchError::CommandFailed {
                command: line,
                code: None,
            }),
        }
    }
}
