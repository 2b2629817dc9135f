//! Subprocess execution with bounded timeouts.

use crate::error::{PitchError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::platform::shell_invocation;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep reading output after the child has exited.
const EXIT_GRACE: Duration = Duration::from_millis(250);

/// Result of executing a command.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            success: true,
            ..Default::default()
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
            success: false,
            ..Default::default()
        }
    }

    /// Create a timed-out result.
    pub fn timeout() -> Self {
        Self {
            timed_out: true,
            ..Default::default()
        }
    }

    /// Stdout followed by stderr, for parsers that don't care which stream
    /// a tool prints its version on.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }

    /// Last non-empty line of output, useful as a short failure reason.
    pub fn last_line(&self) -> Option<&str> {
        fn tail(s: &str) -> Option<&str> {
            s.lines().map(str::trim).filter(|l| !l.is_empty()).last()
        }
        tail(&self.stderr).or_else(|| tail(&self.stdout))
    }
}

/// A command to run: program, arguments and execution options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the inherited environment).
    pub env: BTreeMap<String, String>,

    /// Timeout (None = wait indefinitely).
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a spec for running `program` directly.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Create a spec that runs a command line through the platform shell.
    pub fn shell(line: &str) -> Self {
        let (shell, flag) = shell_invocation();
        Self::new(shell).arg(flag).arg(line)
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add environment variables.
    pub fn envs(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The command line as a user would type it.
    ///
    /// For shell specs this is the line handed to the shell.
    pub fn command_line(&self) -> String {
        let (shell, flag) = shell_invocation();
        if self.program == shell && self.args.len() == 2 && self.args[0] == flag {
            return self.args[1].clone();
        }
        let mut parts = vec![quote(&self.program)];
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.contains(char::is_whitespace) {
        format!("\"{}\"", part)
    } else {
        part.to_string()
    }
}

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback<'a> = &'a dyn Fn(&OutputLine);

/// Execute a command, waiting at most `spec.timeout`.
///
/// Returns `Err(CommandFailed)` only when the program could not be spawned
/// (e.g. not on PATH). A non-zero exit or a timeout is an `Ok` result with
/// `success == false`.
pub fn execute(spec: &CommandSpec, on_output: Option<OutputCallback<'_>>) -> Result<CommandResult> {
    let start = Instant::now();
    tracing::debug!("Running: {}", spec);

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to spawn '{}': {}", spec.program, e);
        PitchError::CommandFailed {
            command: spec.to_string(),
            code: None,
        }
    })?;

    let (tx, rx) = mpsc::channel();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(stdout, tx.clone(), OutputLine::Stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(stderr, tx.clone(), OutputLine::Stderr));
    }
    drop(tx);

    let deadline = spec.timeout.map(|t| start + t);
    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut record = |line: OutputLine| {
        if let Some(callback) = on_output {
            callback(&line);
        }
        match line {
            OutputLine::Stdout(l) => {
                stdout.push_str(&l);
                stdout.push('\n');
            }
            OutputLine::Stderr(l) => {
                stderr.push_str(&l);
                stderr.push('\n');
            }
        }
    };

    // The deadline and the child's exit are checked on every pass, so a
    // chatty child cannot starve the timeout and a background grandchild
    // holding the pipes cannot turn a finished command into a timeout.
    let mut exited: Option<ExitStatus> = None;
    let mut drain_until: Option<Instant> = None;
    let mut pipes_closed = false;
    loop {
        let now = Instant::now();
        if exited.is_none() {
            if let Some(status) = child.try_wait()? {
                exited = Some(status);
                drain_until = Some(now + EXIT_GRACE);
            } else if deadline.is_some_and(|d| now >= d) {
                break;
            }
        }
        if drain_until.is_some_and(|d| now >= d) {
            tracing::debug!("Output still open after exit, not waiting: {}", spec);
            break;
        }

        match rx.recv_timeout(next_wait(now, deadline, drain_until)) {
            Ok(line) => record(line),
            Err(RecvTimeoutError::Disconnected) => {
                pipes_closed = true;
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    let status = match exited {
        Some(status) => Some(status),
        None if pipes_closed => wait_until(&mut child, deadline)?,
        None => None,
    };

    let Some(status) = status else {
        tracing::debug!("Timed out after {:?}: {}", spec.timeout, spec);
        let _ = child.kill();
        let _ = child.wait();
        // Readers may be blocked on pipes held by grandchildren; don't join.
        for line in rx.try_iter() {
            record(line);
        }
        return Ok(CommandResult {
            exit_code: None,
            stdout,
            stderr,
            duration: start.elapsed(),
            success: false,
            timed_out: true,
        });
    };

    for line in rx.try_iter() {
        record(line);
    }
    if pipes_closed {
        for reader in readers {
            let _ = reader.join();
        }
    }

    Ok(CommandResult {
        exit_code: status.code(),
        stdout,
        stderr,
        duration: start.elapsed(),
        success: status.success(),
        timed_out: false,
    })
}

fn spawn_reader<R>(
    stream: R,
    tx: Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(std::result::Result::ok) {
            if tx.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

/// How long to block on the output channel before checking again.
fn next_wait(now: Instant, deadline: Option<Instant>, drain_until: Option<Instant>) -> Duration {
    [deadline, drain_until]
        .into_iter()
        .flatten()
        .map(|d| d.saturating_duration_since(now))
        .fold(POLL_INTERVAL, Duration::min)
}

/// Wait for the child, returning `None` if the deadline passes first.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
