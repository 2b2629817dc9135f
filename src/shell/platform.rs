//! Platform detection.

/// Operating system family, used to pick built-in requirements and
/// environment layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Directory inside a virtualenv that holds the interpreter and scripts.
    pub fn scripts_dir(self) -> &'static str {
        match self {
            Platform::Windows => "Scripts",
            Platform::MacOS | Platform::Linux => "bin",
        }
    }

    /// Interpreter file name inside the scripts directory.
    pub fn python_executable(self) -> &'static str {
        match self {
            Platform::Windows => "python.exe",
            Platform::MacOS | Platform::Linux => "python",
        }
    }

    /// Default base interpreter command.
    pub fn default_python(self) -> &'static str {
        match self {
            Platform::Windows => "python",
            Platform::MacOS | Platform::Linux => "python3",
        }
    }

    /// PATH list separator.
    pub fn path_separator(self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::MacOS | Platform::Linux => ':',
        }
    }
}

/// The shell used to run free-form command lines, and its "run this" flag.
///
/// Unlike an interactive login shell this does not source user profiles:
/// everything a command needs is passed explicitly through its spec.
pub fn shell_invocation() -> (String, &'static str) {
    if cfg!(target_os = "windows") {
        (
            std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()),
            "/C",
        )
    } else {
        ("/bin/sh".to_string(), "-c")
    }
}

/// Check if running in a CI environment.
///
/// Used to auto-detect CI and force the non-interactive UI in `main()`.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`, `TF_BUILD`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL", "TF_BUILD"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}
