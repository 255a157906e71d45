//! I/O boundary traits for testability
//!
//! These traits abstract the two kinds of external calls the proxy makes
//! (adb subprocesses and the interactive picker), allowing the routing logic
//! to be tested with mock implementations.

use std::ffi::OsString;
use std::io;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, capturing its output.
    fn run(&self, cmd: &str, args: &[OsString]) -> io::Result<Output>;

    /// Run a command feeding `stdin` and capturing its output.
    fn run_with_stdin(&self, cmd: &str, args: &[OsString], stdin: &str) -> io::Result<Output>;

    /// Run a command with all three standard streams inherited and return
    /// the child's exit code. Death by signal maps to SOFTWARE (70).
    fn run_interactive(&self, cmd: &str, args: &[OsString]) -> io::Result<i32>;
}

/// Item for fuzzy selection: what the user sees, and the serial behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in the picker
    pub display: String,
    /// Actual value (device serial)
    pub value: String,
}

/// Interactive fuzzy-selector abstraction.
pub trait Selector: Send + Sync {
    /// Present lines to the user and return the one picked.
    /// Returns None if the user cancels (Esc/Ctrl-C).
    fn select_one(&self, lines: &[String]) -> io::Result<Option<String>>;
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[OsString]) -> io::Result<Output> {
        Command::new(cmd).args(args).output()
    }

    fn run_with_stdin(&self, cmd: &str, args: &[OsString], stdin: &str) -> io::Result<Output> {
        use std::io::Write;

        // stderr stays inherited: pickers drawing their UI there (fzf) or
        // printing their own errors must reach the terminal.
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut child_stdin) = child.stdin.take() {
            child_stdin.write_all(stdin.as_bytes())?;
        }

        child.wait_with_output()
    }

    fn run_interactive(&self, cmd: &str, args: &[OsString]) -> io::Result<i32> {
        let status = Command::new(cmd).args(args).status()?;
        Ok(status.code().unwrap_or(crate::exitcode::SOFTWARE))
    }
}

/// Selector backed by an external fuzzy-picker subprocess (peco-style):
/// fed one line per item on stdin, the picked line read back from stdout.
pub struct PickerSelector {
    picker: String,
    runner: Arc<dyn CommandRunner>,
}

impl PickerSelector {
    pub fn new(picker: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            picker: picker.into(),
            runner,
        }
    }
}

impl Selector for PickerSelector {
    fn select_one(&self, lines: &[String]) -> io::Result<Option<String>> {
        if lines.is_empty() {
            return Ok(None);
        }

        let mut input = lines.join("\n");
        input.push('\n');

        let output = self.runner.run_with_stdin(&self.picker, &[], &input)?;
        // Pickers exit non-zero on Esc/Ctrl-C.
        if !output.status.success() {
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .next()
            .map(str::to_string)
            .filter(|line| !line.is_empty()))
    }
}
