//! CLI command execution helpers
//!
//! Wraps the `dirwatch` binary with a timeout so a watch that never sees a
//! change fails the test instead of hanging it.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

/// CLI command builder
pub struct DirwatchCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    timeout: Duration,
}

impl DirwatchCommand {
    /// Create a new command in the given working directory.
    ///
    /// The user config directory is redirected into `working_dir` so tests
    /// never read or write the real one.
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let mut env = HashMap::new();
        env.insert(
            "XDG_CONFIG_HOME".to_string(),
            working_dir.join(".config").display().to_string(),
        );
        env.insert("HOME".to_string(), working_dir.display().to_string());

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_dirwatch")),
            working_dir,
            args: Vec::new(),
            env,
            timeout: Duration::from_secs(30),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set command timeout
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Run to completion, killing the process if it outlives the timeout.
    ///
    /// Output is read on separate threads while the child runs, so a chatty
    /// process never stalls on a full pipe.
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn dirwatch")?;

        let stdout = read_in_background(child.stdout.take().context("stdout not piped")?);
        let stderr = read_in_background(child.stderr.take().context("stderr not piped")?);

        let mut timed_out = false;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() > self.timeout {
                child.kill().context("Failed to kill timed out command")?;
                timed_out = true;
                break child.wait().context("Failed to wait for command")?;
            }
            sleep(Duration::from_millis(20));
        };

        let stdout = stdout
            .join()
            .map_err(|_| anyhow::anyhow!("stdout reader panicked"))??;
        let stderr = stderr
            .join()
            .map_err(|_| anyhow::anyhow!("stderr reader panicked"))??;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_code: status.code().unwrap_or(-1),
            timed_out,
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}, timed out: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                result.timed_out,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() || result.timed_out {
            anyhow::bail!(
                "Command should have failed on its own:\nArgs: {:?}\nStdout: {}\nStderr: {}",
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }
}

fn read_in_background(mut pipe: impl Read + Send + 'static) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Build a command with the given arguments
///
/// ```ignore
/// dirwatch!(dir, "config", "--example").assert_success()?;
/// ```
#[macro_export]
macro_rules! dirwatch {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::DirwatchCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
