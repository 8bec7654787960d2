//! External command-line tools
//!
//! Every invocation is bounded by a timeout. A child that outlives it is
//! killed and reported as [`ToolError::TimedOut`]. Failed calls are not
//! retried.

use std::ffi::{OsStr, OsString};
use std::process::Stdio;
use std::time::Duration;

use crate::error::ToolError;

/// Default bound for one tool invocation
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Program, arguments and extra environment for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Command line for logs. Environment values are left out.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// `None` when the process was ended by a signal
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Synchronous capability to run an external tool with a timeout
pub trait ExternalTool {
    fn invoke(&self, command: &ToolCommand, timeout: Duration) -> Result<ToolOutput, ToolError>;
}

/// Runs real processes on a private current-thread runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTool;

impl ExternalTool for ProcessTool {
    fn invoke(&self, command: &ToolCommand, timeout: Duration) -> Result<ToolOutput, ToolError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ToolError::Runtime(e.to_string()))?;
        runtime.block_on(run(command, timeout))
    }
}

async fn run(command: &ToolCommand, timeout: Duration) -> Result<ToolOutput, ToolError> {
    let program = command.program_name();
    tracing::info!(command = %command.display(), timeout_secs = timeout.as_secs_f64(), "Running external tool");

    let child = tokio::process::Command::new(&command.program)
        .args(&command.args)
        .envs(command.envs.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;

    // Dropping the wait future on timeout drops the child, which kills it
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ToolError::Io {
                program,
                message: e.to_string(),
            })
        }
        Err(_elapsed) => {
            tracing::error!(program = %program, timeout_secs = timeout.as_secs_f64(), "External tool timed out");
            return Err(ToolError::TimedOut { program, timeout });
        }
    };

    let result = ToolOutput {
        success: output.status.success(),
        status_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!(
        program = %program,
        success = result.success,
        status = ?result.status_code,
        "External tool finished"
    );
    Ok(result)
}
