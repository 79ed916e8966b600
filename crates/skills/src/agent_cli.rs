//! Subprocess access to the globally installed skills package.

use std::process::Stdio;
use std::time::Duration;

use armory_core::RegistryConfig;
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::error::{Result, SkillRegistryError};

/// Source of raw, unvalidated global skill entries.
#[async_trait]
pub trait SkillCli: Send + Sync {
    /// List every globally installed skill, in the order the package reports them.
    async fn list(&self) -> Result<Vec<Value>>;
}

/// Runs `npx @djm204/agent-skills --list` (or a configured equivalent) and
/// parses its stdout as a JSON array.
#[derive(Debug, Clone)]
pub struct AgentSkillsCli {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl AgentSkillsCli {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self { program: program.into(), args, timeout }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.cli_program.clone(), config.cli_args.clone(), config.cli_timeout())
    }

    /// The command line, for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl SkillCli for AgentSkillsCli {
    async fn list(&self) -> Result<Vec<Value>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(SkillRegistryError::CliTimeout {
                    command: self.command_line(),
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
            Ok(Err(e)) => {
                return Err(SkillRegistryError::CliFailure(format!("{} failed: {}", self.command_line(), e)));
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit = output
                .status
                .code()
                .map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"));
            return Err(SkillRegistryError::CliFailure(format!(
                "{} failed ({}): {}",
                self.command_line(),
                exit,
                stderr.trim()
            )));
        }

        parse_cli_output(&String::from_utf8_lossy(&output.stdout), &self.command_line())
    }
}

/// Parse the package's stdout: it must be a JSON array of entries.
pub fn parse_cli_output(stdout: &str, command: &str) -> Result<Vec<Value>> {
    let parsed: Value = serde_json::from_str(stdout)
        .map_err(|e| SkillRegistryError::Parse(format!("Failed to parse {command} output: {e}")))?;

    match parsed {
        Value::Array(entries) => Ok(entries),
        other => Err(SkillRegistryError::Parse(format!(
            "Failed to parse {command} output: expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
