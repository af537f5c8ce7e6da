use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use super::{MetadataSource, SourceError, TreeSource};
use crate::models::{PackageInfo, TreeNode};

/// Runs the `yarn` (v1) CLI inside a project directory.
///
/// Non-zero exit codes are tolerated: yarn reports partial trees and
/// per-package errors on stdout while still exiting with failure.
#[derive(Debug, Clone)]
pub struct YarnCli {
    dir: PathBuf,
    production_only: bool,
    lookup_timeout: Duration,
}

/// One line of yarn's `--json` event stream.
#[derive(Debug, Deserialize)]
struct Message {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ListData {
    trees: Vec<TreeNode>,
}

impl YarnCli {
    pub fn new(dir: &Path, lookup_timeout: Duration) -> Self {
        Self {
            dir: dir.to_path_buf(),
            production_only: true,
            lookup_timeout,
        }
    }

    /// Pass `--production` to `yarn list`, excluding devDependencies.
    pub fn production_only(mut self, production_only: bool) -> Self {
        self.production_only = production_only;
        self
    }

    fn list_args(&self) -> Vec<&'static str> {
        let mut args = vec!["list", "--json", "-s", "--no-progress"];
        if self.production_only {
            args.push("--production");
        }
        args
    }

    async fn run(&self, args: &[&str], timeout: Option<Duration>) -> Result<String, SourceError> {
        self.run_program("yarn", args, timeout).await
    }

    /// Run `program` in the project directory and return its stdout, even
    /// when it exits with failure.
    async fn run_program(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<String, SourceError> {
        let command = format!("{} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = cmd.output();

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| SourceError::Timeout {
                    command: command.clone(),
                    secs: limit.as_secs(),
                })?,
            None => output.await,
        };

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::ToolUnavailable(program.to_string()));
            }
            Err(source) => return Err(SourceError::Spawn { command, source }),
        };

        if !output.status.success() {
            debug!(
                command = %command,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "command exited with failure; using its output anyway"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TreeSource for YarnCli {
    async fn trees(&self) -> Result<Vec<TreeNode>, SourceError> {
        let stdout = self.run(&self.list_args(), None).await?;
        parse_list_output(&stdout)
    }
}

#[async_trait]
impl MetadataSource for YarnCli {
    async fn package_info(&self, id: &str) -> Result<Option<PackageInfo>, SourceError> {
        let stdout = self
            .run(&["info", "-s", "--json", id], Some(self.lookup_timeout))
            .await?;
        parse_info_output(&stdout)
    }
}

/// Extract `data.trees` from `yarn list --json` output.
fn parse_list_output(stdout: &str) -> Result<Vec<TreeNode>, SourceError> {
    let mut invalid = None;

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let message: Message = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                invalid = Some(e);
                continue;
            }
        };

        if message.kind == "tree" || message.data.get("trees").is_some() {
            let data: ListData =
                serde_json::from_value(message.data).map_err(|source| SourceError::Json {
                    command: "yarn list".to_string(),
                    source,
                })?;
            return Ok(data.trees);
        }
    }

    match invalid {
        Some(source) => Err(SourceError::Json {
            command: "yarn list".to_string(),
            source,
        }),
        None => Err(SourceError::MissingTrees),
    }
}

/// Extract the `inspect` payload from `yarn info --json` output.
///
/// Empty output, or output with only warnings/errors, means no data.
fn parse_info_output(stdout: &str) -> Result<Option<PackageInfo>, SourceError> {
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Ok(message) = serde_json::from_str::<Message>(line) else {
            continue;
        };

        match message.kind.as_str() {
            "inspect" => {
                let info: PackageInfo =
                    serde_json::from_value(message.data).map_err(|source| SourceError::Json {
                        command: "yarn info".to_string(),
                        source,
                    })?;
                return Ok(Some(info));
            }
            "error" => {
                debug!(message = %message.data, "yarn info reported an error");
            }
            _ => {}
        }
    }

    Ok(None)
}
