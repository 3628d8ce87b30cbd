//! Worker processes: the gateway's `process-list.json` snapshot, or a `ps`
//! scan when there is none.

use std::path::PathBuf;

use serde::Deserialize;
use tokio::process::Command;

use clawdeck_types::{Process, truncate_with_ellipsis};

use crate::GatewayError;

const RELEVANT: [&str; 3] = ["claude", "openclaw", "oclaw-tui"];
const BROWSERS: [&str; 4] = ["chrome", "chromium", "firefox", "electron"];
const COMMAND_MAX: usize = 60;

#[derive(Debug, Deserialize)]
struct ProcessListFile {
    #[serde(default)]
    processes: Vec<Process>,
}

pub(crate) async fn fetch_processes(list_path: PathBuf) -> Result<Vec<Process>, GatewayError> {
    if let Ok(text) = tokio::fs::read_to_string(&list_path).await {
        if let Some(processes) = parse_process_list(&text) {
            return Ok(processes);
        }
        tracing::debug!(path = %list_path.display(), "process list empty or unreadable, scanning ps");
    }

    match Command::new("ps")
        .args(["axo", "pid,etime,command"])
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            Ok(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
        }
        Ok(output) => {
            tracing::debug!(status = %output.status, "ps exited unsuccessfully");
            Ok(Vec::new())
        }
        Err(err) => {
            tracing::debug!("ps unavailable: {err}");
            Ok(Vec::new())
        }
    }
}

/// `{"processes": [...]}`. `None` when malformed or empty so the caller
/// falls back to scanning.
#[must_use]
pub fn parse_process_list(text: &str) -> Option<Vec<Process>> {
    let file: ProcessListFile = serde_json::from_str(text).ok()?;
    (!file.processes.is_empty()).then_some(file.processes)
}

/// Agent-related lines of `ps axo pid,etime,command` output.
#[must_use]
pub fn parse_ps_output(output: &str) -> Vec<Process> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            RELEVANT.iter().any(|k| lower.contains(k))
                && !BROWSERS.iter().any(|b| lower.contains(b))
                && !line.starts_with("PID")
                && !line.contains("ps axo")
        })
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let pid = fields.next()?;
            let etime = fields.next()?;
            let command = fields.collect::<Vec<_>>().join(" ");
            if command.is_empty() {
                return None;
            }
            Some(Process {
                name: format!("pid:{pid}"),
                status: "running".to_string(),
                runtime: etime.to_string(),
                command: truncate_with_ellipsis(&command, COMMAND_MAX),
            })
        })
        .collect()
}

/// Terminate a process found by the `ps` scan.
pub(crate) async fn kill_pid(pid: &str) -> Result<(), GatewayError> {
    if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::Action {
            action: "kill",
            detail: format!("invalid pid {pid:?}"),
        });
    }
    let output = Command::new("kill")
        .args(["-TERM", pid])
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| GatewayError::Action {
            action: "kill",
            detail: err.to_string(),
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(GatewayError::Action {
            action: "kill",
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
