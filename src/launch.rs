//! Request builder: expands the CLI configuration plus zero or more
//! override files into the ordered list of launch requests. Every file is
//! read and parsed up front, so a bad override anywhere aborts the run
//! before any task is launched.

use crate::rpc::wire::TaskOverride;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One `RunTask` submission. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub cluster: String,
    pub count: i64,
    pub task_definition: String,
    pub overrides: Option<TaskOverride>,
}

/// Produces the ordered, non-empty request list. With no override paths the
/// result is a single request carrying no override payload; otherwise one
/// request per file, in the order given.
pub fn build_requests(
    cluster: &str,
    count: i64,
    task_definition: &str,
    override_paths: &[PathBuf],
) -> Result<Vec<LaunchRequest>> {
    if override_paths.is_empty() {
        return Ok(vec![LaunchRequest {
            cluster: cluster.to_owned(),
            count,
            task_definition: task_definition.to_owned(),
            overrides: None,
        }]);
    }

    let mut requests = Vec::with_capacity(override_paths.len());
    for path in override_paths {
        let overrides = load_override(path)?;
        requests.push(LaunchRequest {
            cluster: cluster.to_owned(),
            count,
            task_definition: task_definition.to_owned(),
            overrides: Some(overrides),
        });
    }
    Ok(requests)
}

fn load_override(path: &Path) -> Result<TaskOverride> {
    let contents =
        fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("could not parse json from {}", path.display()))
}
