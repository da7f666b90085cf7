use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = 10;

/// Command-line arguments for launching tasks on a cluster.
#[derive(Debug, Parser)]
#[command(
    name = "runtask",
    about = "Launch tasks on a cluster and optionally wait for them to stop"
)]
pub struct Args {
    /// Family and/or revision of the task definition to run
    #[arg(long = "taskdef", value_name = "TASKDEF")]
    pub task_definition: String,

    /// Cluster on which to run your task
    #[arg(long, default_value = "default")]
    pub cluster: String,

    /// The number of instantiations of each task to place on your cluster
    #[arg(long, default_value_t = 1)]
    pub count: i64,

    /// Wait for all spawned tasks to finish
    #[arg(long)]
    pub join: bool,

    /// One or more override files in JSON format
    #[arg(value_name = "OVERRIDE")]
    pub overrides: Vec<PathBuf>,
}

impl Args {
    /// Range check applied after parsing, before any file or network work.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COUNT..=MAX_COUNT).contains(&self.count) {
            bail!("count can only take values between 1 and 10");
        }
        Ok(())
    }
}
