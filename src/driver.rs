//! Sequential launch-and-wait orchestration.
//!
//! The driver submits launch requests one at a time, prints a status line per
//! task the service placed, and (when asked to wait) polls the service until
//! every printed task reaches `STOPPED`. A failed launch only costs that one
//! request; a failed status poll aborts the wait.

use crate::display::{status_line, StatusRenderer};
use crate::launch::LaunchRequest;
use crate::rpc::client::TaskApi;
use crate::rpc::wire::Task;
use crate::runtime::telemetry::Telemetry;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

/// Ordered record of every task printed so far plus its latest snapshot.
///
/// Print order is fixed by the launch phase and never changes afterwards;
/// describe rounds only replace snapshots. The redraw therefore always covers
/// the same lines in the same order, which is what makes the cursor-up
/// rewrite safe.
#[derive(Debug, Default)]
pub struct TaskBoard {
    order: Vec<String>,
    tasks: HashMap<String, Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly launched task at the end of the block.
    pub fn admit(&mut self, task: Task) {
        self.order.push(task.task_arn.clone());
        self.tasks.insert(task.task_arn.clone(), task);
    }

    /// Replaces the stored snapshot of an already-admitted task. Snapshots
    /// for unknown ARNs are kept but never printed.
    pub fn update(&mut self, task: Task) {
        self.tasks.insert(task.task_arn.clone(), task);
    }

    /// ARNs of tasks that have not reached `STOPPED` yet, in print order.
    pub fn tracked(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|arn| {
                self.tasks
                    .get(arn.as_str())
                    .map(|task| !task.is_stopped())
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// One formatted status line per admitted task, in print order.
    pub fn lines(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|arn| self.tasks.get(arn))
            .map(status_line)
            .collect()
    }

    pub fn get(&self, arn: &str) -> Option<&Task> {
        self.tasks.get(arn)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Drives one invocation: launch everything, then optionally wait.
pub struct Driver<A: TaskApi, R: StatusRenderer> {
    api: A,
    renderer: R,
    telemetry: Telemetry,
    poll_interval: Duration,
}

impl<A: TaskApi, R: StatusRenderer> Driver<A, R> {
    pub fn new(api: A, renderer: R, poll_interval: Duration) -> Self {
        Self {
            api,
            renderer,
            telemetry: Telemetry::default(),
            poll_interval,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Submits every request in order. A failed submission is logged and the
    /// remaining requests still go out; tasks from successful replies are
    /// printed immediately and recorded for the wait phase.
    pub async fn launch(&mut self, requests: &[LaunchRequest]) -> Result<TaskBoard> {
        let mut board = TaskBoard::new();

        for request in requests {
            let tasks = match self.api.run_task(request).await {
                Ok(tasks) => tasks,
                Err(err) => {
                    self.telemetry.record_launch_failure();
                    tracing::error!(
                        cluster = %request.cluster,
                        task_definition = %request.task_definition,
                        error = %err,
                        "run task request failed; continuing with the rest of the batch"
                    );
                    continue;
                }
            };

            self.telemetry.record_tasks_launched(tasks.len() as u64);
            for task in tasks {
                self.renderer.push_line(&status_line(&task))?;
                board.admit(task);
            }
        }

        Ok(board)
    }

    /// Polls the service until no tracked task remains, redrawing the status
    /// block between rounds. Returns immediately when nothing is tracked.
    /// A describe failure aborts the wait: without fresh status the loop
    /// cannot make progress.
    pub async fn join(&mut self, cluster: &str, board: &mut TaskBoard) -> Result<()> {
        loop {
            let tracked = board.tracked();
            if tracked.is_empty() {
                return Ok(());
            }

            let fresh = self
                .api
                .describe_tasks(cluster, &tracked)
                .await
                .context("describe tasks failed while waiting for completion")?;
            self.telemetry.record_describe_round();

            for task in fresh {
                board.update(task);
            }

            self.renderer.redraw(&board.lines())?;

            if board.tracked().is_empty() {
                return Ok(());
            }

            sleep(self.poll_interval).await;
        }
    }

    /// Launches every request, then waits for completion when `join` is set.
    pub async fn run(
        &mut self,
        cluster: &str,
        requests: &[LaunchRequest],
        join: bool,
    ) -> Result<TaskBoard> {
        let mut board = self.launch(requests).await?;
        if join {
            self.join(cluster, &mut board).await?;
        }
        Ok(board)
    }
}
