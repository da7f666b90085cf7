use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use runtask::display::StatusRenderer;
use runtask::launch::LaunchRequest;
use runtask::rpc::wire::Task;
use runtask::rpc::TaskApi;
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

pub fn task(arn: &str, last: &str, desired: &str) -> Task {
    Task {
        task_arn: arn.to_owned(),
        last_status: last.to_owned(),
        desired_status: desired.to_owned(),
    }
}

/// Bare request against the default cluster, one instantiation.
pub fn launch_request(task_definition: &str) -> LaunchRequest {
    LaunchRequest {
        cluster: "default".to_owned(),
        count: 1,
        task_definition: task_definition.to_owned(),
        overrides: None,
    }
}

/// Scripted stand-in for the cluster service. Replies are queued per method
/// and handed out in order; an exhausted describe queue falls back to a
/// fixed reply when one is set, otherwise to an empty task list.
#[derive(Default)]
pub struct ScriptedApi {
    run_replies: Mutex<VecDeque<Result<Vec<Task>>>>,
    describe_replies: Mutex<VecDeque<Result<Vec<Task>>>>,
    describe_fallback: Mutex<Option<Vec<Task>>>,
    run_calls: AtomicUsize,
    describe_calls: AtomicUsize,
    seen_requests: Mutex<Vec<LaunchRequest>>,
    seen_describes: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedApi {
    pub fn push_run(&self, reply: Result<Vec<Task>>) {
        self.run_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_describe(&self, reply: Result<Vec<Task>>) {
        self.describe_replies.lock().unwrap().push_back(reply);
    }

    /// Reply returned by every describe once the queue is exhausted. Useful
    /// for scripting a task that never stops.
    pub fn set_describe_fallback(&self, tasks: Vec<Task>) {
        *self.describe_fallback.lock().unwrap() = Some(tasks);
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn seen_requests(&self) -> Vec<LaunchRequest> {
        self.seen_requests.lock().unwrap().clone()
    }

    pub fn seen_describes(&self) -> Vec<(String, Vec<String>)> {
        self.seen_describes.lock().unwrap().clone()
    }
}

impl TaskApi for ScriptedApi {
    fn run_task<'a>(&'a self, request: &'a LaunchRequest) -> BoxFuture<'a, Result<Vec<Task>>> {
        Box::pin(async move {
            self.run_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_requests.lock().unwrap().push(request.clone());
            self.run_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    fn describe_tasks<'a>(
        &'a self,
        cluster: &'a str,
        arns: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Task>>> {
        Box::pin(async move {
            self.describe_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_describes
                .lock()
                .unwrap()
                .push((cluster.to_owned(), arns.to_vec()));
            if let Some(reply) = self.describe_replies.lock().unwrap().pop_front() {
                return reply;
            }
            if let Some(tasks) = self.describe_fallback.lock().unwrap().clone() {
                return Ok(tasks);
            }
            Ok(Vec::new())
        })
    }
}

/// Renderer that records what the driver would have drawn: one entry in
/// `pushed` per launch-phase line, one entry in `frames` per redraw.
#[derive(Default)]
pub struct RecordingRenderer {
    pub pushed: Vec<String>,
    pub frames: Vec<Vec<String>>,
}

impl StatusRenderer for RecordingRenderer {
    fn push_line(&mut self, line: &str) -> Result<()> {
        self.pushed.push(line.to_owned());
        Ok(())
    }

    fn redraw(&mut self, lines: &[String]) -> Result<()> {
        self.frames.push(lines.to_vec());
        Ok(())
    }
}
