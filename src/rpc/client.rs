//! RPC client for the cluster-management service. Houses the
//! `ClusterRpcClient`, error types, and the `TaskApi` trait the driver
//! consumes so tests can substitute a scripted service.

use crate::launch::LaunchRequest;
use crate::rpc::auth::build_auth_headers;
use crate::rpc::metrics::{RpcMetrics, RpcMetricsSnapshot};
use crate::rpc::options::RpcClientOptions;
use crate::rpc::wire::{DescribeTasksParams, RunTaskParams, Task, TaskPage};
use crate::runtime::config::ServiceConfig;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use jsonrpsee::core::client::{ClientT, Error as JsonRpcError};
use jsonrpsee::core::http_helpers::HttpError;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::transport::Error as HttpTransportError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::time::{timeout, Instant};

#[derive(Debug)]
pub enum RpcError {
    Timeout { method: &'static str },
    ResponseTooLarge { method: &'static str },
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcError::Timeout { method } => write!(f, "rpc method {method} timed out"),
            RpcError::ResponseTooLarge { method } => {
                write!(f, "rpc {method} response exceeded HTTP size limits")
            }
        }
    }
}

impl std::error::Error for RpcError {}

/// Boundary between the driver and the remote service: one launch call and
/// one describe call, both opaque beyond their task lists.
pub trait TaskApi: Send + Sync {
    fn run_task<'a>(&'a self, request: &'a LaunchRequest) -> BoxFuture<'a, Result<Vec<Task>>>;

    fn describe_tasks<'a>(
        &'a self,
        cluster: &'a str,
        arns: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Task>>>;
}

#[derive(Debug, Clone)]
pub struct ClusterRpcClient {
    endpoint: Arc<String>,
    client: HttpClient,
    options: RpcClientOptions,
    metrics: Arc<RpcMetrics>,
}

impl TaskApi for ClusterRpcClient {
    fn run_task<'a>(&'a self, request: &'a LaunchRequest) -> BoxFuture<'a, Result<Vec<Task>>> {
        Box::pin(self.run_task(request))
    }

    fn describe_tasks<'a>(
        &'a self,
        cluster: &'a str,
        arns: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Task>>> {
        Box::pin(self.describe_tasks(cluster, arns))
    }
}

impl ClusterRpcClient {
    pub fn new(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_options(endpoint, user, password, RpcClientOptions::default())
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        options: RpcClientOptions,
    ) -> Result<Self> {
        options.validate()?;

        let endpoint = endpoint.into();
        let headers = build_auth_headers(&user.into(), &password.into())?;
        let max_request_body_size = options.max_request_body_bytes.min(u32::MAX as usize) as u32;
        let max_response_body_size = options.max_response_body_bytes.min(u32::MAX as usize) as u32;

        let client = HttpClientBuilder::default()
            .set_headers(headers)
            .request_timeout(options.request_timeout)
            .max_request_size(max_request_body_size)
            .max_response_size(max_response_body_size)
            .build(&endpoint)
            .map_err(|err| anyhow!("failed to build RPC client: {err}"))?;

        Ok(Self {
            endpoint: Arc::new(endpoint),
            client,
            options,
            metrics: Arc::new(RpcMetrics::default()),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let options = RpcClientOptions {
            request_timeout: config.request_timeout(),
            ..RpcClientOptions::default()
        };
        Self::with_options(
            config.endpoint().to_owned(),
            config.user().to_owned(),
            config.password().to_owned(),
            options,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn metrics(&self) -> RpcMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Submits one launch request and returns the tasks the service placed.
    /// Placement failures reported alongside the tasks are logged and
    /// otherwise ignored, matching the service's partial-success contract.
    pub async fn run_task(&self, request: &LaunchRequest) -> Result<Vec<Task>> {
        const METHOD: &str = "RunTask";

        let params = RunTaskParams {
            cluster: request.cluster.clone(),
            count: request.count,
            task_definition: request.task_definition.clone(),
            overrides: request.overrides.clone(),
        };

        let page: TaskPage = self.call(METHOD, rpc_params![params]).await?;
        log_reported_failures(METHOD, &page);
        tracing::debug!(
            method = METHOD,
            cluster = %request.cluster,
            task_definition = %request.task_definition,
            tasks = page.tasks.len(),
            "run task call completed"
        );

        Ok(page.tasks)
    }

    /// Fetches fresh snapshots for the given ARNs. Returns early without a
    /// network call when there is nothing to describe.
    pub async fn describe_tasks(&self, cluster: &str, arns: &[String]) -> Result<Vec<Task>> {
        const METHOD: &str = "DescribeTasks";

        if arns.is_empty() {
            return Ok(Vec::new());
        }

        let params = DescribeTasksParams {
            cluster: cluster.to_owned(),
            tasks: arns.to_vec(),
        };

        let page: TaskPage = self.call(METHOD, rpc_params![params]).await?;
        log_reported_failures(METHOD, &page);
        tracing::debug!(
            method = METHOD,
            cluster = %cluster,
            requested = arns.len(),
            tasks = page.tasks.len(),
            "describe tasks call completed"
        );

        Ok(page.tasks)
    }

    async fn call<R>(&self, method: &'static str, params: ArrayParams) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let start = Instant::now();

        let reply = match timeout(
            self.options.request_timeout,
            self.client.request(method, params),
        )
        .await
        {
            Err(_) => {
                self.metrics.record_timeout(start.elapsed());
                return Err(RpcError::Timeout { method }.into());
            }
            Ok(outcome) => outcome,
        };

        match reply {
            Ok(value) => {
                self.metrics.record_success(start.elapsed());
                Ok(value)
            }
            Err(err) => {
                self.metrics.record_failure(start.elapsed());
                Err(map_rpc_error(method, err))
            }
        }
    }
}

fn log_reported_failures(method: &'static str, page: &TaskPage) {
    for failure in &page.failures {
        tracing::warn!(
            method,
            arn = failure.arn.as_deref().unwrap_or("<unknown>"),
            reason = failure.reason.as_deref().unwrap_or("<unspecified>"),
            "service reported a failure alongside the task list"
        );
    }
}

fn map_rpc_error(label: &'static str, err: JsonRpcError) -> anyhow::Error {
    if response_too_large(&err) {
        return RpcError::ResponseTooLarge { method: label }.into();
    }
    match err {
        JsonRpcError::Call(call) => anyhow!(
            "rpc {label} call failed (code={}, message={})",
            call.code(),
            call.message()
        ),
        other => anyhow!("rpc {label} call failed: {other}"),
    }
}

fn response_too_large(err: &JsonRpcError) -> bool {
    match err {
        JsonRpcError::Transport(inner) => {
            if let Some(transport_err) = inner.downcast_ref::<HttpTransportError>() {
                match transport_err {
                    HttpTransportError::Http(http_err) => matches!(http_err, HttpError::TooLarge),
                    HttpTransportError::RequestTooLarge => true,
                    _ => false,
                }
            } else {
                false
            }
        }
        _ => false,
    }
}
