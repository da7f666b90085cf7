//! Launch tasks on a remote cluster and optionally wait for them to stop.
//!
//! The crate is a thin, sequential front-end over the cluster-management
//! service: the CLI arguments become one launch request per override file,
//! every request is submitted in order, and with `--join` the tool keeps
//! polling task status (redrawing a line per task in place) until every
//! launched task reports `STOPPED`.

pub mod cli;
pub mod display;
pub mod driver;
pub mod launch;
pub mod rpc;
pub mod runtime;

pub use cli::Args;
pub use display::{status_line, AnsiRenderer, StatusRenderer};
pub use driver::{Driver, TaskBoard};
pub use launch::{build_requests, LaunchRequest};
pub use rpc::wire::{Task, TaskOverride, STOPPED};
pub use rpc::{ClusterRpcClient, RpcError, TaskApi};
pub use runtime::config::{ServiceConfig, ServiceConfigBuilder};
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
