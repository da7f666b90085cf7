//! JSON-RPC client plumbing: authentication, call options, metrics, and
//! the wire models shared with the cluster service.

pub mod auth;
pub mod client;
pub mod metrics;
pub mod options;
pub mod wire;

pub use client::{ClusterRpcClient, RpcError, TaskApi};
pub use metrics::RpcMetricsSnapshot;
pub use options::RpcClientOptions;
