//! The gRPC surface (§6): a single RPC that runs the cluster pipeline
//! against a caller-supplied `ClusterConfig` rather than a local
//! kubeconfig.

pub mod server;
mod service;

tonic::include_proto!("kubeshift");

pub use server::serve;
